//! hvstat core library
//!
//! Hypervisor-agnostic domain resource snapshots and the driver registry
//! that lets hypervisor backends plug into one collection pipeline.

pub mod config;
pub mod drivers;
pub mod error;
pub mod observability;
pub mod paths;
pub mod rates;
pub mod types;

// Re-export commonly used items
pub use config::{CollectorConfig, ObservabilityConfig};
pub use drivers::{
    is_driver, register_all, CollectFlags, Driver, DriverRegistry, RegistrationPolicy,
    RegistrationReport, Snapshot,
};
pub use error::{HvstatError, Result};
pub use observability::init as init_observability;
pub use types::{
    string_to_domain_id, BlockDevice, BlockIo, Cpu, CpuFlag, Domain, DomainFlag, DomainId,
    HardwareAddr, NetworkInterface, NetworkIo, Timestamp,
};
