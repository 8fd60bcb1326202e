//! Canonical snapshot types every driver populates.

pub mod block;
pub mod cpu;
pub mod domain;
pub mod network;

// Re-exports
pub use block::{BlockDevice, BlockIo};
pub use cpu::{Cpu, CpuFlag};
pub use domain::{string_to_domain_id, BackendPrivate, Domain, DomainFlag, DomainId, Timestamp};
pub use network::{HardwareAddr, NetworkInterface, NetworkIo};
