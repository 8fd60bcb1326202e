//! Error types for hvstat.
//!
//! All errors use `thiserror` so callers get proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hvstat operations.
pub type Result<T> = std::result::Result<T, HvstatError>;

/// Main error type for hvstat.
#[derive(Error, Debug)]
pub enum HvstatError {
    // Registration errors
    #[error("Invalid driver registration: {reason}")]
    InvalidDriver { reason: String },

    #[error("Driver not registered: {name}")]
    DriverNotFound { name: String },

    #[error("Hypervisor for driver {name} not detected on this host")]
    DriverUnavailable { name: String },

    #[error("No registered driver detected a hypervisor on this host")]
    NoDriverAvailable,

    // Collection errors
    #[error("Collection failed for driver {driver}: {reason}")]
    Collection { driver: String, reason: String },

    // Domain model errors
    #[error("Invalid domain ID: {input:?}")]
    InvalidDomainId { input: String },

    #[error("Invalid hardware address: {input:?}")]
    InvalidHardwareAddr { input: String },

    // Rate computation errors
    #[error("Counters are deltas since the previous sample and cannot be subtracted")]
    NonCumulativeCounter,

    #[error("Cannot compare an absolute counter with a delta counter")]
    MixedCounterKinds,

    #[error("Counter {field} went backwards (reset or domain restart)")]
    CounterReset { field: &'static str },

    #[error("Invalid sampling interval: {reason}")]
    InvalidInterval { reason: String },

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("I/O error at {path:?}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HvstatError {
    /// Build a collection error for the named driver.
    pub fn collection(driver: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Collection { driver: driver.into(), reason: reason.to_string() }
    }

    /// True for errors caused by a bad driver registration or bad config.
    ///
    /// These are start-up mistakes rather than runtime conditions.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidDriver { .. } | Self::InvalidConfig { .. })
    }
}
