//! Start-up registration policy.
//!
//! A bad driver registration is a programming mistake in the backend, but
//! whether it should stop the process is the composition root's call.

use crate::drivers::{Driver, DriverRegistry};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// What to do when a driver fails to register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Stop at the first bad driver and return its error
    #[default]
    Abort,
    /// Log a warning and carry on with the remaining drivers
    Skip,
}

/// Outcome of registering a batch of drivers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Registry keys of every driver that was stored
    pub registered: Vec<String>,

    /// Subset of `registered` whose probe succeeded at registration
    pub detected: Vec<String>,

    /// Errors for drivers skipped under `RegistrationPolicy::Skip`
    pub skipped: Vec<String>,
}

/// Register a batch of drivers under the given policy.
///
/// # Errors
///
/// Under `RegistrationPolicy::Abort`, the first registration error. Drivers
/// registered before it stay registered.
pub async fn register_all<I>(
    registry: &DriverRegistry,
    drivers: I,
    policy: RegistrationPolicy,
) -> Result<RegistrationReport>
where
    I: IntoIterator<Item = Arc<dyn Driver>>,
{
    let mut report = RegistrationReport::default();

    for driver in drivers {
        let key = driver.name().to_uppercase();
        match registry.register(driver).await {
            Ok(detected) => {
                if detected {
                    report.detected.push(key.clone());
                }
                report.registered.push(key);
            }
            Err(e) if policy == RegistrationPolicy::Skip => {
                warn!(error = %e, "Skipping driver that failed to register");
                report.skipped.push(e.to_string());
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        registered = report.registered.len(),
        detected = report.detected.len(),
        skipped = report.skipped.len(),
        "Driver registration complete"
    );
    Ok(report)
}
