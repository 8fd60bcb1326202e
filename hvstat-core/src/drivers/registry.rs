//! Driver registry: case-insensitive name to driver mapping.
//!
//! The registry is an explicitly owned handle rather than process-wide state.
//! Clones share the same map, so the composition root can build one and hand
//! it to whatever needs to collect.

use crate::drivers::{into_driver, CollectFlags, Driver, Snapshot};
use crate::error::{HvstatError, Result};
use crate::observability::metrics;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// A driver plus what its probe said when it was registered.
struct RegisteredDriver {
    driver: Arc<dyn Driver>,
    detected_at_registration: bool,
}

/// Registry of hypervisor drivers keyed by upper-cased name.
///
/// Uses RwLock for read-heavy workloads (many lookups, few registrations).
/// Driver handles are cloned out of the lock before any driver method runs,
/// so a slow `collect` never blocks registration.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: Arc<RwLock<HashMap<String, RegisteredDriver>>>,
}

/// Registry key for a driver name.
fn registry_key(name: &str) -> String {
    name.to_uppercase()
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver.
    ///
    /// The driver is stored under its upper-cased name, replacing any driver
    /// registered under the same name in any casing. Its `detect` probe is
    /// then run once and the result returned. A `false` result still leaves
    /// the driver registered and discoverable by name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDriver` if `name()` is empty. Nothing is stored.
    #[instrument(skip(self, driver), fields(name = %driver.name()))]
    pub async fn register(&self, driver: Arc<dyn Driver>) -> Result<bool> {
        if driver.name().is_empty() {
            metrics::record_registration_failure();
            return Err(HvstatError::InvalidDriver { reason: "empty driver name".to_string() });
        }

        let key = registry_key(driver.name());
        let count = {
            let mut drivers = self.drivers.write().await;
            let entry = RegisteredDriver { driver: driver.clone(), detected_at_registration: false };
            if let Some(previous) = drivers.insert(key.clone(), entry) {
                warn!(
                    key = %key,
                    previous = %previous.driver.name(),
                    "Replacing previously registered driver"
                );
            }
            drivers.len()
        };
        metrics::set_driver_count(count);

        let detected = driver.detect();

        // Only record the probe result if nobody replaced the entry meanwhile.
        {
            let mut drivers = self.drivers.write().await;
            if let Some(entry) = drivers.get_mut(&key) {
                if Arc::ptr_eq(&entry.driver, &driver) {
                    entry.detected_at_registration = detected;
                }
            }
        }

        metrics::record_registration(&key, detected);
        if detected {
            info!(key = %key, "Driver registered");
        } else {
            info!(key = %key, "Driver registered, hypervisor not detected");
        }

        Ok(detected)
    }

    /// Register a type-erased driver handle from a plugin boundary.
    ///
    /// Accepts a boxed `Arc<dyn Driver>` or `Box<dyn Driver>`. Anything else
    /// is an `InvalidDriver` error.
    pub async fn register_any(&self, value: Box<dyn Any + Send + Sync>) -> Result<bool> {
        let driver = into_driver(value).map_err(|e| {
            metrics::record_registration_failure();
            e
        })?;
        self.register(driver).await
    }

    /// Remove a driver without closing it.
    #[instrument(skip(self))]
    pub async fn unregister(&self, name: &str) -> Option<Arc<dyn Driver>> {
        let (removed, count) = {
            let mut drivers = self.drivers.write().await;
            let removed = drivers.remove(&registry_key(name));
            (removed, drivers.len())
        };
        metrics::set_driver_count(count);

        if removed.is_none() {
            debug!("Attempted to unregister unknown driver");
        }
        removed.map(|entry| entry.driver)
    }

    /// Look up a driver by name, ignoring case.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        let drivers = self.drivers.read().await;
        drivers.get(&registry_key(name)).map(|entry| entry.driver.clone())
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.drivers.read().await.contains_key(&registry_key(name))
    }

    /// Names of all registered drivers, upper-cased. Order is unspecified.
    pub async fn available_drivers(&self) -> Vec<String> {
        self.drivers.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.drivers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.drivers.read().await.is_empty()
    }

    /// What the driver's probe returned when it was registered.
    ///
    /// This is a historical observation only; call `detect` for the current
    /// answer.
    pub async fn detected_at_registration(&self, name: &str) -> Option<bool> {
        let drivers = self.drivers.read().await;
        drivers.get(&registry_key(name)).map(|entry| entry.detected_at_registration)
    }

    /// Re-run a driver's detection probe.
    #[instrument(skip(self))]
    pub async fn detect(&self, name: &str) -> Result<bool> {
        let driver = self.require(name).await?;
        let detected = driver.detect();
        metrics::record_detect(&registry_key(name), detected);
        debug!(detected, "Probed hypervisor");
        Ok(detected)
    }

    /// Names of drivers whose probe currently succeeds, sorted.
    pub async fn detected_drivers(&self) -> Vec<String> {
        let mut detected: Vec<String> = self
            .snapshot_drivers()
            .await
            .into_iter()
            .filter(|(key, driver)| {
                let found = driver.detect();
                metrics::record_detect(key, found);
                found
            })
            .map(|(key, _)| key)
            .collect();
        detected.sort();
        detected
    }

    /// Pick the driver to collect from.
    ///
    /// With `preferred`, that driver must be registered and detected.
    /// Otherwise the first detected driver in name order wins.
    #[instrument(skip(self))]
    pub async fn select(&self, preferred: Option<&str>) -> Result<Arc<dyn Driver>> {
        if let Some(name) = preferred {
            info!(driver = %name, "Using driver override from configuration");
            let driver = self.require(name).await?;
            if !driver.detect() {
                return Err(HvstatError::DriverUnavailable { name: registry_key(name) });
            }
            return Ok(driver);
        }

        let mut candidates = self.snapshot_drivers().await;
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, driver) in candidates {
            let detected = driver.detect();
            metrics::record_detect(&key, detected);
            if detected {
                info!(driver = %key, "Selected detected driver");
                return Ok(driver);
            }
            debug!(driver = %key, "Hypervisor not detected, trying next driver");
        }

        Err(HvstatError::NoDriverAvailable)
    }

    /// Collect one snapshot from the named driver.
    ///
    /// Categories disabled in `flags` are emptied in the result even if the
    /// backend filled them in. Collection errors are returned unchanged and
    /// never retried.
    #[instrument(skip(self))]
    pub async fn collect(&self, name: &str, flags: CollectFlags) -> Result<Snapshot> {
        let driver = self.require(name).await?;
        let key = registry_key(name);
        let start = Instant::now();

        match driver.collect(flags).await {
            Ok(mut snapshot) => {
                flags.apply(&mut snapshot);
                metrics::record_collect(&key, start.elapsed(), snapshot.len());
                debug!(domains = snapshot.len(), elapsed = ?start.elapsed(), "Collected snapshot");
                Ok(snapshot)
            }
            Err(e) => {
                metrics::record_collect_failure(&key);
                warn!(error = %e, "Collection failed");
                Err(e)
            }
        }
    }

    /// Remove every driver and close each one exactly once.
    #[instrument(skip(self))]
    pub async fn close_all(&self) {
        let drained: Vec<(String, RegisteredDriver)> = {
            let mut drivers = self.drivers.write().await;
            drivers.drain().collect()
        };
        metrics::set_driver_count(0);

        for (key, entry) in drained {
            entry.driver.close();
            debug!(driver = %key, "Closed driver");
        }
    }

    async fn require(&self, name: &str) -> Result<Arc<dyn Driver>> {
        self.get(name).await.ok_or_else(|| HvstatError::DriverNotFound { name: registry_key(name) })
    }

    async fn snapshot_drivers(&self) -> Vec<(String, Arc<dyn Driver>)> {
        let drivers = self.drivers.read().await;
        drivers.iter().map(|(key, entry)| (key.clone(), entry.driver.clone())).collect()
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry").finish_non_exhaustive()
    }
}
