//! Hypervisor driver abstraction.
//!
//! Every hypervisor backend (libvirt/KVM, Xen, ...) implements the `Driver`
//! trait and is handed to a `DriverRegistry` by the composition root. The
//! registry dispatches by case-insensitive name; how a backend talks to its
//! hypervisor is its own business.

use crate::error::{HvstatError, Result};
use crate::types::{Domain, DomainId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

mod policy;
mod registry;

pub use policy::{register_all, RegistrationPolicy, RegistrationReport};
pub use registry::DriverRegistry;

/// One point-in-time scan: every domain a driver saw, keyed by its ID.
pub type Snapshot = HashMap<DomainId, Domain>;

/// Hypervisor driver trait.
///
/// All backends must implement this trait. Implementations instrument their
/// own `collect` if they want spans around hypervisor calls.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Stable, non-empty identifier (e.g. "libvirt", "xen").
    fn name(&self) -> &str;

    /// Probe whether this hypervisor is present and usable on the host.
    ///
    /// Must be free of side effects and must not panic. `false` means "not
    /// available here", not an error.
    fn detect(&self) -> bool;

    /// Scan all domains once.
    ///
    /// `flags` lets the caller skip expensive sub-collections. Returns a fresh
    /// snapshot on every call, or `HvstatError::Collection` when the
    /// hypervisor is unreachable or returns malformed data.
    async fn collect(&self, flags: CollectFlags) -> Result<Snapshot>;

    /// Release connections and handles. Must be idempotent.
    fn close(&self);
}

/// Which per-domain categories a collect should fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectFlags {
    pub cpu: bool,
    pub block: bool,
    pub network: bool,
}

impl Default for CollectFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl CollectFlags {
    pub const fn new(cpu: bool, block: bool, network: bool) -> Self {
        Self { cpu, block, network }
    }

    pub const fn all() -> Self {
        Self::new(true, true, true)
    }

    /// Domain identity and state only.
    pub const fn none() -> Self {
        Self::new(false, false, false)
    }

    /// Empty every category the flags disable, whatever the backend returned.
    pub fn apply(&self, snapshot: &mut Snapshot) {
        for domain in snapshot.values_mut() {
            if !self.cpu {
                domain.cpus.clear();
            }
            if !self.block {
                domain.blocks.clear();
            }
            if !self.network {
                domain.interfaces.clear();
            }
        }
    }
}

/// Check whether a type-erased value is a usable driver handle.
///
/// Only meaningful at a plugin boundary where drivers arrive as `dyn Any`;
/// everywhere else the trait bound already guarantees it. Recognises
/// `Arc<dyn Driver>` and `Box<dyn Driver>`.
pub fn is_driver(value: &dyn Any) -> bool {
    value.is::<Arc<dyn Driver>>() || value.is::<Box<dyn Driver>>()
}

/// Convert a type-erased value into a driver handle.
pub(crate) fn into_driver(value: Box<dyn Any + Send + Sync>) -> Result<Arc<dyn Driver>> {
    let value = match value.downcast::<Arc<dyn Driver>>() {
        Ok(driver) => return Ok(*driver),
        Err(value) => value,
    };

    match value.downcast::<Box<dyn Driver>>() {
        Ok(driver) => Ok(Arc::from(*driver)),
        Err(_) => Err(HvstatError::InvalidDriver {
            reason: "value does not implement the Driver trait".to_string(),
        }),
    }
}
