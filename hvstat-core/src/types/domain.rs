//! Domain (virtual machine) snapshot types.

use crate::error::{HvstatError, Result};
use crate::types::block::BlockDevice;
use crate::types::cpu::Cpu;
use crate::types::network::NetworkInterface;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Numeric domain handle.
///
/// Unique within one hypervisor's namespace only. Two backends may both
/// report a `DomainId(1)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DomainId(pub u64);

impl DomainId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for DomainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strict parse: base-10 digits only, no sign, no whitespace.
impl FromStr for DomainId {
    type Err = HvstatError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || HvstatError::InvalidDomainId { input: s.to_string() };

        // u64::from_str accepts a leading '+', which is not a valid domain ID.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse::<u64>().map(Self).map_err(|_| invalid())
    }
}

/// Parse a domain ID leniently, mapping any parse failure to `DomainId(0)`.
///
/// Intended for best-effort CLI arguments. A zero result is ambiguous since
/// a real domain can have ID 0; use `str::parse::<DomainId>()` when the input
/// must be validated.
pub fn string_to_domain_id(id: &str) -> DomainId {
    id.parse().unwrap_or_default()
}

/// Collection timestamp on the backend's own clock.
///
/// Monotonic per domain for one backend, not comparable across backends.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Ticks elapsed since `earlier`, or `None` if the clock did not advance.
    pub fn since(self, earlier: Timestamp) -> Option<u64> {
        let delta = self.0.checked_sub(earlier.0)?;
        u64::try_from(delta).ok().filter(|d| *d > 0)
    }
}

/// Domain run state, as reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainFlag {
    /// Online and running
    #[default]
    Online,
    /// Offline or shut down
    Shutdown,
    Crashed,
    /// Going away (restart or shutdown in progress)
    Dying,
    /// Waiting for CPU time
    Paused,
}

impl fmt::Display for DomainFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Shutdown => write!(f, "shutdown"),
            Self::Crashed => write!(f, "crashed"),
            Self::Dying => write!(f, "dying"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// Driver-owned context attached to a domain.
///
/// Tagged with the name of the driver that set it. Only that driver can read
/// it back; the core never inspects the value.
#[derive(Clone)]
pub struct BackendPrivate {
    owner: String,
    value: Arc<dyn Any + Send + Sync>,
}

impl BackendPrivate {
    pub fn new<T: Any + Send + Sync>(owner: impl Into<String>, value: T) -> Self {
        Self { owner: owner.into(), value: Arc::new(value) }
    }

    /// Name of the driver that owns this value.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Driver names are matched case-insensitively, like registry keys.
    pub fn is_owned_by(&self, driver: &str) -> bool {
        self.owner.eq_ignore_ascii_case(driver)
    }

    fn downcast_for<T: Any>(&self, driver: &str) -> Option<&T> {
        if !self.is_owned_by(driver) {
            return None;
        }
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for BackendPrivate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendPrivate").field("owner", &self.owner).finish_non_exhaustive()
    }
}

/// One monitored virtual machine at one instant.
///
/// Built fresh by a driver's `collect` and handed to the caller. The CPU,
/// block and interface lists are replaced wholesale on every collect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Domain {
    /// Display name (not guaranteed unique)
    pub name: String,

    /// Hypervisor-local numeric handle
    pub id: DomainId,

    /// Hypervisor-assigned UUID
    pub uuid: String,

    pub os_type: String,

    /// When this snapshot was taken
    pub time: Timestamp,

    pub flags: DomainFlag,

    #[serde(default)]
    pub cpus: Vec<Cpu>,

    #[serde(default)]
    pub blocks: Vec<BlockDevice>,

    #[serde(default)]
    pub interfaces: Vec<NetworkInterface>,

    #[serde(skip)]
    private: Option<BackendPrivate>,
}

impl Domain {
    pub fn new(id: DomainId, name: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self { id, name: name.into(), uuid: uuid.into(), ..Default::default() }
    }

    /// Attach driver-owned context, replacing any previous value.
    pub fn set_private<T: Any + Send + Sync>(&mut self, driver: &str, value: T) {
        self.private = Some(BackendPrivate::new(driver, value));
    }

    /// Read back context set by `driver`.
    ///
    /// Returns `None` if nothing is attached, another driver owns it, or the
    /// stored value is not a `T`.
    pub fn private<T: Any>(&self, driver: &str) -> Option<&T> {
        self.private.as_ref().and_then(|p| p.downcast_for::<T>(driver))
    }

    /// Owner of the attached context, if any.
    pub fn private_owner(&self) -> Option<&str> {
        self.private.as_ref().map(BackendPrivate::owner)
    }

    /// Drop context owned by `driver`. Context owned by others is left alone.
    pub fn clear_private(&mut self, driver: &str) -> bool {
        if self.private.as_ref().is_some_and(|p| p.is_owned_by(driver)) {
            self.private = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_domain_id() {
        assert_eq!(string_to_domain_id("42"), DomainId(42));
        assert_eq!(string_to_domain_id("0"), DomainId(0));
        assert_eq!(string_to_domain_id("abc"), DomainId(0));
        assert_eq!(string_to_domain_id("-1"), DomainId(0));
        assert_eq!(string_to_domain_id(""), DomainId(0));
        assert_eq!(string_to_domain_id("+7"), DomainId(0));
        assert_eq!(string_to_domain_id(" 7"), DomainId(0));
        assert_eq!(string_to_domain_id("18446744073709551616"), DomainId(0));
        assert_eq!(string_to_domain_id("18446744073709551615"), DomainId(u64::MAX));
    }

    #[test]
    fn test_domain_id_strict_parse() {
        assert_eq!("17".parse::<DomainId>().unwrap(), DomainId(17));

        match "x1".parse::<DomainId>() {
            Err(HvstatError::InvalidDomainId { input }) => assert_eq!(input, "x1"),
            other => panic!("Expected InvalidDomainId, got {:?}", other),
        }
    }

    #[test]
    fn test_timestamp_since() {
        assert_eq!(Timestamp(150).since(Timestamp(100)), Some(50));
        assert_eq!(Timestamp(100).since(Timestamp(100)), None);
        assert_eq!(Timestamp(90).since(Timestamp(100)), None);
    }

    #[test]
    fn test_private_is_scoped_to_owner() {
        #[derive(Debug, PartialEq)]
        struct Handle(u32);

        let mut domain = Domain::new(DomainId(3), "web", "uuid-3");
        assert!(domain.private::<Handle>("xen").is_none());

        domain.set_private("xen", Handle(9));
        assert_eq!(domain.private::<Handle>("xen"), Some(&Handle(9)));
        assert_eq!(domain.private::<Handle>("XEN"), Some(&Handle(9)));
        assert!(domain.private::<Handle>("libvirt").is_none());
        assert!(domain.private::<u32>("xen").is_none());
        assert_eq!(domain.private_owner(), Some("xen"));

        assert!(!domain.clear_private("libvirt"));
        assert!(domain.clear_private("xen"));
        assert!(domain.private_owner().is_none());
    }

    #[test]
    fn test_private_is_not_serialized() {
        let mut domain = Domain::new(DomainId(1), "db", "uuid-1");
        domain.set_private("xen", 5u64);
        domain.flags = DomainFlag::Paused;

        let json = serde_json::to_string(&domain).unwrap();
        assert!(!json.contains("private"));
        assert!(json.contains("\"flags\":\"paused\""));

        let back: Domain = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, DomainId(1));
        assert!(back.private_owner().is_none());
    }
}
