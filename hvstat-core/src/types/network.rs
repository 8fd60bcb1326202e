//! Network interface types.

use crate::error::{HvstatError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Network IO counters for one direction. Cumulative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkIo {
    pub bytes: u64,
    pub packets: u64,
    pub errors: u64,
    pub drops: u64,
}

/// Link-layer hardware address of any length (EUI-48, EUI-64, InfiniBand).
///
/// Formatted as lowercase colon-separated hex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HardwareAddr(Vec<u8>);

impl HardwareAddr {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<[u8; 6]> for HardwareAddr {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Accepts `:` or `-` separated two-digit hex groups. The empty string is
/// the empty address.
impl FromStr for HardwareAddr {
    type Err = HvstatError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::default());
        }

        let invalid = || HvstatError::InvalidHardwareAddr { input: s.to_string() };
        let sep = if s.contains('-') { '-' } else { ':' };

        s.split(sep)
            .map(|group| {
                if group.len() != 2 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(invalid());
                }
                u8::from_str_radix(group, 16).map_err(|_| invalid())
            })
            .collect::<Result<Vec<u8>>>()
            .map(Self)
    }
}

impl Serialize for HardwareAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HardwareAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One network interface attached to a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub mac: HardwareAddr,

    /// Bridges the interface is attached to
    #[serde(default)]
    pub bridges: Vec<String>,

    pub rx: NetworkIo,
    pub tx: NetworkIo,
}

impl NetworkInterface {
    pub fn new(name: impl Into<String>, mac: HardwareAddr) -> Self {
        Self { name: name.into(), mac, ..Default::default() }
    }
}
