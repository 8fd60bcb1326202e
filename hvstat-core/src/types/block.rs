//! Block device types.

use serde::{Deserialize, Serialize};

/// Block IO counters for one direction (read, write or flush).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIo {
    pub operations: u64,
    pub bytes: u64,
    pub sectors: u64,

    /// True when the counters are cumulative since boot, false when they are
    /// deltas since the previous sample. Check before subtracting samples.
    pub absolute: bool,
}

impl BlockIo {
    /// Cumulative counters.
    pub fn absolute(operations: u64, bytes: u64, sectors: u64) -> Self {
        Self { operations, bytes, sectors, absolute: true }
    }

    /// Counters relative to the previous sample.
    pub fn delta(operations: u64, bytes: u64, sectors: u64) -> Self {
        Self { operations, bytes, sectors, absolute: false }
    }
}

/// One storage device attached to a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDevice {
    pub name: String,
    pub read_only: bool,
    pub is_disk: bool,
    pub is_cdrom: bool,

    pub read: BlockIo,
    pub write: BlockIo,
    pub flush: BlockIo,
}

impl BlockDevice {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// A device should not claim to be both a disk and a CD-ROM.
    pub fn is_consistent(&self) -> bool {
        !(self.is_disk && self.is_cdrom)
    }
}
