//! Virtual CPU types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduling state of a single vCPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuFlag {
    /// Online for the domain
    #[default]
    Online,
    /// Currently running on a physical CPU
    Running,
    /// Halted or blocked (waiting on IO etc.)
    Halted,
    /// No further scheduling
    Paused,
}

impl fmt::Display for CpuFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Running => write!(f, "running"),
            Self::Halted => write!(f, "halted"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// One virtual CPU of a domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cpu {
    /// Index, unique within the domain
    pub id: u64,

    pub flags: CpuFlag,

    /// Cumulative CPU time consumed
    pub time: f64,

    /// Idle time; only valid when `idle_set` is true
    pub idle: f64,
    pub idle_set: bool,

    // Load averages, for backends that expose them
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

impl Cpu {
    pub fn new(id: u64, flags: CpuFlag, time: f64) -> Self {
        Self { id, flags, time, ..Default::default() }
    }

    /// Idle time, if the backend reported one.
    pub fn idle(&self) -> Option<f64> {
        self.idle_set.then_some(self.idle)
    }

    pub fn set_idle(&mut self, idle: f64) {
        self.idle = idle;
        self.idle_set = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_requires_flag() {
        let mut cpu = Cpu::new(0, CpuFlag::Running, 12.5);
        assert_eq!(cpu.idle(), None);

        // A raw value without the flag is still not reported
        cpu.idle = 3.0;
        assert_eq!(cpu.idle(), None);

        cpu.set_idle(4.0);
        assert_eq!(cpu.idle(), Some(4.0));
    }

    #[test]
    fn test_flag_display() {
        assert_eq!(CpuFlag::Halted.to_string(), "halted");
        assert_eq!(serde_json::to_string(&CpuFlag::Running).unwrap(), "\"running\"");
    }
}
