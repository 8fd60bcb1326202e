//! Rates from two successive samples of the same domain.
//!
//! Block counters come in two kinds: cumulative since boot
//! (`BlockIo::absolute == true`) and already-differenced since the previous
//! sample. Only cumulative counters may be subtracted; a delta sample is
//! divided by the interval as-is. Network counters and CPU time are always
//! cumulative.

use crate::error::{HvstatError, Result};
use crate::types::{BlockIo, Cpu, NetworkIo};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-second block IO rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockIoRate {
    pub operations_per_sec: f64,
    pub bytes_per_sec: f64,
    pub sectors_per_sec: f64,
}

/// Per-second network IO rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkIoRate {
    pub bytes_per_sec: f64,
    pub packets_per_sec: f64,
    pub errors_per_sec: f64,
    pub drops_per_sec: f64,
}

fn interval_secs(interval: Duration) -> Result<f64> {
    if interval.is_zero() {
        return Err(HvstatError::InvalidInterval { reason: "interval is zero".to_string() });
    }
    Ok(interval.as_secs_f64())
}

fn counter_delta(earlier: u64, later: u64, field: &'static str) -> Result<u64> {
    later.checked_sub(earlier).ok_or(HvstatError::CounterReset { field })
}

/// Subtract two cumulative block samples.
///
/// Returns the difference as a delta sample (`absolute == false`).
///
/// # Errors
///
/// `NonCumulativeCounter` if either sample is a delta, since subtracting
/// deltas is meaningless. `CounterReset` if any counter went backwards.
pub fn block_io_delta(earlier: &BlockIo, later: &BlockIo) -> Result<BlockIo> {
    if !earlier.absolute || !later.absolute {
        return Err(HvstatError::NonCumulativeCounter);
    }

    Ok(BlockIo::delta(
        counter_delta(earlier.operations, later.operations, "operations")?,
        counter_delta(earlier.bytes, later.bytes, "bytes")?,
        counter_delta(earlier.sectors, later.sectors, "sectors")?,
    ))
}

/// Block IO rate over `interval`, honouring the `absolute` flag.
///
/// Cumulative samples are subtracted. For delta samples `later` already
/// covers the interval and `earlier` is only checked for kind.
pub fn block_io_rate(earlier: &BlockIo, later: &BlockIo, interval: Duration) -> Result<BlockIoRate> {
    if earlier.absolute != later.absolute {
        return Err(HvstatError::MixedCounterKinds);
    }
    let secs = interval_secs(interval)?;

    let delta = if later.absolute { block_io_delta(earlier, later)? } else { *later };

    Ok(BlockIoRate {
        operations_per_sec: delta.operations as f64 / secs,
        bytes_per_sec: delta.bytes as f64 / secs,
        sectors_per_sec: delta.sectors as f64 / secs,
    })
}

/// Network IO rate over `interval`.
pub fn network_io_rate(
    earlier: &NetworkIo,
    later: &NetworkIo,
    interval: Duration,
) -> Result<NetworkIoRate> {
    let secs = interval_secs(interval)?;

    Ok(NetworkIoRate {
        bytes_per_sec: counter_delta(earlier.bytes, later.bytes, "bytes")? as f64 / secs,
        packets_per_sec: counter_delta(earlier.packets, later.packets, "packets")? as f64 / secs,
        errors_per_sec: counter_delta(earlier.errors, later.errors, "errors")? as f64 / secs,
        drops_per_sec: counter_delta(earlier.drops, later.drops, "drops")? as f64 / secs,
    })
}

/// vCPU utilisation in percent of one physical CPU over `interval`.
///
/// CPU time is taken to be in seconds.
pub fn cpu_utilisation(earlier: &Cpu, later: &Cpu, interval: Duration) -> Result<f64> {
    let secs = interval_secs(interval)?;
    let used = later.time - earlier.time;
    if used < 0.0 {
        return Err(HvstatError::CounterReset { field: "time" });
    }
    Ok(used / secs * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CpuFlag;

    const TEN_SECS: Duration = Duration::from_secs(10);

    #[test]
    fn test_absolute_samples_are_subtracted() {
        let earlier = BlockIo::absolute(100, 4096, 8);
        let later = BlockIo::absolute(150, 8192, 16);

        let rate = block_io_rate(&earlier, &later, TEN_SECS).unwrap();
        assert_eq!(rate.operations_per_sec, 5.0);
        assert_eq!(rate.bytes_per_sec, 409.6);
        assert_eq!(rate.sectors_per_sec, 0.8);
    }

    #[test]
    fn test_delta_samples_are_not_subtracted() {
        let earlier = BlockIo::delta(100, 4096, 8);
        let later = BlockIo::delta(20, 1000, 2);

        let rate = block_io_rate(&earlier, &later, TEN_SECS).unwrap();
        assert_eq!(rate.operations_per_sec, 2.0);
        assert_eq!(rate.bytes_per_sec, 100.0);
    }

    #[test]
    fn test_delta_refuses_non_cumulative() {
        let earlier = BlockIo::delta(1, 1, 1);
        let later = BlockIo::delta(2, 2, 2);
        assert!(matches!(block_io_delta(&earlier, &later), Err(HvstatError::NonCumulativeCounter)));

        let absolute = BlockIo::absolute(2, 2, 2);
        assert!(matches!(block_io_delta(&earlier, &absolute), Err(HvstatError::NonCumulativeCounter)));
    }

    #[test]
    fn test_mixed_kinds_rejected() {
        let earlier = BlockIo::absolute(1, 1, 1);
        let later = BlockIo::delta(2, 2, 2);
        assert!(matches!(
            block_io_rate(&earlier, &later, TEN_SECS),
            Err(HvstatError::MixedCounterKinds)
        ));
    }

    #[test]
    fn test_counter_reset_detected() {
        let earlier = BlockIo::absolute(10, 500, 1);
        let later = BlockIo::absolute(12, 100, 1);
        match block_io_rate(&earlier, &later, TEN_SECS) {
            Err(HvstatError::CounterReset { field }) => assert_eq!(field, "bytes"),
            other => panic!("Expected CounterReset, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let sample = BlockIo::absolute(1, 1, 1);
        assert!(matches!(
            block_io_rate(&sample, &sample, Duration::ZERO),
            Err(HvstatError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn test_network_rate() {
        let earlier = NetworkIo { bytes: 1000, packets: 10, errors: 0, drops: 1 };
        let later = NetworkIo { bytes: 6000, packets: 60, errors: 0, drops: 1 };

        let rate = network_io_rate(&earlier, &later, Duration::from_secs(5)).unwrap();
        assert_eq!(rate.bytes_per_sec, 1000.0);
        assert_eq!(rate.packets_per_sec, 10.0);
        assert_eq!(rate.drops_per_sec, 0.0);

        assert!(network_io_rate(&later, &earlier, TEN_SECS).is_err());
    }

    #[test]
    fn test_cpu_utilisation() {
        let earlier = Cpu::new(0, CpuFlag::Running, 100.0);
        let later = Cpu::new(0, CpuFlag::Running, 105.0);

        assert_eq!(cpu_utilisation(&earlier, &later, TEN_SECS).unwrap(), 50.0);
        assert!(matches!(
            cpu_utilisation(&later, &earlier, TEN_SECS),
            Err(HvstatError::CounterReset { field: "time" })
        ));
    }
}
