//! Core metrics definitions.
//!
//! All metrics follow Prometheus naming conventions:
//! - `_total` suffix for counters
//! - `_seconds` suffix for histograms measuring duration

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Register all core metrics with descriptions.
///
/// This ensures metrics appear in `/metrics` with proper metadata.
pub fn register_core_metrics() {
    // Registry metrics
    describe_counter!(
        "hvstat_driver_registrations_total",
        "Total number of driver registrations (by driver, detected)"
    );
    describe_counter!(
        "hvstat_driver_registration_failures_total",
        "Total number of rejected driver registrations"
    );
    describe_counter!(
        "hvstat_driver_detect_total",
        "Total number of detection probes (by driver, result)"
    );
    describe_gauge!("hvstat_drivers_registered", "Current number of registered drivers");

    // Collection metrics
    describe_histogram!(
        "hvstat_collect_duration_seconds",
        "Time taken by one driver collect call (by driver)"
    );
    describe_counter!(
        "hvstat_collect_failures_total",
        "Total number of failed collect calls (by driver)"
    );
    describe_gauge!("hvstat_domains_collected", "Domains returned by the last collect (by driver)");
}

pub fn record_registration(driver: &str, detected: bool) {
    counter!(
        "hvstat_driver_registrations_total",
        "driver" => driver.to_string(),
        "detected" => detected.to_string()
    )
    .increment(1);
}

pub fn record_registration_failure() {
    counter!("hvstat_driver_registration_failures_total").increment(1);
}

pub fn record_detect(driver: &str, detected: bool) {
    counter!(
        "hvstat_driver_detect_total",
        "driver" => driver.to_string(),
        "result" => detected.to_string()
    )
    .increment(1);
}

pub fn set_driver_count(count: usize) {
    gauge!("hvstat_drivers_registered").set(count as f64);
}

pub fn record_collect(driver: &str, elapsed: Duration, domains: usize) {
    histogram!("hvstat_collect_duration_seconds", "driver" => driver.to_string())
        .record(elapsed.as_secs_f64());
    gauge!("hvstat_domains_collected", "driver" => driver.to_string()).set(domains as f64);
}

pub fn record_collect_failure(driver: &str) {
    counter!("hvstat_collect_failures_total", "driver" => driver.to_string()).increment(1);
}
