//! Observability infrastructure: tracing and metrics.
//!
//! Library code only emits `tracing` events and `metrics` samples. Installing
//! a subscriber or an exporter is left to the process that embeds hvstat,
//! through `init`.

use crate::config::ObservabilityConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod metrics;

/// Build the log filter: `RUST_LOG` if set, otherwise the configured level.
fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Initialize the global observability infrastructure.
///
/// Call once at start-up. Installs a fmt subscriber and, when
/// `metrics_listen` is configured, a Prometheus exporter serving `/metrics`.
///
/// # Errors
///
/// Fails if a global subscriber or recorder is already installed, or the
/// metrics listener cannot be set up.
pub fn init(config: &ObservabilityConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer().with_target(true).with_level(true))
        .try_init()?;

    if let Some(addr) = config.metrics_listen {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        tracing::info!(%addr, "Prometheus metrics exporter listening");
    }

    metrics::register_core_metrics();
    tracing::info!("Observability initialized");

    Ok(())
}
