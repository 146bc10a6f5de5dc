//! Observability for Ordo pipelines.
//!
//! - **Logging**: structured JSON or pretty output through `tracing-subscriber`
//! - **Metrics**: Prometheus-format metrics via the `metrics` facade
//!
//! Pipelines record through this crate whether or not anything was
//! initialized. Without a subscriber or recorder the calls are no-ops.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `ordo_pipeline_runs_total` | Counter | `outcome` | Pipeline runs by outcome |
//! | `ordo_pipeline_run_duration_seconds` | Histogram | - | Pipeline run latency |
//! | `ordo_contributor_failures_total` | Counter | `contributor` | Contained contributor failures |
//! | `ordo_pipeline_initializations_total` | Counter | `generator`, `result` | Pipeline initializations |
//!
//! # Example
//!
//! ```rust,no_run
//! use ordo_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .service_name("checkout")
//!     .build();
//!
//! let telemetry = init_telemetry(&config).expect("telemetry init");
//! if let Some(text) = telemetry.render_metrics() {
//!     println!("{text}");
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, MetricsConfig, MetricsRegistry};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Handles to the initialized telemetry subsystems.
#[derive(Debug, Clone)]
pub struct Telemetry {
    service_name: String,
    metrics: Option<MetricsRegistry>,
}

impl Telemetry {
    /// Returns the configured service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the metrics registry, if metrics are enabled.
    #[must_use]
    pub const fn metrics(&self) -> Option<&MetricsRegistry> {
        self.metrics.as_ref()
    }

    /// Renders metrics in Prometheus format, if metrics are enabled.
    #[must_use]
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(MetricsRegistry::render)
    }
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if the configuration is invalid or any subsystem
/// fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<Telemetry> {
    if config.service_name.trim().is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "service name must not be empty".to_string(),
        ));
    }

    init_logging(&config.logging)?;
    let metrics = init_metrics(&config.metrics)?;

    tracing::debug!(
        service.name = %config.service_name,
        metrics = metrics.is_some(),
        "Telemetry initialized"
    );

    Ok(Telemetry {
        service_name: config.service_name.clone(),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_service_name_rejected() {
        let config = TelemetryConfig::builder().service_name("  ").build();
        assert!(matches!(
            init_telemetry(&config),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_disabled_subsystems() {
        let config = TelemetryConfig::builder()
            .service_name("quiet")
            .logging(LogConfig {
                enabled: false,
                ..LogConfig::default()
            })
            .metrics(MetricsConfig {
                enabled: false,
                ..MetricsConfig::default()
            })
            .build();

        let telemetry = init_telemetry(&config).expect("nothing to install");
        assert_eq!(telemetry.service_name(), "quiet");
        assert!(telemetry.metrics().is_none());
        assert!(telemetry.render_metrics().is_none());
    }
}
