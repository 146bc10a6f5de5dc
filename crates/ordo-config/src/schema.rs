//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use ordo_core::CallGraphStrategy;
use ordo_telemetry::logging::LogConfig;
use ordo_telemetry::metrics::MetricsConfig;
use ordo_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

/// Pipeline configuration section.
///
/// # Example
///
/// ```
/// use ordo_config::PipelineSection;
/// use ordo_core::CallGraphStrategy;
///
/// let section: PipelineSection = toml::from_str(r#"strategy = "topological""#).unwrap();
/// assert_eq!(section.strategy, CallGraphStrategy::Topological);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// Call-graph generator used at initialization.
    #[serde(default)]
    pub strategy: CallGraphStrategy,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (production).
    #[default]
    Json,
    /// Human-readable format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g. "info" or "`ordo_pipeline=debug,warn`").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line number in log records.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingSection {
    /// Converts this section into the logging subsystem configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            include_location: self.include_location,
            ..base
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Install the Prometheus recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Histogram bucket boundaries for run duration, in seconds.
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: default_duration_buckets(),
        }
    }
}

impl MetricsSection {
    /// Converts this section into the metrics subsystem configuration.
    #[must_use]
    pub fn to_metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            enabled: self.enabled,
            duration_buckets: self.duration_buckets.clone(),
        }
    }
}

fn default_duration_buckets() -> Vec<f64> {
    MetricsConfig::default().duration_buckets
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name attached to telemetry.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            logging: LoggingSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl TelemetrySection {
    /// Converts this section into the telemetry subsystem configuration.
    ///
    /// ```
    /// use ordo_config::TelemetrySection;
    ///
    /// let config = TelemetrySection::default().to_telemetry_config();
    /// assert_eq!(config.service_name, "ordo");
    /// assert!(config.logging.json_format);
    /// ```
    #[must_use]
    pub fn to_telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig::builder()
            .service_name(&self.service_name)
            .logging(self.logging.to_log_config())
            .metrics(self.metrics.to_metrics_config())
            .build()
    }
}

fn default_service_name() -> String {
    "ordo".to_string()
}

fn default_true() -> bool {
    true
}
