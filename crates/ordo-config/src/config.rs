//! Main configuration types.
//!
//! This module provides the top-level [`OrdoConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, PipelineSection, TelemetrySection};

/// Complete Ordo configuration.
///
/// This is the root configuration type that contains all configuration sections.
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use ordo_config::OrdoConfig;
/// use ordo_core::CallGraphStrategy;
///
/// let config = OrdoConfig::default();
/// assert_eq!(config.pipeline.strategy, CallGraphStrategy::Weighted);
/// assert_eq!(config.telemetry.service_name, "ordo");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct OrdoConfig {
    /// Pipeline configuration.
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Telemetry configuration (logging and metrics).
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl OrdoConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> OrdoConfigBuilder {
        OrdoConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The service name is empty
    /// - The log level is not a valid filter directive while logging is enabled
    /// - Duration buckets are empty, negative or unsorted while metrics are enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        let telemetry = &self.telemetry;

        if telemetry.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.service_name",
                "must not be empty",
            ));
        }

        if telemetry.logging.enabled {
            ordo_telemetry::logging::create_env_filter(&telemetry.logging.level).map_err(|e| {
                ConfigError::invalid_value("telemetry.logging.level", e.to_string())
            })?;
        }

        if telemetry.metrics.enabled {
            let buckets = &telemetry.metrics.duration_buckets;
            if buckets.is_empty() {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.duration_buckets",
                    "at least one bucket is required",
                ));
            }
            if buckets.iter().any(|b| !b.is_finite() || *b <= 0.0) {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.duration_buckets",
                    "buckets must be positive numbers",
                ));
            }
            if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.duration_buckets",
                    "buckets must be strictly increasing",
                ));
            }
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log formatting with file and line numbers
    /// - Debug log level
    ///
    /// # Example
    ///
    /// ```
    /// use ordo_config::{LogFormat, OrdoConfig};
    ///
    /// let config = OrdoConfig::development();
    /// assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;
        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logs at info level and metrics enabled. This matches the defaults.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.metrics.enabled = true;
        config
    }
}

/// Builder for [`OrdoConfig`].
#[derive(Debug, Default)]
pub struct OrdoConfigBuilder {
    pipeline: Option<PipelineSection>,
    telemetry: Option<TelemetrySection>,
}

impl OrdoConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pipeline section.
    #[must_use]
    pub fn pipeline(mut self, pipeline: PipelineSection) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set the telemetry section.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetrySection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> OrdoConfig {
        OrdoConfig {
            pipeline: self.pipeline.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }
}
