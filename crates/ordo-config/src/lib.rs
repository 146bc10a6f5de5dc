//! Typed configuration for Ordo.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! The configuration is built around the [`OrdoConfig`] struct:
//!
//! - [`PipelineSection`] - Call-graph generator selection
//! - [`TelemetrySection`] - Logging and metrics settings
//!
//! # Example
//!
//! ```no_run
//! use ordo_config::{ConfigLoader, OrdoConfig};
//!
//! # fn main() -> Result<(), ordo_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_dotenv()?
//!     .with_optional_file("ordo.toml")?
//!     .with_env_prefix("ORDO")
//!     .load()?;
//!
//! println!("Call graph strategy: {}", config.pipeline.strategy);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [pipeline]
//! strategy = "weighted"   # or "topological"
//!
//! [telemetry]
//! service_name = "my-service"
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! include_location = false
//!
//! [telemetry.metrics]
//! enabled = true
//! duration_buckets = [0.001, 0.01, 0.1, 1.0]
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`. For example:
//!
//! - `ORDO__PIPELINE__STRATEGY=topological`
//! - `ORDO__TELEMETRY__SERVICE_NAME=my-service`
//! - `ORDO__TELEMETRY__METRICS__ENABLED=false`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_core::CallGraphStrategy;

    #[test]
    fn test_documented_file_format_parses() {
        let config: OrdoConfig = toml::from_str(
            r#"
            [pipeline]
            strategy = "weighted"

            [telemetry]
            service_name = "my-service"

            [telemetry.logging]
            enabled = true
            level = "info"
            format = "json"
            include_location = false

            [telemetry.metrics]
            enabled = true
            duration_buckets = [0.001, 0.01, 0.1, 1.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.strategy, CallGraphStrategy::Weighted);
        assert_eq!(config.telemetry.service_name, "my-service");
        assert!(config.validate().is_ok());
    }
}
