//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{ConfigError, LogFormat, OrdoConfig};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file or string (TOML or JSON)
/// 3. Environment variables
///
/// A file replaces the whole configuration; sections and fields it omits take
/// their default values.
///
/// # Example
///
/// ```no_run
/// use ordo_config::ConfigLoader;
///
/// # fn main() -> Result<(), ordo_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("ordo.toml")?
///     .with_env_prefix("ORDO")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: OrdoConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: OrdoConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is called automatically by `new()`, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = OrdoConfig::default();
        self
    }

    /// Start with development preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use ordo_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = OrdoConfig::development();
        self
    }

    /// Start with production preset configuration.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = OrdoConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats.
    /// The file format is determined by the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        debug!(path = %path.display(), "Loaded configuration file");

        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// # Arguments
    ///
    /// * `content` - Configuration content as a string
    /// * `format` - File format ("toml" or "json")
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use ordo_config::ConfigLoader;
    /// use ordo_core::CallGraphStrategy;
    ///
    /// let toml = r#"
    ///     [pipeline]
    ///     strategy = "topological"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.pipeline.strategy, CallGraphStrategy::Topological);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`.
    /// For example, with prefix "ORDO":
    /// - `ORDO__PIPELINE__STRATEGY=topological`
    /// - `ORDO__TELEMETRY__LOGGING__LEVEL=debug`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory or its parents.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Ok(self)
    }

    /// Load a specific `.env` file.
    ///
    /// Variables already present in the environment are not overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file is missing or cannot be parsed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Loaded .env file");
        Ok(self)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Environment variable parsing fails
    /// - Configuration validation fails
    pub fn load(mut self) -> Result<OrdoConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix, env::vars())?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without applying environment overrides or validating.
    ///
    /// # Example
    ///
    /// ```
    /// use ordo_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().load_unvalidated();
    /// assert!(config.validate().is_ok());
    /// ```
    #[must_use]
    pub fn load_unvalidated(self) -> OrdoConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<OrdoConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let section_prefix = format!("{prefix}__");
        for (key, value) in vars {
            if key.starts_with(&section_prefix) {
                self.apply_env_var(&key, &value, &section_prefix)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(path) = key.strip_prefix(prefix) else {
            return Err(ConfigError::env_parse_error(key, "invalid key format"));
        };
        let parts: Vec<&str> = path.split("__").collect();
        let telemetry = &mut self.config.telemetry;

        match parts.as_slice() {
            ["PIPELINE", "STRATEGY"] => {
                self.config.pipeline.strategy = value
                    .parse()
                    .map_err(|reason: String| ConfigError::env_parse_error(key, reason))?;
            }

            ["TELEMETRY", "SERVICE_NAME"] => {
                telemetry.service_name = value.to_string();
            }

            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                telemetry.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                telemetry.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            ["TELEMETRY", "METRICS", "ENABLED"] => {
                telemetry.metrics.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["TELEMETRY", "METRICS", "DURATION_BUCKETS"] => {
                telemetry.metrics.duration_buckets = value
                    .split(',')
                    .map(|b| b.trim().parse::<f64>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| {
                        ConfigError::env_parse_error(key, "expected comma-separated numbers")
                    })?;
            }

            _ => {
                return Err(ConfigError::env_parse_error(
                    key,
                    "unknown configuration key",
                ))
            }
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordo_core::CallGraphStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn temp_config(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, OrdoConfig::default());
    }

    #[test]
    fn test_toml_file() {
        let file = temp_config(
            ".toml",
            r#"
            [pipeline]
            strategy = "topological"

            [telemetry]
            service_name = "orders"

            [telemetry.logging]
            format = "pretty"
            "#,
        );

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.pipeline.strategy, CallGraphStrategy::Topological);
        assert_eq!(config.telemetry.service_name, "orders");
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
        assert_eq!(config.telemetry.logging.level, "info");
    }

    #[test]
    fn test_json_file() {
        let file = temp_config(
            ".json",
            r#"{"pipeline": {"strategy": "weighted"}, "telemetry": {"metrics": {"enabled": false}}}"#,
        );

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.pipeline.strategy, CallGraphStrategy::Weighted);
        assert!(!config.telemetry.metrics.enabled);
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new().with_file("/nonexistent/ordo.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_optional_missing_file() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/ordo.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, OrdoConfig::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = temp_config(".yaml", "pipeline: {}");
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_unknown_field_in_file_is_rejected() {
        let file = temp_config(".toml", "[pipeline]\norder = \"random\"\n");
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_unsupported_string_format() {
        let result = ConfigLoader::new().with_string("", "ini");
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_overrides(
                "ORDO",
                vars(&[
                    ("ORDO__PIPELINE__STRATEGY", "topological"),
                    ("ORDO__TELEMETRY__SERVICE_NAME", "billing"),
                    ("ORDO__TELEMETRY__LOGGING__LEVEL", "warn"),
                    ("ORDO__TELEMETRY__LOGGING__FORMAT", "pretty"),
                    ("ORDO__TELEMETRY__LOGGING__INCLUDE_LOCATION", "yes"),
                    ("ORDO__TELEMETRY__METRICS__ENABLED", "off"),
                    ("ORDO__TELEMETRY__METRICS__DURATION_BUCKETS", "0.01, 0.1, 1"),
                    ("PATH", "/usr/bin"),
                    ("ORDOX__PIPELINE__STRATEGY", "ignored"),
                ]),
            )
            .unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.pipeline.strategy, CallGraphStrategy::Topological);
        assert_eq!(config.telemetry.service_name, "billing");
        assert_eq!(config.telemetry.logging.level, "warn");
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);
        assert!(config.telemetry.logging.include_location);
        assert!(!config.telemetry.metrics.enabled);
        assert_eq!(config.telemetry.metrics.duration_buckets, vec![0.01, 0.1, 1.0]);
    }

    #[test]
    fn test_env_override_errors() {
        let cases = [
            ("ORDO__PIPELINE__STRATEGY", "random"),
            ("ORDO__TELEMETRY__METRICS__ENABLED", "maybe"),
            ("ORDO__TELEMETRY__LOGGING__FORMAT", "xml"),
            ("ORDO__TELEMETRY__METRICS__DURATION_BUCKETS", "fast,slow"),
            ("ORDO__SERVER__HTTP_ADDR", "0.0.0.0:80"),
        ];
        for (key, value) in cases {
            let mut loader = ConfigLoader::new();
            let result = loader.apply_env_overrides("ORDO", vars(&[(key, value)]));
            assert!(
                matches!(result, Err(ConfigError::EnvParseError { ref var, .. }) if var == key),
                "{key}={value}"
            );
        }
    }

    #[test]
    fn test_env_applies_over_file() {
        let file = temp_config(".toml", "[pipeline]\nstrategy = \"topological\"\n");
        let mut loader = ConfigLoader::new().with_file(file.path()).unwrap();
        loader
            .apply_env_overrides("ORDO", vars(&[("ORDO__PIPELINE__STRATEGY", "weighted")]))
            .unwrap();
        assert_eq!(
            loader.load_unvalidated().pipeline.strategy,
            CallGraphStrategy::Weighted
        );
    }

    #[test]
    fn test_dotenv_file_feeds_env_overrides() {
        let file = temp_config(
            ".env",
            "ORDO_DOTENV_TEST__TELEMETRY__SERVICE_NAME=from-dotenv\n",
        );
        let config = ConfigLoader::new()
            .with_dotenv_file(file.path())
            .unwrap()
            .with_env_prefix("ORDO_DOTENV_TEST")
            .load()
            .unwrap();
        assert_eq!(config.telemetry.service_name, "from-dotenv");
    }

    #[test]
    fn test_validation_runs_on_load() {
        let result = ConfigLoader::new()
            .with_string("[telemetry]\nservice_name = \"\"\n", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("sometimes"), None);
    }
}
