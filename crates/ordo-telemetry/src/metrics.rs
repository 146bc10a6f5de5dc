//! Prometheus metrics for Ordo pipelines.
//!
//! Recording goes through the [`metrics`] facade, so every recording
//! function is a cheap no-op until a recorder is installed. [`init_metrics`]
//! installs a Prometheus recorder whose output is available through
//! [`render_metrics`]. No HTTP listener is started; exposing the text is up
//! to the host application.
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
//! ```rust
//! use ordo_telemetry::metrics::record_run;
//! use std::time::Duration;
//!
//! record_run("completed", Duration::from_millis(3));
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Metric name: pipeline runs by outcome.
pub const PIPELINE_RUNS_TOTAL: &str = "ordo_pipeline_runs_total";
/// Metric name: pipeline run duration.
pub const PIPELINE_RUN_DURATION_SECONDS: &str = "ordo_pipeline_run_duration_seconds";
/// Metric name: contained contributor failures.
pub const CONTRIBUTOR_FAILURES_TOTAL: &str = "ordo_contributor_failures_total";
/// Metric name: pipeline initializations.
pub const PIPELINE_INITIALIZATIONS_TOTAL: &str = "ordo_pipeline_initializations_total";

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for run duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 100µs up to 5s; pipeline runs are mostly in-process work
            duration_buckets: vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0,
            ],
        }
    }
}

/// Handle to the installed Prometheus recorder.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Creates a registry around an existing handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the Prometheus recorder.
///
/// Returns `Ok(None)` when metrics are disabled. Calling this again after a
/// successful installation returns the existing registry.
///
/// # Errors
///
/// Returns [`TelemetryError::MetricsInit`] if the recorder cannot be installed,
/// for example because another global recorder is already set.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }

    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(Some(MetricsRegistry::new(handle.clone())));
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(PIPELINE_RUN_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let handle = METRICS_HANDLE.get_or_init(|| handle).clone();
    register_metric_descriptions();

    Ok(Some(MetricsRegistry::new(handle)))
}

/// Returns the global metrics handle if initialized.
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(PIPELINE_RUNS_TOTAL, "Total number of pipeline runs by outcome");
    describe_histogram!(
        PIPELINE_RUN_DURATION_SECONDS,
        "Pipeline run duration in seconds"
    );
    describe_counter!(
        CONTRIBUTOR_FAILURES_TOTAL,
        "Contributor failures contained by the pipeline"
    );
    describe_counter!(
        PIPELINE_INITIALIZATIONS_TOTAL,
        "Pipeline initializations by generator and result"
    );
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Records a finished pipeline run.
///
/// # Arguments
///
/// * `outcome` - How the run ended (e.g. "completed", "failed")
/// * `duration` - Wall time of the run
pub fn record_run(outcome: &'static str, duration: Duration) {
    counter!(PIPELINE_RUNS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(PIPELINE_RUN_DURATION_SECONDS).record(duration.as_secs_f64());
}

/// Records a contributor failure (error, panic or abort).
pub fn record_contributor_failure(contributor: &str) {
    counter!(
        CONTRIBUTOR_FAILURES_TOTAL,
        "contributor" => contributor.to_string()
    )
    .increment(1);
}

/// Records a pipeline initialization attempt.
///
/// # Arguments
///
/// * `generator` - Call-graph generator name
/// * `result` - "ok" or the error kind
pub fn record_initialization(generator: &'static str, result: &'static str) {
    counter!(
        PIPELINE_INITIALIZATIONS_TOTAL,
        "generator" => generator,
        "result" => result
    )
    .increment(1);
}
