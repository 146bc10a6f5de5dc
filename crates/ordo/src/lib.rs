//! # Ordo
//!
//! **Constraint-ordered contributor pipelines**
//!
//! Ordo runs a request through a set of independent contributors. Each
//! contributor declares where its actions belong relative to other
//! contributors or well-known stages, and Ordo computes one total order at
//! startup:
//!
//! - **Declarative ordering** – `after::<T>()` / `before::<T>()` constraints on type identities
//! - **Two generators** – weighted walk (default) or topological sort, both rejecting cycles
//! - **Error containment** – a failing or panicking contributor turns into a 500, never a crash
//! - **Two execution shapes** – a loop runner and a chain-of-responsibility adaptor
//!
//! ## Quick Start
//!
//! ```rust
//! use ordo::prelude::*;
//!
//! #[derive(Default)]
//! struct Authenticate;
//!
//! impl Contributor for Authenticate {
//!     fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
//!         pipeline
//!             .notify(|_| Ok(Continuation::Continue))
//!             .after::<stages::Begin>();
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let config = OrdoConfig::default();
//! let registry = ContributorRegistry::new().register::<Authenticate>();
//! let pipeline = ordo::build_pipeline(&config, registry)?;
//!
//! let mut ctx = RequestContext::new();
//! assert_eq!(pipeline.run(&mut ctx).await?, PipelineOutcome::Completed);
//! # Ok::<(), ordo::OrdoError>(())
//! # }).expect("pipeline runs");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! OrdoConfig ──▶ ContributorRegistry ──initialize──▶ CallGraph (immutable, shared)
//!                                                        │
//!            RequestContext ──run──▶ Bootstrap → ... → ResponseCoding → ... → End
//! ```

#![doc(html_root_url = "https://docs.rs/ordo/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error;
use tracing::info;

// Re-export core types
pub use ordo_core as core;

// Re-export pipeline types
pub use ordo_pipeline as pipeline;

// Re-export telemetry types
pub use ordo_telemetry as telemetry;

// Re-export configuration types
pub use ordo_config as config;

use ordo_config::OrdoConfig;
use ordo_pipeline::{
    ContributorRegistry, Pipeline, PipelineError, PipelineRunner, TwoPhasePipelineAdaptor,
};
use ordo_telemetry::{Telemetry, TelemetryError};

/// Errors raised while assembling an Ordo pipeline.
#[derive(Error, Debug)]
pub enum OrdoError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ordo_config::ConfigError),

    /// The pipeline could not be initialized or run.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Telemetry could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Builds and initializes a [`PipelineRunner`] using the configured strategy.
///
/// The strategy from `config` replaces any generator set on `registry`.
///
/// # Errors
///
/// Returns [`OrdoError::Pipeline`] if the constraints are cyclic or invalid.
pub fn build_pipeline(
    config: &OrdoConfig,
    registry: ContributorRegistry,
) -> Result<PipelineRunner, OrdoError> {
    let mut pipeline = PipelineRunner::new(registry.with_strategy(config.pipeline.strategy));
    pipeline.initialize()?;
    Ok(pipeline)
}

/// Builds and initializes a [`TwoPhasePipelineAdaptor`] using the configured strategy.
///
/// # Errors
///
/// Returns [`OrdoError::Pipeline`] if the constraints are cyclic or invalid.
pub fn build_two_phase_pipeline(
    config: &OrdoConfig,
    registry: ContributorRegistry,
) -> Result<TwoPhasePipelineAdaptor, OrdoError> {
    let mut pipeline =
        TwoPhasePipelineAdaptor::new(registry.with_strategy(config.pipeline.strategy));
    pipeline.initialize()?;
    Ok(pipeline)
}

/// Initializes logging and metrics from the telemetry section of `config`.
///
/// Call once at startup, before building pipelines.
///
/// # Errors
///
/// Returns [`OrdoError::Telemetry`] if a subscriber or recorder is already
/// installed, or if the log filter is invalid.
pub fn init_telemetry(config: &OrdoConfig) -> Result<Telemetry, OrdoError> {
    let telemetry = ordo_telemetry::init_telemetry(&config.telemetry.to_telemetry_config())?;
    info!(
        service = telemetry.service_name(),
        strategy = %config.pipeline.strategy,
        "Telemetry initialized"
    );
    Ok(telemetry)
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use ordo::prelude::*;
/// ```
pub mod prelude {
    pub use ordo_core::{
        stages, CallGraphStrategy, Continuation, ContributorError, ContributorKey,
        ContributorResult, RequestContext, RequestId, ServerError,
    };

    pub use ordo_pipeline::{
        BoxFuture, CallGraph, Constraint, Contributor, ContributorRegistry, Pipeline,
        PipelineBuilder, PipelineError, PipelineOutcome, PipelineRunner, TwoPhasePipelineAdaptor,
    };

    pub use ordo_config::{ConfigLoader, OrdoConfig};

    pub use crate::OrdoError;
}
