//! The loop-based pipeline runner.
//!
//! # Lifecycle
//!
//! ```text
//! ContributorRegistry ──new──▶ Uninitialized ──initialize()──▶ Initialized
//!                                   │                              │
//!                              run() fails                  run() walks the
//!                            NotInitialized                 immutable graph
//! ```

use crate::callgraph::CallGraph;
use crate::contributor::Contributor;
use crate::error::PipelineError;
use crate::execution::{self, Step};
use crate::notification::BoxFuture;
use crate::outcome::PipelineOutcome;
use crate::registry::{ContributorRegistry, Resolved};
use ordo_core::RequestContext;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// A pipeline that can be initialized once and run for many requests.
///
/// Implemented by [`PipelineRunner`] and
/// [`TwoPhasePipelineAdaptor`](crate::TwoPhasePipelineAdaptor). For the same
/// registry both produce the same call order, the same continuation handling
/// and the same failure recording.
pub trait Pipeline: Send + Sync {
    /// Instantiates contributors, collects their notifications and builds the call graph.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::AlreadyInitialized`] on a second call
    /// - [`PipelineError::Cycle`] if the constraints are cyclic
    /// - [`PipelineError::InvalidConstraint`] if a constraint can never hold
    ///
    /// A failed initialization leaves the pipeline uninitialized.
    fn initialize(&mut self) -> Result<(), PipelineError>;

    /// Runs every call in order against `ctx`.
    ///
    /// Contributor failures are recorded on `ctx` and reflected in the
    /// returned outcome; they are never returned as errors.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotInitialized`] if called before a successful
    /// [`initialize`](Self::initialize). No action runs in that case.
    fn run<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<PipelineOutcome, PipelineError>>;

    /// Returns the call graph once initialized.
    fn call_graph(&self) -> Option<&CallGraph>;

    /// Returns the resolved contributors, bootstrap first.
    ///
    /// Empty until the pipeline is initialized.
    fn contributors(&self) -> &[Arc<dyn Contributor>];

    /// Returns `true` once [`initialize`](Self::initialize) has succeeded.
    fn is_initialized(&self) -> bool {
        self.call_graph().is_some()
    }
}

/// Runs the call graph as a plain loop.
///
/// # Example
///
/// ```rust
/// use ordo_core::{stages, Continuation, RequestContext};
/// use ordo_pipeline::{Contributor, ContributorRegistry, Pipeline, PipelineBuilder, PipelineOutcome, PipelineRunner};
///
/// #[derive(Default)]
/// struct Hello;
///
/// impl Contributor for Hello {
///     fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
///         pipeline
///             .notify(|ctx| {
///                 ctx.set_status(http::StatusCode::OK);
///                 Ok(Continuation::Continue)
///             })
///             .after::<stages::Begin>();
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let mut pipeline = PipelineRunner::new(ContributorRegistry::new().register::<Hello>());
/// pipeline.initialize().expect("acyclic");
///
/// let mut ctx = RequestContext::new();
/// let outcome = pipeline.run(&mut ctx).await.expect("initialized");
/// assert_eq!(outcome, PipelineOutcome::Completed);
/// assert_eq!(ctx.status(), Some(http::StatusCode::OK));
/// # });
/// ```
#[derive(Debug)]
pub struct PipelineRunner {
    registry: ContributorRegistry,
    state: Option<Resolved>,
}

impl PipelineRunner {
    /// Creates an uninitialized runner over `registry`.
    #[must_use]
    pub fn new(registry: ContributorRegistry) -> Self {
        Self {
            registry,
            state: None,
        }
    }

    /// Returns the registry the runner was built from.
    #[must_use]
    pub const fn registry(&self) -> &ContributorRegistry {
        &self.registry
    }
}

impl Pipeline for PipelineRunner {
    fn initialize(&mut self) -> Result<(), PipelineError> {
        if self.state.is_some() {
            return Err(PipelineError::AlreadyInitialized);
        }
        self.state = Some(self.registry.resolve()?);
        Ok(())
    }

    fn run<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<PipelineOutcome, PipelineError>> {
        Box::pin(async move {
            let state = self.state.as_ref().ok_or(PipelineError::NotInitialized)?;
            let started = Instant::now();
            let span = execution::run_span(ctx, &state.graph);
            let outcome = traverse(&state.graph, ctx).instrument(span).await;
            execution::record_run(ctx, outcome, started);
            Ok(outcome)
        })
    }

    fn call_graph(&self) -> Option<&CallGraph> {
        self.state.as_ref().map(|s| &s.graph)
    }

    fn contributors(&self) -> &[Arc<dyn Contributor>] {
        match &self.state {
            Some(state) => &state.contributors,
            None => &[],
        }
    }
}

async fn traverse(graph: &CallGraph, ctx: &mut RequestContext) -> PipelineOutcome {
    let calls = graph.calls();
    let mut position = 0;
    while let Some(call) = calls.get(position) {
        position = match execution::invoke(call, ctx).await {
            Step::Next => position + 1,
            Step::RenderNow => match graph.response_start() {
                Some(start) if start > position => start,
                Some(_) => position + 1,
                None => return PipelineOutcome::Finished,
            },
            Step::Stop(outcome) => return outcome,
        };
    }
    PipelineOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::PipelineBuilder;
    use ordo_core::{stages, Continuation};

    #[derive(Default)]
    struct Marker;

    impl Contributor for Marker {
        fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
            pipeline
                .notify(|ctx| {
                    ctx.set_extension(true);
                    Ok(Continuation::Continue)
                })
                .after::<stages::Begin>();
        }
    }

    #[tokio::test]
    async fn test_run_before_initialize_fails() {
        let pipeline = PipelineRunner::new(ContributorRegistry::new().register::<Marker>());
        let mut ctx = RequestContext::new();
        assert_eq!(
            pipeline.run(&mut ctx).await,
            Err(PipelineError::NotInitialized)
        );
        assert!(ctx.get_extension::<bool>().is_none());
        assert!(pipeline.contributors().is_empty());
        assert!(!pipeline.is_initialized());
    }

    #[tokio::test]
    async fn test_initialize_then_run() {
        let mut pipeline = PipelineRunner::new(ContributorRegistry::new().register::<Marker>());
        pipeline.initialize().expect("acyclic");
        assert!(pipeline.is_initialized());
        assert_eq!(pipeline.contributors().len(), 2);

        let mut ctx = RequestContext::new();
        let outcome = pipeline.run(&mut ctx).await;
        assert_eq!(outcome, Ok(PipelineOutcome::Completed));
        assert_eq!(ctx.get_extension::<bool>(), Some(&true));
    }

    #[test]
    fn test_second_initialize_fails() {
        let mut pipeline = PipelineRunner::new(ContributorRegistry::new());
        pipeline.initialize().expect("first");
        assert_eq!(
            pipeline.initialize(),
            Err(PipelineError::AlreadyInitialized)
        );
        assert_eq!(pipeline.call_graph().map(CallGraph::len), Some(1));
    }
}
