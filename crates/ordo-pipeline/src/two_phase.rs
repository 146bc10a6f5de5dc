//! Chain-of-responsibility execution.
//!
//! The [`TwoPhasePipelineAdaptor`] compiles the call graph into a linked
//! chain of [`Middleware`] units, for hosts that expect each stage to hand
//! control to the next one instead of being driven by a loop.
//!
//! ```text
//! request phase                                response phase
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//! │Bootstrap │──▶│  Auth    │──▶│ Execute  │──▶│ Encoder  │──▶│ Terminal │
//! └──────────┘   └──────────┘   └──────────┘   └──────────┘   └──────────┘
//!       │              │              │              ▲
//!       └──────────────┴──────────────┴─ RenderNow ──┘
//! ```
//!
//! Every unit in the request phase also holds the head of the response
//! phase, which is where `Continuation::RenderNow` jumps to. Units use the
//! same invocation step as [`PipelineRunner`](crate::PipelineRunner), so
//! both shapes behave identically.

use crate::callgraph::{CallGraph, ContributorCall};
use crate::contributor::Contributor;
use crate::error::PipelineError;
use crate::execution::{self, Step};
use crate::notification::BoxFuture;
use crate::outcome::PipelineOutcome;
use crate::registry::{ContributorRegistry, Resolved};
use crate::runner::Pipeline;
use ordo_core::RequestContext;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// One link of a compiled pipeline chain.
///
/// A unit processes the request and decides whether to hand it to the next
/// unit. The outcome of the whole remaining chain is returned.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this unit, used for logging.
    fn name(&self) -> &str;

    /// Processes the request and, unless traversal stops here, the rest of the chain.
    fn process<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, PipelineOutcome>;
}

/// Where `RenderNow` leads from a given unit.
#[derive(Clone)]
enum RenderTarget {
    /// Jump to the head of the response phase.
    Jump(Arc<dyn Middleware>),
    /// Already rendering: behave like `Continue`.
    Continue,
    /// Nothing to render: stop normally.
    Stop,
}

/// Wraps exactly one contributor call.
pub struct ContributorMiddleware {
    call: ContributorCall,
    next: Arc<dyn Middleware>,
    render: RenderTarget,
}

impl ContributorMiddleware {
    /// Returns the wrapped call.
    #[must_use]
    pub const fn call(&self) -> &ContributorCall {
        &self.call
    }

    /// Returns the next unit in the chain.
    #[must_use]
    pub fn next(&self) -> &Arc<dyn Middleware> {
        &self.next
    }
}

impl Middleware for ContributorMiddleware {
    fn name(&self) -> &str {
        self.call.name()
    }

    fn process<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, PipelineOutcome> {
        Box::pin(async move {
            match execution::invoke(&self.call, ctx).await {
                Step::Next => self.next.process(ctx).await,
                Step::RenderNow => match &self.render {
                    RenderTarget::Jump(head) => head.process(ctx).await,
                    RenderTarget::Continue => self.next.process(ctx).await,
                    RenderTarget::Stop => PipelineOutcome::Finished,
                },
                Step::Stop(outcome) => outcome,
            }
        })
    }
}

impl fmt::Debug for ContributorMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContributorMiddleware")
            .field("call", &self.call)
            .field("next", &self.next.name())
            .finish_non_exhaustive()
    }
}

/// The end of every chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalMiddleware;

impl Middleware for TerminalMiddleware {
    fn name(&self) -> &str {
        "terminal"
    }

    fn process<'a>(&'a self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, PipelineOutcome> {
        Box::pin(async { PipelineOutcome::Completed })
    }
}

/// Compiles a call graph into a chain and returns its head.
///
/// The chain is built back to front so every unit can own its successor.
fn build_chain(graph: &CallGraph) -> Arc<dyn Middleware> {
    let response_start = graph.response_start();
    let mut next: Arc<dyn Middleware> = Arc::new(TerminalMiddleware);
    let mut response_head: Option<Arc<dyn Middleware>> = None;

    for (position, call) in graph.iter().enumerate().rev() {
        let render = match response_start {
            Some(start) if position < start => response_head
                .clone()
                .map_or(RenderTarget::Stop, RenderTarget::Jump),
            Some(_) => RenderTarget::Continue,
            None => RenderTarget::Stop,
        };
        let unit: Arc<dyn Middleware> = Arc::new(ContributorMiddleware {
            call: call.clone(),
            next,
            render,
        });
        if response_start == Some(position) {
            response_head = Some(Arc::clone(&unit));
        }
        next = unit;
    }

    next
}

struct Compiled {
    resolved: Resolved,
    head: Arc<dyn Middleware>,
}

/// Runs the call graph as a chain of [`ContributorMiddleware`] units.
///
/// # Example
///
/// ```rust
/// use ordo_core::{stages, Continuation, ContributorKey, RequestContext};
/// use ordo_pipeline::{Contributor, ContributorRegistry, Pipeline, PipelineBuilder, TwoPhasePipelineAdaptor};
///
/// #[derive(Default)]
/// struct ShortCircuit;
///
/// impl Contributor for ShortCircuit {
///     fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
///         pipeline.notify(|_| Ok(Continuation::RenderNow)).after::<stages::Begin>();
///     }
/// }
///
/// #[derive(Default)]
/// struct Encoder;
///
/// impl Contributor for Encoder {
///     fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
///         pipeline
///             .notify(|ctx| {
///                 ctx.set_status(http::StatusCode::OK);
///                 Ok(Continuation::Continue)
///             })
///             .after::<ShortCircuit>();
///     }
///
///     fn provides(&self) -> Vec<ContributorKey> {
///         vec![ContributorKey::of::<stages::ResponseCoding>()]
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let registry = ContributorRegistry::new()
///     .register::<ShortCircuit>()
///     .register::<Encoder>();
/// let mut pipeline = TwoPhasePipelineAdaptor::new(registry);
/// pipeline.initialize().expect("acyclic");
///
/// let mut ctx = RequestContext::new();
/// pipeline.run(&mut ctx).await.expect("initialized");
/// assert_eq!(ctx.status(), Some(http::StatusCode::OK));
/// # });
/// ```
pub struct TwoPhasePipelineAdaptor {
    registry: ContributorRegistry,
    state: Option<Compiled>,
}

impl TwoPhasePipelineAdaptor {
    /// Creates an uninitialized adaptor over `registry`.
    #[must_use]
    pub fn new(registry: ContributorRegistry) -> Self {
        Self {
            registry,
            state: None,
        }
    }

    /// Returns the head of the compiled chain once initialized.
    ///
    /// Hosts embedding the chain directly can call
    /// [`Middleware::process`] on it. Such calls skip the run span and the
    /// run metrics recorded by [`Pipeline::run`].
    #[must_use]
    pub fn head(&self) -> Option<&Arc<dyn Middleware>> {
        self.state.as_ref().map(|s| &s.head)
    }
}

impl Pipeline for TwoPhasePipelineAdaptor {
    fn initialize(&mut self) -> Result<(), PipelineError> {
        if self.state.is_some() {
            return Err(PipelineError::AlreadyInitialized);
        }
        let resolved = self.registry.resolve()?;
        let head = build_chain(&resolved.graph);
        self.state = Some(Compiled { resolved, head });
        Ok(())
    }

    fn run<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
    ) -> BoxFuture<'a, Result<PipelineOutcome, PipelineError>> {
        Box::pin(async move {
            let state = self.state.as_ref().ok_or(PipelineError::NotInitialized)?;
            let started = Instant::now();
            let span = execution::run_span(ctx, &state.resolved.graph);
            let outcome = state.head.process(ctx).instrument(span).await;
            execution::record_run(ctx, outcome, started);
            Ok(outcome)
        })
    }

    fn call_graph(&self) -> Option<&CallGraph> {
        self.state.as_ref().map(|s| &s.resolved.graph)
    }

    fn contributors(&self) -> &[Arc<dyn Contributor>] {
        match &self.state {
            Some(state) => &state.resolved.contributors,
            None => &[],
        }
    }
}

impl fmt::Debug for TwoPhasePipelineAdaptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwoPhasePipelineAdaptor")
            .field("registry", &self.registry)
            .field("call_graph", &self.call_graph())
            .finish()
    }
}
