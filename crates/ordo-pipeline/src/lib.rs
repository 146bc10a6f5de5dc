//! # Ordo Pipeline
//!
//! Constraint-ordered contributor pipeline for the Ordo framework.
//!
//! Contributors register notifications with `before`/`after` constraints
//! against other contributors or stage markers. At initialization the
//! constraints are turned into a call graph, and every request then runs the
//! graph in order against a [`RequestContext`](ordo_core::RequestContext).
//!
//! ## Flow
//!
//! ```text
//! ContributorRegistry ──▶ Contributor::initialize ──▶ NotificationRegistry
//!                                                           │
//!                                  CallGraphGenerator ◀─────┘
//!                                           │
//!                                       CallGraph ──▶ PipelineRunner / TwoPhasePipelineAdaptor
//! ```
//!
//! ## Call-graph generators
//!
//! | Generator | Ordering |
//! |-----------|----------|
//! | `weighted` (default) | Depth-first from the bootstrap, lightest call first |
//! | `topological` | Kahn's algorithm, lowest registration index first |
//!
//! Both reject cyclic constraints with [`PipelineError::Cycle`].
//!
//! ## Error containment
//!
//! A contributor that returns an error, panics or aborts never escapes the
//! pipeline. The failure is recorded on the context, the status is set to
//! 500 and traversal stops; the outcome says how the run ended.
//!
//! ## Example
//!
//! ```
//! use ordo_core::{stages, Continuation, RequestContext};
//! use ordo_pipeline::{Contributor, ContributorRegistry, Pipeline, PipelineBuilder, PipelineRunner};
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! impl Contributor for Greeter {
//!     fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
//!         pipeline
//!             .notify(|ctx| {
//!                 ctx.set_extension("hello");
//!                 Ok(Continuation::Continue)
//!             })
//!             .after::<stages::Begin>()
//!             .describe("say hello");
//!     }
//! }
//!
//! let mut pipeline = PipelineRunner::new(ContributorRegistry::new().register::<Greeter>());
//! pipeline.initialize().expect("acyclic");
//! assert_eq!(
//!     pipeline.call_graph().map(|g| g.names()),
//!     Some(vec!["BootstrapContributor", "Greeter"])
//! );
//! ```

#![doc(html_root_url = "https://docs.rs/ordo-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod callgraph;
mod constraint;
mod contributor;
mod error;
mod execution;
mod notification;
mod outcome;
mod registry;
mod runner;
mod two_phase;

// Re-export main types at crate root
pub use callgraph::{
    generator_for, CallGraph, CallGraphGenerator, ContributorCall, DependencyGraph,
    TopologicalCallGraphGenerator, WeightedCallGraphGenerator,
};
pub use constraint::{Constraint, ConstraintKind};
pub use contributor::{BootstrapContributor, Contributor};
pub use error::PipelineError;
pub use notification::{
    Action, AsyncAction, BoxFuture, Notification, NotificationBuilder, NotificationRegistry,
    PipelineBuilder, SyncAction,
};
pub use outcome::PipelineOutcome;
pub use registry::{ContributorFactory, ContributorRegistry};
pub use runner::{Pipeline, PipelineRunner};
pub use two_phase::{ContributorMiddleware, Middleware, TerminalMiddleware, TwoPhasePipelineAdaptor};
