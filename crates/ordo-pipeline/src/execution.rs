//! Invocation of a single call, shared by every pipeline shape.
//!
//! [`invoke`] runs one action with error containment and translates its
//! continuation signal into a [`Step`]. Both the loop-based runner and the
//! middleware chain drive traversal from these steps, so signal handling and
//! failure recording cannot drift apart.

use crate::callgraph::{CallGraph, ContributorCall};
use crate::outcome::PipelineOutcome;
use futures_util::FutureExt;
use http::StatusCode;
use ordo_core::{Continuation, ContributorError, RequestContext, ServerError};
use ordo_telemetry::{log_contributor_failure, metrics};
use ordo_telemetry::log_run_complete;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{debug, info_span, warn, Span};

/// What traversal does after a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Invoke the next call.
    Next,
    /// Jump to the response phase.
    RenderNow,
    /// Stop traversal with an outcome.
    Stop(PipelineOutcome),
}

/// Invokes one call with error containment.
///
/// A returned error or a panic raised while the action is created or polled
/// is recorded on the context as a server error, the status is forced to 500
/// and traversal stops.
pub(crate) async fn invoke(call: &ContributorCall, ctx: &mut RequestContext) -> Step {
    debug!(
        contributor = call.name(),
        notification = call.index(),
        "Invoking contributor"
    );

    let result = AssertUnwindSafe(async { call.action().invoke(ctx).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(ContributorError::from_panic(payload.as_ref())));

    match result {
        Ok(Continuation::Continue) => Step::Next,
        Ok(Continuation::RenderNow) => Step::RenderNow,
        Ok(Continuation::Finished) => Step::Stop(PipelineOutcome::Finished),
        Ok(Continuation::Abort) => {
            warn!(
                request_id = %ctx.request_id(),
                contributor = call.name(),
                "Contributor aborted the pipeline"
            );
            fail(
                call,
                ctx,
                ServerError::new(call.name(), format!("aborted by {}", call.name())),
            );
            Step::Stop(PipelineOutcome::Aborted)
        }
        Err(error) => {
            log_contributor_failure!(ctx.request_id(), call.name(), error);
            fail(call, ctx, ServerError::from_error(call.name(), &error));
            Step::Stop(PipelineOutcome::Failed)
        }
    }
}

fn fail(call: &ContributorCall, ctx: &mut RequestContext, error: ServerError) {
    ctx.push_server_error(error);
    ctx.set_status(StatusCode::INTERNAL_SERVER_ERROR);
    metrics::record_contributor_failure(call.name());
}

/// Creates the span a run is instrumented with.
pub(crate) fn run_span(ctx: &RequestContext, graph: &CallGraph) -> Span {
    info_span!(
        "pipeline.run",
        request_id = %ctx.request_id(),
        generator = graph.generator(),
        calls = graph.len()
    )
}

/// Logs and records the end of a run.
pub(crate) fn record_run(ctx: &RequestContext, outcome: PipelineOutcome, started: Instant) {
    let elapsed = started.elapsed();
    log_run_complete!(
        ctx.request_id(),
        outcome,
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    );
    metrics::record_run(outcome.as_str(), elapsed);
}
