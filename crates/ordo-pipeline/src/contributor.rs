//! The contributor trait and the always-present bootstrap contributor.

use crate::notification::PipelineBuilder;
use ordo_core::{stages, Continuation, ContributorKey};

/// A unit of pipeline behavior.
///
/// A contributor is instantiated once per pipeline. During initialization it
/// registers one or more notifications, each an action with ordering
/// constraints relative to other contributors or to stage markers.
///
/// # Example
///
/// ```
/// use ordo_core::{stages, Continuation, ContributorKey};
/// use ordo_pipeline::{Contributor, PipelineBuilder};
///
/// #[derive(Default)]
/// struct ResponseEncoder;
///
/// impl Contributor for ResponseEncoder {
///     fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
///         pipeline
///             .notify(|ctx| {
///                 ctx.set_status(http::StatusCode::OK);
///                 Ok(Continuation::Continue)
///             })
///             .after::<stages::OperationResultInvocation>();
///     }
///
///     fn provides(&self) -> Vec<ContributorKey> {
///         vec![ContributorKey::of::<stages::ResponseCoding>()]
///     }
/// }
/// ```
pub trait Contributor: Send + Sync + 'static {
    /// Registers this contributor's notifications.
    fn initialize(&self, pipeline: &mut PipelineBuilder<'_>);

    /// Returns the stage markers this contributor provides.
    ///
    /// Constraints targeting any of these markers match every notification
    /// this contributor registers.
    fn provides(&self) -> Vec<ContributorKey> {
        Vec::new()
    }

    /// Returns the name used in logs, metrics and error records.
    fn name(&self) -> &str {
        ContributorKey::of::<Self>().name()
    }
}

/// The contributor every pipeline starts with.
///
/// It provides [`stages::Begin`] and registers a single unconstrained
/// notification that does nothing but continue. Contributors anchor
/// themselves to it with `after::<stages::Begin>()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BootstrapContributor;

impl Contributor for BootstrapContributor {
    fn initialize(&self, pipeline: &mut PipelineBuilder<'_>) {
        pipeline
            .notify(|_| Ok(Continuation::Continue))
            .describe("pipeline start");
    }

    fn provides(&self) -> Vec<ContributorKey> {
        vec![ContributorKey::of::<stages::Begin>()]
    }
}
