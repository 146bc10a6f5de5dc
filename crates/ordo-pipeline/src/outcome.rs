//! Run outcomes.

use std::fmt;

/// How a pipeline run ended.
///
/// Contributor failures never surface as errors from a run. They end it with
/// [`Failed`](Self::Failed) or [`Aborted`](Self::Aborted) and are recorded on
/// the request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineOutcome {
    /// Every call ran.
    Completed,
    /// A contributor stopped traversal normally.
    Finished,
    /// A contributor returned `Continuation::Abort`.
    Aborted,
    /// A contributor returned an error or panicked.
    Failed,
}

impl PipelineOutcome {
    /// Returns the outcome name used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Finished => "finished",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for outcomes that recorded a server error.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Aborted | Self::Failed)
    }
}

impl fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
