//! Pipeline error types.

use thiserror::Error;

/// Errors raised while building or running a pipeline.
///
/// Contributor failures during a run are *not* reported here: they are
/// recorded in the request context as server errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The ordering constraints contain a cycle.
    #[error("ordering constraints form a cycle: {}", .participants.join(" -> "))]
    Cycle {
        /// Contributor names along one concrete cycle.
        participants: Vec<String>,
    },

    /// The pipeline was run before a successful initialization.
    #[error("pipeline has not been initialized")]
    NotInitialized,

    /// The pipeline was initialized twice.
    #[error("pipeline is already initialized")]
    AlreadyInitialized,

    /// A constraint cannot be satisfied by construction.
    #[error("invalid constraint on {contributor}: {reason}")]
    InvalidConstraint {
        /// The contributor declaring the constraint.
        contributor: String,
        /// Why the constraint was rejected.
        reason: String,
    },
}

impl PipelineError {
    /// Returns the error kind as used in logs and metric labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Cycle { .. } => "cycle",
            Self::NotInitialized => "not_initialized",
            Self::AlreadyInitialized => "already_initialized",
            Self::InvalidConstraint { .. } => "invalid_constraint",
        }
    }
}
