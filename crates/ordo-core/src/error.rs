//! Contributor error types.
//!
//! A contributor action reports failure by returning a [`ContributorError`].
//! The pipeline never propagates these out of a run: it converts each one
//! into a [`ServerError`] record, appends it to the request context and forces
//! the response status to 500.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Continuation;

/// Result type returned by contributor actions.
pub type ContributorResult = Result<Continuation, ContributorError>;

/// Errors raised by a contributor action while processing a request.
///
/// # Example
///
/// ```
/// use ordo_core::{ContributorError, ContributorResult};
///
/// fn decode(body: &str) -> ContributorResult {
///     if body.is_empty() {
///         return Err(ContributorError::failed("request body is empty"));
///     }
///     Ok(ordo_core::Continuation::Continue)
/// }
///
/// assert!(decode("").is_err());
/// ```
#[derive(Error, Debug)]
pub enum ContributorError {
    /// The action failed.
    #[error("{message}")]
    Failed {
        /// Human-readable error message.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The action panicked. Produced by the pipeline, never by contributors.
    #[error("contributor panicked: {message}")]
    Panicked {
        /// The panic payload, when it was a string.
        message: String,
    },
}

impl ContributorError {
    /// Creates a failure with a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a failure wrapping a source error.
    pub fn with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Failed {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a panic error from a caught panic payload.
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked { message }
    }

    /// Returns `true` if this error came from a panic.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }
}

impl From<anyhow::Error> for ContributorError {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// A contributor failure recorded in the request context.
///
/// This is the serializable form kept after the error itself has been
/// consumed, suitable for logging or rendering an error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Name of the contributor whose action failed.
    pub contributor: String,
    /// Human-readable error message.
    pub message: String,
    /// Whether the failure was a panic.
    #[serde(default)]
    pub panicked: bool,
}

impl ServerError {
    /// Creates a record for a contributor error.
    #[must_use]
    pub fn from_error(contributor: impl Into<String>, error: &ContributorError) -> Self {
        Self {
            contributor: contributor.into(),
            message: error.to_string(),
            panicked: error.is_panic(),
        }
    }

    /// Creates a record with a plain message.
    #[must_use]
    pub fn new(contributor: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            contributor: contributor.into(),
            message: message.into(),
            panicked: false,
        }
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.contributor, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_display() {
        let err = ContributorError::failed("boom");
        assert_eq!(err.to_string(), "boom");
        assert!(!err.is_panic());
    }

    #[test]
    fn test_with_source_keeps_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = ContributorError::with_source("cannot read entity", io);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("disk gone"));
    }

    #[test]
    fn test_from_panic_payloads() {
        let str_payload: Box<dyn std::any::Any + Send> = Box::new("static message");
        let err = ContributorError::from_panic(str_payload.as_ref());
        assert_eq!(err.to_string(), "contributor panicked: static message");

        let string_payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert!(ContributorError::from_panic(string_payload.as_ref())
            .to_string()
            .contains("owned"));

        let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert!(ContributorError::from_panic(other.as_ref()).is_panic());
    }

    #[test]
    fn test_from_anyhow() {
        let err: ContributorError = anyhow::anyhow!("upstream failed").into();
        assert_eq!(err.to_string(), "upstream failed");
    }

    #[test]
    fn test_server_error_record() {
        let err = ContributorError::Panicked {
            message: "oops".to_string(),
        };
        let record = ServerError::from_error("Decoder", &err);
        assert_eq!(record.contributor, "Decoder");
        assert!(record.panicked);
        assert_eq!(record.to_string(), "Decoder: contributor panicked: oops");
    }

    #[test]
    fn test_server_error_serializes() {
        let record = ServerError::new("Codec", "bad entity");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["contributor"], "Codec");
        assert_eq!(json["panicked"], false);
    }
}
