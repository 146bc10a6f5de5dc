//! Continuation signals returned by contributor actions.

use serde::{Deserialize, Serialize};

/// What the pipeline should do after an action completes.
///
/// | Signal | Effect |
/// |--------|--------|
/// | `Continue` | Run the next call |
/// | `RenderNow` | Skip the rest of the request phase and start rendering |
/// | `Finished` | Stop; the request has been fully handled |
/// | `Abort` | Stop; record a server error and answer with a 500 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Continuation {
    /// Proceed to the next notification.
    #[default]
    Continue,
    /// Jump to the response phase.
    RenderNow,
    /// Stop traversal normally.
    Finished,
    /// Stop traversal due to an error.
    Abort,
}

impl Continuation {
    /// Returns `true` if traversal stops after this signal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Abort)
    }

    /// Returns the signal name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::RenderNow => "render_now",
            Self::Finished => "finished",
            Self::Abort => "abort",
        }
    }
}

impl std::fmt::Display for Continuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_continue() {
        assert_eq!(Continuation::default(), Continuation::Continue);
    }

    #[test]
    fn test_terminal_signals() {
        assert!(!Continuation::Continue.is_terminal());
        assert!(!Continuation::RenderNow.is_terminal());
        assert!(Continuation::Finished.is_terminal());
        assert!(Continuation::Abort.is_terminal());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Continuation::RenderNow).unwrap();
        assert_eq!(json, "\"render_now\"");
        assert_eq!(Continuation::Abort.to_string(), "abort");
    }
}
