//! Call-graph strategy selection.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which algorithm turns notification constraints into a call order.
///
/// Both strategies agree whenever the constraints admit exactly one order.
/// They differ only in how they break ties between unrelated notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallGraphStrategy {
    /// Weight relaxation followed by a depth-first weighted walk.
    #[default]
    Weighted,
    /// Kahn-style topological sort, earliest registration first.
    Topological,
}

impl CallGraphStrategy {
    /// Returns the strategy name as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weighted => "weighted",
            Self::Topological => "topological",
        }
    }
}

impl std::fmt::Display for CallGraphStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallGraphStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weighted" => Ok(Self::Weighted),
            "topological" => Ok(Self::Topological),
            other => Err(format!(
                "unknown call graph strategy '{other}', expected 'weighted' or 'topological'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("weighted".parse(), Ok(CallGraphStrategy::Weighted));
        assert_eq!("Topological".parse(), Ok(CallGraphStrategy::Topological));
        assert!("random".parse::<CallGraphStrategy>().is_err());
    }

    #[test]
    fn test_default_is_weighted() {
        assert_eq!(CallGraphStrategy::default(), CallGraphStrategy::Weighted);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&CallGraphStrategy::Topological).unwrap();
        assert_eq!(json, "\"topological\"");
    }
}
