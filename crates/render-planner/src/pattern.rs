//! Shell-style glob patterns for flavour recipe filters.
//!
//! Backed by [`glob::Pattern`]: `*`, `?` and `[...]` classes with ranges
//! and `!` negation.

use std::fmt;

use glob::Pattern;
use serde::{Deserialize, Deserializer};

use crate::error::{PlanError, Result};

/// A compiled recipe filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern(Pattern);

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Pattern::new(pattern)
            .map(Self)
            .map_err(|e| PlanError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Check whether the whole of `name` matches.
    pub fn matches(&self, name: &str) -> bool {
        self.0.matches(name)
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GlobPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        GlobPattern::new(&source).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob(p: &str) -> GlobPattern {
        GlobPattern::new(p).unwrap()
    }

    #[test]
    fn test_literal() {
        assert!(glob("t2m").matches("t2m"));
        assert!(!glob("t2m").matches("t2m_max"));
        assert!(!glob("t2m").matches("t2"));
    }

    #[test]
    fn test_star() {
        assert!(glob("*").matches(""));
        assert!(glob("t2m*").matches("t2m"));
        assert!(glob("t2m*").matches("t2m_max"));
        assert!(glob("*wind*").matches("surface_wind_10m"));
        assert!(glob("a*b*c").matches("axxbyyc"));
        assert!(!glob("a*b*c").matches("axxbyy"));
    }

    #[test]
    fn test_question_mark() {
        assert!(glob("tp?h").matches("tp3h"));
        assert!(!glob("tp?h").matches("tph"));
    }

    #[test]
    fn test_classes() {
        assert!(glob("tp[136]h").matches("tp6h"));
        assert!(!glob("tp[136]h").matches("tp2h"));
        assert!(glob("tp[0-9]h").matches("tp2h"));
        assert!(glob("tp[!0-9]h").matches("tpxh"));
        assert!(!glob("tp[!0-9]h").matches("tp2h"));
        assert!(glob("[]]").matches("]"));
        assert!(glob("[a-]").matches("-"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            GlobPattern::new("tp[12"),
            Err(PlanError::InvalidPattern { .. })
        ));
        assert!(GlobPattern::new("a**b").is_err());
    }

    #[test]
    fn test_display_keeps_source() {
        assert_eq!(glob("tp[0-9]*").to_string(), "tp[0-9]*");
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let ok: Vec<GlobPattern> = serde_yaml::from_str("['t2m*', 'wind?']").unwrap();
        assert_eq!(ok.len(), 2);
        assert!(serde_yaml::from_str::<Vec<GlobPattern>>("['tp[12']").is_err());
    }
}
