//! File name matchers for locating build outputs.
//!
//! A matcher is plain data so the rule can be checked without touching the
//! filesystem.

use glob::Pattern;
use serde::{Deserialize, Serialize};

/// Rule that decides whether a file in a build output directory is the artifact
///
/// Inside a project descriptor the matcher is read as a single-key map:
/// - `{ prefix: Rattlesnake-assembly }`
/// - `{ suffix: with-dependencies.jar }`
/// - `{ glob: "*-assembly-*.jar" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatcher {
    /// File name starts with the literal
    Prefix(String),

    /// File name ends with the literal
    Suffix(String),

    /// File name matches a glob pattern
    Glob(String),
}

impl NameMatcher {
    pub fn prefix(literal: impl Into<String>) -> Self {
        Self::Prefix(literal.into())
    }

    pub fn suffix(literal: impl Into<String>) -> Self {
        Self::Suffix(literal.into())
    }

    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::Glob(pattern.into())
    }

    /// Check a bare file name (no directory components) against this rule
    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            Self::Prefix(literal) => file_name.starts_with(literal.as_str()),
            Self::Suffix(literal) => file_name.ends_with(literal.as_str()),
            // Invalid patterns are rejected during config validation
            Self::Glob(pattern) => Pattern::new(pattern)
                .map(|p| p.matches(file_name))
                .unwrap_or(false),
        }
    }

    /// Ensure the rule is usable (non-empty literal, compilable glob)
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Prefix(literal) | Self::Suffix(literal) if literal.is_empty() => {
                Err(format!("{} matcher has an empty literal", self.kind()))
            }
            Self::Glob(pattern) => Pattern::new(pattern)
                .map(|_| ())
                .map_err(|e| format!("invalid glob pattern '{}': {}", pattern, e)),
            _ => Ok(()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Prefix(_) => "prefix",
            Self::Suffix(_) => "suffix",
            Self::Glob(_) => "glob",
        }
    }
}

impl std::fmt::Display for NameMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prefix(literal) => write!(f, "{}*", literal),
            Self::Suffix(literal) => write!(f, "*{}", literal),
            Self::Glob(pattern) => write!(f, "{}", pattern),
        }
    }
}
