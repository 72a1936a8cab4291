//! Which sub-projects take part in a run.

use serde::{Deserialize, Serialize};

use crate::error::PackagerError;

/// The only recognized positional argument
pub const SKIP_KEYWORD: &str = "skip-compiler";

/// Result of interpreting the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Every configured project
    All,

    /// Skippable projects (the compiler) are left out
    SkipOptional,
}

impl Default for Selection {
    fn default() -> Self {
        Self::All
    }
}

impl Selection {
    /// Interpret the optional positional argument
    ///
    /// Absent means everything, the skip keyword leaves out skippable
    /// projects, and anything else is rejected before any work happens.
    pub fn from_arg(arg: Option<&str>) -> Result<Self, PackagerError> {
        match arg {
            None => Ok(Self::All),
            Some(SKIP_KEYWORD) => Ok(Self::SkipOptional),
            Some(other) => Err(PackagerError::InvalidArgument(other.to_string())),
        }
    }

    /// Whether a project with the given skippability is part of the run
    pub fn includes(self, skippable: bool) -> bool {
        match self {
            Self::All => true,
            Self::SkipOptional => !skippable,
        }
    }
}
