//! Error types for the packager.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by a packaging run
///
/// Builds that exit non-zero and artifacts that cannot be found are only
/// errors when the configuration asks for it; by default they are logged
/// and recorded in the run report.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// The positional selection argument was not recognized
    #[error("Unrecognized argument: '{0}' (expected nothing or 'skip-compiler')")]
    InvalidArgument(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A build command exited unsuccessfully
    #[error("Build of '{project}' failed with exit code {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()))]
    BuildFailed { project: String, code: Option<i32> },

    /// A build command could not be started
    #[error("Failed to spawn build for '{project}': {message}")]
    BuildSpawn { project: String, message: String },

    /// A build command exceeded the configured timeout
    #[error("Build of '{project}' timed out after {seconds}s")]
    BuildTimeout { project: String, seconds: u64 },

    /// Filesystem error in the destination or an output directory
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PackagerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
