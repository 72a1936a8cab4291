//! Adapter interfaces for external build tools.
//!
//! The packager never spawns processes itself; it goes through a [`Builder`]
//! so tests can substitute a recorder for real sbt/Maven invocations.

pub mod shell;

use std::path::Path;

use async_trait::async_trait;

use crate::domain::BuildOutcome;

// Re-export the shell builder
pub use shell::ShellBuilder;

/// Trait for running a sub-project's build command
#[async_trait]
pub trait Builder: Send + Sync {
    /// Run `command` with `dir` as working directory and wait for it to exit
    ///
    /// Never fails: spawn errors, timeouts and non-zero exits are all
    /// reported through the returned outcome so the caller can decide.
    async fn run_build(&self, project: &str, dir: &Path, command: &str) -> BuildOutcome;
}
