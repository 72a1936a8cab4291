//! Domain types for the packager.
//!
//! This module contains the core data structures:
//! - ProjectDescriptor: how to build a sub-project and find its jar
//! - NameMatcher: declarative file name rules
//! - Selection: which projects a run includes
//! - PackageReport: what a run did

pub mod artifact;
pub mod matcher;
pub mod report;
pub mod selection;

// Re-export commonly used types
pub use artifact::{CopiedArtifact, ProjectDescriptor, ARTIFACT_EXTENSION};
pub use matcher::NameMatcher;
pub use report::{BuildOutcome, BuildStatus, PackageReport};
pub use selection::{Selection, SKIP_KEYWORD};
