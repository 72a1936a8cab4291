//! mkjars - build and collect the Rattlesnake jars
//!
//! Runs each sub-project's own build tool (sbt for the compiler, Maven for
//! the runtime and agent), then copies the produced archives into a shared
//! directory under version-stamped names such as
//! `rattlesnake-runtime-0.2.0-snapshot.jar`.
//!
//! # Flow
//!
//! 1. Interpret the optional `skip-compiler` argument
//! 2. Build every included project, one after another
//! 3. Purge stale outputs from the destination
//! 4. Create the destination if needed
//! 5. Copy each project's artifact under its canonical name
//!
//! # Modules
//!
//! - `adapters`: Build tool integration (shell commands)
//! - `core`: Packaging logic (Packager, Destination)
//! - `domain`: Data structures (ProjectDescriptor, NameMatcher, PackageReport)
//! - `config`: Defaults and `.mkjars/config.yaml` loading
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Build everything
//! mkjars
//!
//! # Leave out the compiler
//! mkjars skip-compiler
//!
//! # Show the plan only
//! mkjars --dry-run
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;

// Re-export main types at crate root for convenience
pub use adapters::{Builder, ShellBuilder};
pub use config::{CleanupPolicy, FailurePolicy, PackagerConfig};
pub use self::core::{Destination, Packager};
pub use domain::{NameMatcher, PackageReport, ProjectDescriptor, Selection};
pub use error::PackagerError;
