//! Core packaging logic.
//!
//! This module contains:
//! - Destination: purge, create and copy into the shared jar directory
//! - Packager: plans and executes a run

pub mod dist;
pub mod packager;

// Re-export commonly used types
pub use dist::{sha256_file, Destination};
pub use packager::{Packager, PlannedBuild, PlannedCopy, RunPlan};
