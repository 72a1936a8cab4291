//! Configuration for a packaging run.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI on top of the resolved config)
//! 2. Config file given with `--config`
//! 3. Config file discovered as `.mkjars/config.yaml` in the current
//!    directory or any parent
//! 4. Built-in defaults (the Rattlesnake layout, relative to the current
//!    directory)
//!
//! Relative paths in a discovered config file are resolved against the
//! directory containing `.mkjars/`; in an explicit `--config` file, against
//! the file's own directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{NameMatcher, ProjectDescriptor};
use crate::error::PackagerError;

/// Version stamped onto artifacts when nothing else is configured
pub const DEFAULT_VERSION: &str = "0.2.0-snapshot";

/// Destination directory when nothing else is configured
pub const DEFAULT_DESTINATION: &str = "../jars";

/// Directory searched for in the current directory and its parents
pub const CONFIG_DIR: &str = ".mkjars";

/// Config file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.yaml";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub version: Option<String>,
    pub destination: Option<String>,
    pub cleanup: Option<CleanupPolicy>,
    pub on_build_failure: Option<FailurePolicy>,
    pub capture_output: Option<bool>,
    pub build_timeout_seconds: Option<u64>,
    pub projects: Option<Vec<ProjectDescriptor>>,
}

/// Which canonical names are purged before copying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Only projects included in this run
    Included,

    /// Every configured project, skipped or not
    All,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self::Included
    }
}

/// What to do when a build does not exit cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log it, record it, keep going
    Ignore,

    /// Stop the run before any cleanup or copy
    Abort,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::Ignore
    }
}

/// Resolved configuration with absolute-or-base-relative paths
#[derive(Debug, Clone)]
pub struct PackagerConfig {
    /// Version label in every canonical name
    pub version: String,

    /// Shared output directory
    pub destination: PathBuf,

    pub cleanup: CleanupPolicy,

    pub on_build_failure: FailurePolicy,

    /// Capture build output instead of streaming it
    pub capture_output: bool,

    /// Per-build timeout (None = wait for the process to exit on its own)
    pub build_timeout_seconds: Option<u64>,

    /// Sub-projects in build and copy order
    pub projects: Vec<ProjectDescriptor>,

    /// Path to config file (if one was used)
    pub config_file: Option<PathBuf>,
}

impl PackagerConfig {
    /// The Rattlesnake layout, with relative paths resolved against `base`
    pub fn defaults(base: &Path) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            destination: base.join(DEFAULT_DESTINATION),
            cleanup: CleanupPolicy::default(),
            on_build_failure: FailurePolicy::default(),
            capture_output: false,
            build_timeout_seconds: None,
            projects: default_projects()
                .into_iter()
                .map(|p| p.rebased(base))
                .collect(),
            config_file: None,
        }
    }

    /// Layer a parsed config file over the defaults
    pub fn from_file(file: ConfigFile, base: &Path, config_path: Option<PathBuf>) -> Self {
        let defaults = Self::defaults(base);

        Self {
            version: file.version.unwrap_or(defaults.version),
            destination: file
                .destination
                .map(|d| resolve_path(base, &d))
                .unwrap_or(defaults.destination),
            cleanup: file.cleanup.unwrap_or(defaults.cleanup),
            on_build_failure: file.on_build_failure.unwrap_or(defaults.on_build_failure),
            capture_output: file.capture_output.unwrap_or(defaults.capture_output),
            build_timeout_seconds: file.build_timeout_seconds,
            projects: file
                .projects
                .map(|ps| ps.into_iter().map(|p| p.rebased(base)).collect())
                .unwrap_or(defaults.projects),
            config_file: config_path,
        }
    }

    pub fn build_timeout(&self) -> Option<Duration> {
        self.build_timeout_seconds.map(Duration::from_secs)
    }

    /// Check the configuration before anything runs
    pub fn validate(&self) -> Result<(), PackagerError> {
        if self.version.trim().is_empty() {
            return Err(PackagerError::InvalidConfig(
                "version cannot be empty".to_string(),
            ));
        }

        if self.projects.is_empty() {
            return Err(PackagerError::InvalidConfig(
                "at least one project must be configured".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut artifacts = HashSet::new();
        for project in &self.projects {
            if project.name.is_empty() {
                return Err(PackagerError::InvalidConfig(
                    "project name cannot be empty".to_string(),
                ));
            }
            if !names.insert(project.name.as_str()) {
                return Err(PackagerError::InvalidConfig(format!(
                    "duplicate project name '{}'",
                    project.name
                )));
            }
            if project.artifact.is_empty() || project.artifact.contains(&['/', '\\'][..]) {
                return Err(PackagerError::InvalidConfig(format!(
                    "project '{}' has an invalid artifact name '{}'",
                    project.name, project.artifact
                )));
            }
            // Two projects sharing a canonical name would overwrite each other
            if !artifacts.insert(project.artifact.as_str()) {
                return Err(PackagerError::InvalidConfig(format!(
                    "artifact name '{}' is used by more than one project",
                    project.artifact
                )));
            }
            if project.build.trim().is_empty() {
                return Err(PackagerError::InvalidConfig(format!(
                    "project '{}' has an empty build command",
                    project.name
                )));
            }
            project.matcher.validate().map_err(|e| {
                PackagerError::InvalidConfig(format!("project '{}': {}", project.name, e))
            })?;
        }

        Ok(())
    }
}

/// The three Rattlesnake sub-projects, relative to the script directory
pub fn default_projects() -> Vec<ProjectDescriptor> {
    vec![
        ProjectDescriptor {
            name: "compiler".to_string(),
            artifact: "rattlesnake-compiler".to_string(),
            dir: PathBuf::from("../rattlesnake-compiler"),
            build: "sbt assembly".to_string(),
            output_dir: PathBuf::from("target/scala-3.5.0"),
            matcher: NameMatcher::prefix("Rattlesnake-assembly"),
            skippable: true,
        },
        ProjectDescriptor {
            name: "runtime".to_string(),
            artifact: "rattlesnake-runtime".to_string(),
            dir: PathBuf::from("../rattlesnake-runtime"),
            build: "mvn clean package".to_string(),
            output_dir: PathBuf::from("target"),
            matcher: NameMatcher::suffix("with-dependencies.jar"),
            skippable: false,
        },
        ProjectDescriptor {
            name: "agent".to_string(),
            artifact: "rattlesnake-agent".to_string(),
            dir: PathBuf::from("../rattlesnake-agent"),
            build: "mvn clean package".to_string(),
            output_dir: PathBuf::from("target"),
            matcher: NameMatcher::suffix("with-dependencies.jar"),
            skippable: false,
        },
    ]
}

/// Find config file by searching `start` and its parents
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.is_file() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Load configuration from all sources
///
/// `explicit` is the `--config` argument; `cwd` is where discovery starts
/// and what the defaults are relative to. The result is not validated yet:
/// command-line overrides still apply on top of it.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<PackagerConfig> {
    let config = if let Some(path) = explicit {
        let file = load_config_file(path)?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());
        PackagerConfig::from_file(file, &base, Some(path.to_path_buf()))
    } else if let Some(path) = find_config_file(cwd) {
        let file = load_config_file(&path)?;
        // Base directory is the parent of .mkjars/
        let base = path
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());
        PackagerConfig::from_file(file, &base, Some(path))
    } else {
        PackagerConfig::defaults(cwd)
    };

    Ok(config)
}
