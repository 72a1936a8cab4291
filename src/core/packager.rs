//! Packaging run: build, purge, copy.
//!
//! All included builds run to completion, one after another, before the
//! destination is touched. Copies then happen in project order.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::adapters::{Builder, ShellBuilder};
use crate::config::{CleanupPolicy, FailurePolicy, PackagerConfig};
use crate::domain::{BuildOutcome, BuildStatus, NameMatcher, PackageReport, Selection};
use crate::error::PackagerError;

use super::dist::Destination;

/// One build the run will perform
#[derive(Debug, Clone, Serialize)]
pub struct PlannedBuild {
    pub project: String,
    pub dir: PathBuf,
    pub command: String,
}

/// One copy the run will attempt
#[derive(Debug, Clone, Serialize)]
pub struct PlannedCopy {
    pub project: String,
    pub search_dir: PathBuf,
    pub matcher: NameMatcher,
    pub canonical_name: String,
}

/// Everything a run would do, computed without side effects
#[derive(Debug, Clone, Serialize)]
pub struct RunPlan {
    pub selection: Selection,
    pub destination: PathBuf,
    pub builds: Vec<PlannedBuild>,
    pub purges: Vec<String>,
    pub copies: Vec<PlannedCopy>,
}

/// Drives a packaging run over a configured set of projects
pub struct Packager<B: Builder = ShellBuilder> {
    config: PackagerConfig,
    builder: B,
    destination: Destination,
}

impl Packager<ShellBuilder> {
    /// Create a packager that runs builds through the platform shell
    pub fn new(config: PackagerConfig) -> Self {
        let builder = ShellBuilder::new()
            .with_capture_output(config.capture_output)
            .with_timeout(config.build_timeout());
        Self::with_builder(config, builder)
    }
}

impl<B: Builder> Packager<B> {
    /// Create a packager with a custom builder
    pub fn with_builder(config: PackagerConfig, builder: B) -> Self {
        let destination = Destination::new(config.destination.clone());
        Self {
            config,
            builder,
            destination,
        }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Work out builds, purges and copies for a selection
    pub fn plan(&self, selection: Selection) -> RunPlan {
        let version = &self.config.version;
        let included: Vec<_> = self
            .config
            .projects
            .iter()
            .filter(|p| selection.includes(p.skippable))
            .collect();

        let builds = included
            .iter()
            .map(|p| PlannedBuild {
                project: p.name.clone(),
                dir: p.dir.clone(),
                command: p.build.clone(),
            })
            .collect();

        let purges = match self.config.cleanup {
            CleanupPolicy::Included => included
                .iter()
                .map(|p| p.canonical_name(version))
                .collect(),
            CleanupPolicy::All => self
                .config
                .projects
                .iter()
                .map(|p| p.canonical_name(version))
                .collect(),
        };

        let copies = included
            .iter()
            .map(|p| PlannedCopy {
                project: p.name.clone(),
                search_dir: p.search_dir(),
                matcher: p.matcher.clone(),
                canonical_name: p.canonical_name(version),
            })
            .collect();

        RunPlan {
            selection,
            destination: self.config.destination.clone(),
            builds,
            purges,
            copies,
        }
    }

    /// Execute a full run for an already validated selection
    #[instrument(skip(self), fields(version = %self.config.version))]
    pub async fn run(&self, selection: Selection) -> Result<PackageReport, PackagerError> {
        let plan = self.plan(selection);
        let mut report = PackageReport::new(self.config.version.clone(), selection);
        report.included = plan.builds.iter().map(|b| b.project.clone()).collect();

        info!(projects = ?report.included, "Starting packaging run");

        for build in &plan.builds {
            let outcome = self
                .builder
                .run_build(&build.project, &build.dir, &build.command)
                .await;

            if !outcome.success() {
                warn!(project = %build.project, status = ?outcome.status, "Build did not succeed");
                if self.config.on_build_failure == FailurePolicy::Abort {
                    return Err(build_error(&outcome));
                }
            }
            report.builds.push(outcome);
        }

        for name in &plan.purges {
            if self.destination.purge_stale(name).await? {
                report.purged.push(name.clone());
            }
        }

        self.destination.ensure_exists().await?;

        for copy in &plan.copies {
            let copied = self
                .destination
                .locate_and_copy(
                    &copy.project,
                    &copy.search_dir,
                    &copy.matcher,
                    &copy.canonical_name,
                )
                .await?;
            report.copied.extend(copied);
        }

        for project in report.missing() {
            warn!(project, "No artifact was copied");
        }

        report.mark_finished();
        info!(
            copied = report.copied.len(),
            failed_builds = report.failed_builds().len(),
            "Packaging run finished"
        );

        Ok(report)
    }
}

/// Error for a build outcome that the failure policy refuses to ignore
fn build_error(outcome: &BuildOutcome) -> PackagerError {
    match &outcome.status {
        BuildStatus::Exited { code } => PackagerError::BuildFailed {
            project: outcome.project.clone(),
            code: *code,
        },
        BuildStatus::SpawnFailed { error } => PackagerError::BuildSpawn {
            project: outcome.project.clone(),
            message: error.clone(),
        },
        BuildStatus::TimedOut { seconds } => PackagerError::BuildTimeout {
            project: outcome.project.clone(),
            seconds: *seconds,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config() -> PackagerConfig {
        PackagerConfig::defaults(Path::new("/work/mkjars-script"))
    }

    #[test]
    fn test_plan_all() {
        let packager = Packager::new(config());
        let plan = packager.plan(Selection::All);

        let builds: Vec<_> = plan.builds.iter().map(|b| b.project.as_str()).collect();
        assert_eq!(builds, vec!["compiler", "runtime", "agent"]);
        assert_eq!(plan.builds[0].command, "sbt assembly");
        assert_eq!(plan.builds[1].command, "mvn clean package");
        assert_eq!(
            plan.purges,
            vec![
                "rattlesnake-compiler-0.2.0-snapshot.jar",
                "rattlesnake-runtime-0.2.0-snapshot.jar",
                "rattlesnake-agent-0.2.0-snapshot.jar",
            ]
        );
        assert_eq!(plan.copies.len(), 3);
    }

    #[test]
    fn test_plan_skip_compiler() {
        let packager = Packager::new(config());
        let plan = packager.plan(Selection::SkipOptional);

        let builds: Vec<_> = plan.builds.iter().map(|b| b.project.as_str()).collect();
        assert_eq!(builds, vec!["runtime", "agent"]);
        assert_eq!(plan.purges.len(), 2);
        assert!(plan.copies.iter().all(|c| c.project != "compiler"));
    }

    #[test]
    fn test_plan_unconditional_cleanup() {
        let mut config = config();
        config.cleanup = CleanupPolicy::All;
        let packager = Packager::new(config);
        let plan = packager.plan(Selection::SkipOptional);

        assert_eq!(plan.builds.len(), 2);
        assert_eq!(plan.purges.len(), 3);
        assert!(plan
            .purges
            .contains(&"rattlesnake-compiler-0.2.0-snapshot.jar".to_string()));
    }

    #[test]
    fn test_build_error_mapping() {
        let timed_out = BuildOutcome {
            status: BuildStatus::TimedOut { seconds: 30 },
            ..BuildOutcome::exited("agent", "mvn clean package", None, Default::default())
        };
        assert!(matches!(
            build_error(&timed_out),
            PackagerError::BuildTimeout { seconds: 30, .. }
        ));

        let failed = BuildOutcome::exited("runtime", "mvn clean package", Some(1), Default::default());
        assert!(matches!(
            build_error(&failed),
            PackagerError::BuildFailed { code: Some(1), .. }
        ));
    }
}
