//! Build outcomes and the summary of a packaging run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::CopiedArtifact;
use super::selection::Selection;

/// How a single build invocation ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum BuildStatus {
    /// Process exited; `code` is `None` when killed by a signal
    Exited { code: Option<i32> },

    /// The shell could not be started
    SpawnFailed { error: String },

    /// Killed after exceeding the configured timeout
    TimedOut { seconds: u64 },
}

/// Result of running one project's build command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutcome {
    /// Project name
    pub project: String,

    /// Command that was run
    pub command: String,

    /// How the process ended
    pub status: BuildStatus,

    /// Wall-clock time spent waiting
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,

    /// Captured stdout (only in capture mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    /// Captured stderr (only in capture mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl BuildOutcome {
    /// Outcome for a process that ran to completion
    pub fn exited(project: &str, command: &str, code: Option<i32>, elapsed: Duration) -> Self {
        Self {
            project: project.to_string(),
            command: command.to_string(),
            status: BuildStatus::Exited { code },
            elapsed,
            stdout: None,
            stderr: None,
        }
    }

    /// Attach captured output
    pub fn with_output(mut self, stdout: String, stderr: String) -> Self {
        self.stdout = Some(stdout);
        self.stderr = Some(stderr);
        self
    }

    pub fn success(&self) -> bool {
        matches!(self.status, BuildStatus::Exited { code: Some(0) })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            BuildStatus::Exited { code } => code,
            _ => None,
        }
    }
}

/// Everything that happened during one packaging run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageReport {
    /// Version stamped onto the artifacts
    pub version: String,

    /// Selection derived from the command line
    pub selection: Selection,

    /// Projects that took part, in run order
    pub included: Vec<String>,

    /// One entry per build, in run order
    pub builds: Vec<BuildOutcome>,

    /// Canonical names cleared from the destination
    pub purged: Vec<String>,

    /// Artifacts copied into the destination
    pub copied: Vec<CopiedArtifact>,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,
}

impl PackageReport {
    pub fn new(version: impl Into<String>, selection: Selection) -> Self {
        Self {
            version: version.into(),
            selection,
            included: Vec::new(),
            builds: Vec::new(),
            purged: Vec::new(),
            copied: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Included projects for which no artifact was copied
    pub fn missing(&self) -> Vec<&str> {
        self.included
            .iter()
            .filter(|name| !self.copied.iter().any(|c| &c.project == *name))
            .map(String::as_str)
            .collect()
    }

    /// Builds that did not exit cleanly
    pub fn failed_builds(&self) -> Vec<&BuildOutcome> {
        self.builds.iter().filter(|b| !b.success()).collect()
    }

    pub fn mark_finished(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
