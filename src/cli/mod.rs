//! Command-line interface for mkjars.
//!
//! `mkjars` takes at most one positional argument. Without it every
//! sub-project is built and collected; `mkjars skip-compiler` leaves the
//! compiler out. Any other value is rejected before anything runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{load_config, FailurePolicy, PackagerConfig};
use crate::core::{Packager, RunPlan};
use crate::domain::{BuildStatus, PackageReport, Selection};

/// mkjars - build the Rattlesnake sub-projects and collect their jars
#[derive(Parser, Debug)]
#[command(name = "mkjars")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pass `skip-compiler` to leave out the compiler sub-project
    pub selection: Option<String>,

    /// Config file (default: .mkjars/config.yaml in this or a parent directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the destination directory
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Override the version stamped onto artifact names
    #[arg(long)]
    pub version_label: Option<String>,

    /// Stop before copying if any build fails
    #[arg(long)]
    pub fail_on_build_error: bool,

    /// Capture build output instead of streaming it
    #[arg(long)]
    pub capture_output: bool,

    /// Print what would happen without building or copying
    #[arg(long)]
    pub dry_run: bool,

    /// Print the plan or report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        // Must fail before any config is read or process spawned
        let selection = Selection::from_arg(self.selection.as_deref())?;

        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let config = self.resolve_config(&cwd)?;

        let packager = Packager::new(config);

        if self.dry_run {
            let plan = packager.plan(selection);
            if self.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
            return Ok(());
        }

        let report = packager.run(selection).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }

        Ok(())
    }

    /// Load configuration, apply flag overrides, then validate the result
    fn resolve_config(&self, cwd: &Path) -> Result<PackagerConfig> {
        let mut config = load_config(self.config.as_deref(), cwd)?;
        self.apply_overrides(&mut config, cwd);
        config
            .validate()
            .context("Configuration failed validation")?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut PackagerConfig, cwd: &Path) {
        if let Some(ref dest) = self.dest {
            config.destination = cwd.join(dest);
        }
        if let Some(ref version) = self.version_label {
            config.version = version.clone();
        }
        if self.fail_on_build_error {
            config.on_build_failure = FailurePolicy::Abort;
        }
        if self.capture_output {
            config.capture_output = true;
        }
    }
}

/// Print a dry-run plan
fn print_plan(plan: &RunPlan) {
    println!("Selection: {:?}", plan.selection);
    println!("Destination: {}", plan.destination.display());

    println!("\nBuilds:");
    for build in &plan.builds {
        println!("  {:<10} {} (in {})", build.project, build.command, build.dir.display());
    }

    println!("\nPurge:");
    for name in &plan.purges {
        println!("  {}", name);
    }

    println!("\nCopy:");
    for copy in &plan.copies {
        println!(
            "  {:<10} {}/{} -> {}",
            copy.project,
            copy.search_dir.display(),
            copy.matcher,
            copy.canonical_name
        );
    }
}

/// Print a summary of a finished run
fn print_report(report: &PackageReport) {
    println!("{:<12} {:<12} {:>10}", "PROJECT", "BUILD", "TIME");
    println!("{}", "-".repeat(36));
    for build in &report.builds {
        let status = match &build.status {
            BuildStatus::Exited { code: Some(0) } => "ok".to_string(),
            BuildStatus::Exited { code: Some(code) } => format!("exit {}", code),
            BuildStatus::Exited { code: None } => "killed".to_string(),
            BuildStatus::SpawnFailed { .. } => "spawn-failed".to_string(),
            BuildStatus::TimedOut { .. } => "timed-out".to_string(),
        };
        println!(
            "{:<12} {:<12} {:>9.1}s",
            build.project,
            status,
            build.elapsed.as_secs_f64()
        );
    }

    println!();
    for copied in &report.copied {
        println!(
            "{} ({} bytes, sha256 {})",
            copied.destination.display(),
            copied.size_bytes,
            &copied.sha256[..12.min(copied.sha256.len())]
        );
    }

    let missing = report.missing();
    if !missing.is_empty() {
        eprintln!("\n[No artifact copied for: {}]", missing.join(", "));
    }
}
