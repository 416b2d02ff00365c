//! Snapshot publication back to source control.
//!
//! The scheduled automation keeps the snapshot file in the repository itself,
//! so a run that found updates needs to commit and push the refreshed file.
//! That concern is isolated behind the [`SnapshotPublisher`] trait: the
//! pipeline asks a publisher to persist the path and does not know whether
//! that means git, or nothing at all.
//!
//! Local runs get [`NoopPublisher`]; inside the scheduled automation
//! environment (detected via the `CI` / `GITHUB_ACTIONS` markers) the caller
//! injects [`GitPublisher`]. Publication failures are reported to the caller
//! but are not meant to fail the run: the snapshot on disk is already current.

use std::error::Error;
use std::path::Path;
use tokio::process::Command;
use tracing::{info, instrument};

/// Capability for persisting the snapshot file beyond the local filesystem.
pub trait SnapshotPublisher {
    /// Publish the snapshot at `path`.
    async fn publish(&self, path: &Path) -> Result<(), Box<dyn Error>>;
}

/// Publisher for local and ad-hoc runs; records the decision and does nothing.
#[derive(Debug)]
pub struct NoopPublisher;

impl SnapshotPublisher for NoopPublisher {
    async fn publish(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        info!(path = %path.display(), "Not running in the scheduled environment; skipping snapshot publication");
        Ok(())
    }
}

/// Publisher that stages, commits, and pushes the snapshot with git.
#[derive(Debug)]
pub struct GitPublisher {
    commit_message: String,
}

impl GitPublisher {
    pub fn new() -> Self {
        Self {
            commit_message: "Update NTHU OGA posts data".to_string(),
        }
    }
}

impl Default for GitPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisher for GitPublisher {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    async fn publish(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        git(Command::new("git").args(["config", "user.name", "GitHub Action"])).await?;
        git(Command::new("git").args(["config", "user.email", "action@github.com"])).await?;
        git(Command::new("git").arg("add").arg(path)).await?;
        git(Command::new("git").args(["commit", "-m", &self.commit_message])).await?;
        git(Command::new("git").arg("push")).await?;
        info!("Snapshot committed and pushed");
        Ok(())
    }
}

/// Whether this process runs inside the scheduled automation environment.
pub fn running_in_ci() -> bool {
    std::env::var_os("CI").is_some() || std::env::var_os("GITHUB_ACTIONS").is_some()
}

/// Run one git command to completion, surfacing stderr on failure.
async fn git(command: &mut Command) -> Result<(), Box<dyn Error>> {
    let output = command.output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git exited with {}: {}", output.status, stderr.trim()).into());
    }
    Ok(())
}
