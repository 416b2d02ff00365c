//! Snapshot persistence: tolerant JSON load and crash-safe save.
//!
//! The snapshot is a pretty-printed JSON array of [`Post`] records at a fixed
//! path, kept human-readable (2-space indent, non-ASCII left unescaped) so
//! that committing it to the repository produces reviewable diffs.
//!
//! # Crash safety
//!
//! Saving writes the serialized snapshot to an adjacent `.tmp` file and then
//! renames it over the target, so an interrupted run can never leave a
//! truncated snapshot behind. If the rename fails (some filesystems refuse
//! cross-device or locked renames), a direct overwrite of the target is
//! attempted before giving up.

use crate::models::Post;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

/// Load the previous snapshot, or `None` when no usable snapshot exists.
///
/// A missing file is the normal first-run case. An unreadable or corrupt file
/// is logged and also treated as absent, which makes the run behave like a
/// first run: every current post gets reported as new.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load(path: &Path) -> Option<Vec<Post>> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            info!(error = %e, "No previous snapshot; treating this as a first run");
            return None;
        }
    };

    match serde_json::from_str::<Vec<Post>>(&raw) {
        Ok(posts) => {
            info!(count = posts.len(), "Loaded previous snapshot");
            Some(posts)
        }
        Err(e) => {
            warn!(error = %e, "Previous snapshot is not valid JSON; treating this as a first run");
            None
        }
    }
}

/// Persist the snapshot, atomically where the filesystem allows it.
///
/// The parent directory is created if missing. Failure of the atomic
/// temp-then-rename sequence degrades to a direct overwrite; only a failure
/// of that fallback is returned to the caller (and fails the run).
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = posts.len()))]
pub async fn save(posts: &[Post], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(posts)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp = tmp_path(path);
    match write_via_rename(&json, path, &tmp).await {
        Ok(()) => {
            info!("Wrote snapshot");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, tmp = %tmp.display(), "Atomic snapshot write failed; retrying with a direct write");
            let _ = fs::remove_file(&tmp).await;
            fs::write(path, &json).await?;
            info!("Wrote snapshot (direct overwrite)");
            Ok(())
        }
    }
}

/// The target path with `.tmp` appended to the file name.
fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

async fn write_via_rename(json: &str, path: &Path, tmp: &Path) -> std::io::Result<()> {
    fs::write(tmp, json).await?;
    fs::rename(tmp, path).await
}
