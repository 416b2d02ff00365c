//! Change detection between the current extraction and the persisted snapshot.
//!
//! The comparison is a pure function over two post lists. New posts are those
//! whose `(title, url)` pair does not appear anywhere in the previous
//! snapshot; everything else is considered already-seen, regardless of its
//! position or scrape date. The next snapshot always mirrors the page's
//! current state in full, so posts that disappeared from the page drop out of
//! the snapshot silently.

use crate::models::Post;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// The result of comparing a run's extraction against the prior snapshot.
#[derive(Debug)]
pub struct Reconciliation {
    /// Posts present now but absent from the snapshot, in page order.
    pub changes: Vec<Post>,
    /// The full current extraction, to be persisted as the new snapshot.
    pub next_snapshot: Vec<Post>,
}

/// Compare `current` against the previous snapshot.
///
/// With no previous snapshot (first run, or an unreadable file upstream),
/// every current post is new. Otherwise a post is new iff its `(title, url)`
/// pair is not found in `previous`; page order is preserved in `changes`.
///
/// # Arguments
///
/// * `current` - Posts extracted this run, in page order
/// * `previous` - The prior snapshot, if one exists
#[instrument(level = "debug", skip_all, fields(current = current.len(), previous = previous.as_ref().map(Vec::len)))]
pub fn reconcile(current: Vec<Post>, previous: Option<Vec<Post>>) -> Reconciliation {
    let changes = match &previous {
        None => current.clone(),
        Some(previous) => {
            let seen: HashSet<(&str, &str)> = previous.iter().map(Post::key).collect();
            current
                .iter()
                .filter(|post| !seen.contains(&post.key()))
                .cloned()
                .collect()
        }
    };
    debug!(changes = changes.len(), "Reconciled against snapshot");

    Reconciliation {
        changes,
        next_snapshot: current,
    }
}
