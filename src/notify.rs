//! Notification composition for newly discovered posts.
//!
//! The watcher itself does not send email. It composes a plain-text update
//! message and prints it on stdout; the surrounding automation captures the
//! process output, greps for the header phrase, and triggers delivery when it
//! is present. Keep [`NOTIFICATION_HEADER`] stable for that reason.

use crate::models::Post;
use chrono::Local;
use std::fmt::Write;
use tracing::{info, instrument};

/// Marker phrase the mail automation greps process output for.
pub const NOTIFICATION_HEADER: &str = "Updates in NTHU OGA Posts";

/// Compose the human-readable update message.
///
/// The message carries a run timestamp, the fixed link back to the source
/// page, and one `title - url` line per new post, in page order.
#[instrument(level = "info", skip_all, fields(count = changes.len()))]
pub fn compose(changes: &[Post], source_url: &str) -> String {
    let now = Local::now().format("%Y-%m-%d %H:%M");

    let mut body = String::new();
    writeln!(body, "{} ({})\n", NOTIFICATION_HEADER, now).unwrap();
    writeln!(body, "New updates in OGA Posts:").unwrap();
    writeln!(body, "{}", source_url).unwrap();
    for post in changes {
        writeln!(body, "{} - {}", post.title, post.url).unwrap();
    }

    info!(count = changes.len(), "Composed notification");
    body
}

/// Print the composed message on stdout for the mail automation to capture.
pub fn emit(message: &str) {
    println!("{message}");
}
