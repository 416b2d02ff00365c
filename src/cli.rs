//! Command-line interface definitions for OGA Watch.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Everything is optional: with no flags the watcher runs against the built-in
//! defaults, which is how the scheduled automation invokes it.

use clap::Parser;

/// Command-line arguments for the OGA Watch application.
///
/// Flags override the YAML config file, which overrides the built-in
/// defaults.
///
/// # Examples
///
/// ```sh
/// # Run against the defaults
/// oga_watch
///
/// # Keep the snapshot somewhere else
/// oga_watch -s /var/lib/oga_watch/posts.json
///
/// # Full config file
/// oga_watch -c watch.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Announcements page to watch
    #[arg(long, env = "OGA_SOURCE_URL")]
    pub source_url: Option<String>,

    /// Path of the snapshot JSON file
    #[arg(short, long, env = "OGA_SNAPSHOT_PATH")]
    pub snapshot_path: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,
}
