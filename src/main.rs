//! # OGA Watch
//!
//! A scheduled change detector for the NTHU Office of Global Affairs
//! announcements page. Each invocation fetches the page once, extracts the
//! titled links, diffs them against the last persisted snapshot, prints a
//! notification when new posts appeared, and rewrites the snapshot.
//!
//! ## Usage
//!
//! ```sh
//! oga_watch                       # defaults, snapshot at data/nthu_oga_posts.json
//! oga_watch -s /tmp/posts.json    # alternate snapshot location
//! ```
//!
//! ## Architecture
//!
//! The application is a single sequential pipeline:
//! 1. **Extract**: fetch the page and parse it into posts (primary selector,
//!    heuristic fallback when the markup changed)
//! 2. **Diff**: compare against the previous snapshot by `(title, url)`
//! 3. **Notify**: print the composed update message for the surrounding
//!    automation to pick up
//! 4. **Persist**: atomically overwrite the snapshot, then hand it to the
//!    configured [`publish::SnapshotPublisher`]
//!
//! The external scheduler serializes invocations; nothing here runs
//! concurrently. A run that extracts nothing (even after fallback) leaves the
//! snapshot untouched and exits non-zero so the scheduler surfaces it.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod diff;
mod models;
mod notify;
mod publish;
mod scrapers;
mod snapshot;
mod utils;

use cli::Cli;
use config::WatchConfig;
use publish::{GitPublisher, NoopPublisher, SnapshotPublisher};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("oga_watch starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = config::resolve(&args)?;
    info!(
        source_url = %config.source_url,
        snapshot_path = %config.snapshot_path,
        timeout_secs = config.request_timeout,
        "Configuration resolved"
    );

    // The scheduled automation commits the snapshot back to the repository;
    // anywhere else the publisher is a no-op.
    let result = if publish::running_in_ci() {
        run(&config, &GitPublisher::new()).await
    } else {
        run(&config, &NoopPublisher).await
    };

    let elapsed = start_time.elapsed();
    match result {
        Ok(()) => {
            info!(?elapsed, "Execution complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, ?elapsed, "Run failed");
            Err(e)
        }
    }
}

/// One full watch cycle: extract, diff, notify, persist, publish.
#[instrument(level = "info", skip_all)]
async fn run<P: SnapshotPublisher>(
    config: &WatchConfig,
    publisher: &P,
) -> Result<(), Box<dyn Error>> {
    let extraction = scrapers::oga::fetch_posts(config).await;
    if extraction.posts.is_empty() {
        // An empty read is a transient failure, not a page with everything
        // removed; the previous snapshot stays untouched.
        return Err("no posts extracted, even after fallback".into());
    }

    let snapshot_path = Path::new(&config.snapshot_path);
    let previous = snapshot::load(snapshot_path).await;
    let reconciliation = diff::reconcile(extraction.posts, previous);

    if reconciliation.changes.is_empty() {
        info!("No updates found");
    } else {
        info!(count = reconciliation.changes.len(), "Found updates");
        let message = notify::compose(&reconciliation.changes, &config.source_url);
        notify::emit(&message);
    }

    // Rewritten on every successful run so scrape dates stay fresh.
    snapshot::save(&reconciliation.next_snapshot, snapshot_path).await?;

    if !reconciliation.changes.is_empty() {
        if let Err(e) = publisher.publish(snapshot_path).await {
            warn!(error = %e, "Snapshot publication failed; the snapshot remains local");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Post;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Publisher that records how often the pipeline asked it to publish.
    struct CountingPublisher(AtomicUsize);

    impl CountingPublisher {
        fn new() -> Self {
            Self(AtomicUsize::new(0))
        }

        fn calls(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl SnapshotPublisher for CountingPublisher {
        async fn publish(&self, _path: &Path) -> Result<(), Box<dyn Error>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    const LISTING_HTML: &str = r#"<html><body>
        <div class="mtitle"><a href="/p/406-1524-111.php">Spring Exchange Program Application</a></div>
        <div class="mtitle"><a href="/p/406-1524-222.php">Scholarship Results Announced</a></div>
    </body></html>"#;

    async fn serve(html: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(html),
            )
            .mount(&server)
            .await;
        server
    }

    fn config_for(server: &MockServer, dir: &TempDir) -> WatchConfig {
        WatchConfig {
            source_url: format!("{}/p/403-1524-8945-1.php?Lang=en", server.uri()),
            base_url: server.uri(),
            request_timeout: 5,
            snapshot_path: dir.path().join("posts.json").to_str().unwrap().to_string(),
            ..WatchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_first_run_persists_everything_and_publishes() {
        let server = serve(LISTING_HTML).await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir);
        let publisher = CountingPublisher::new();

        run(&config, &publisher).await.unwrap();

        let saved = snapshot::load(Path::new(&config.snapshot_path)).await.unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].title, "Spring Exchange Program Application");
        assert_eq!(publisher.calls(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_page_publishes_nothing_on_second_run() {
        let server = serve(LISTING_HTML).await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir);
        let publisher = CountingPublisher::new();

        run(&config, &publisher).await.unwrap();
        run(&config, &publisher).await.unwrap();

        // Only the first run saw changes; the second just refreshed dates.
        assert_eq!(publisher.calls(), 1);
        let saved = snapshot::load(Path::new(&config.snapshot_path)).await.unwrap();
        assert_eq!(saved.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_fails_the_run_and_keeps_the_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let config = config_for(&server, &dir);

        let existing = vec![Post {
            title: "A".to_string(),
            url: "https://x/a".to_string(),
            scrape_date: "2025-05-06".parse().unwrap(),
        }];
        snapshot::save(&existing, Path::new(&config.snapshot_path))
            .await
            .unwrap();

        let publisher = CountingPublisher::new();
        let result = run(&config, &publisher).await;

        assert!(result.is_err());
        assert_eq!(publisher.calls(), 0);
        let saved = snapshot::load(Path::new(&config.snapshot_path)).await.unwrap();
        assert_eq!(saved, existing);
    }
}
