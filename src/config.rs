//! Runtime configuration for the watcher.
//!
//! Everything the pipeline needs to know lives in one explicit
//! [`WatchConfig`] value: the page to watch, the origin used to resolve
//! relative hrefs, the request timeout and User-Agent, and where the snapshot
//! lives. The struct is built from defaults, then an optional YAML file, then
//! CLI flags, in that order of precedence.

use crate::cli::Cli;
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;
use tracing::info;

/// The announcements page the watcher was built for.
pub const DEFAULT_SOURCE_URL: &str = "https://oga.site.nthu.edu.tw/p/403-1524-8945-1.php?Lang=en";

/// Origin used to absolutize relative hrefs found on the page.
pub const DEFAULT_BASE_URL: &str = "https://oga.site.nthu.edu.tw";

const DEFAULT_SNAPSHOT_PATH: &str = "data/nthu_oga_posts.json";

// The site rejects requests that don't look like an ordinary browser.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Effective configuration for one run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// The page fetched each run.
    pub source_url: String,
    /// Origin that relative hrefs are resolved against.
    pub base_url: String,
    /// HTTP request timeout in seconds. Bounded so an unattended scheduled
    /// run cannot hang on a stuck connection.
    pub request_timeout: u64,
    /// User-Agent header sent with the request.
    pub user_agent: String,
    /// Where the snapshot JSON file is read from and written to.
    pub snapshot_path: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            snapshot_path: DEFAULT_SNAPSHOT_PATH.to_string(),
        }
    }
}

impl WatchConfig {
    /// The request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Resolve the effective configuration from the parsed CLI arguments.
///
/// A config file named on the command line must load cleanly; that failure is
/// a hard error rather than a silent fall-back to defaults.
pub fn resolve(cli: &Cli) -> Result<WatchConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let config: WatchConfig = serde_yaml::from_str(&raw)?;
            info!(path = %path, "Loaded configuration file");
            config
        }
        None => WatchConfig::default(),
    };

    if let Some(source_url) = &cli.source_url {
        config.source_url = source_url.clone();
    }
    if let Some(snapshot_path) = &cli.snapshot_path {
        config.snapshot_path = snapshot_path.clone();
    }
    if let Some(request_timeout) = cli.request_timeout {
        config.request_timeout = request_timeout;
    }

    Ok(config)
}
