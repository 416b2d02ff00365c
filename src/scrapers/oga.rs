//! NTHU Office of Global Affairs announcement scraper.
//!
//! Scrapes the OGA English announcements page. Each announcement is a link
//! inside a `div.mtitle` container; hrefs are frequently relative
//! (`/p/406-1524-123.php` or even `406-1524-123.php`) and are resolved
//! against the site origin before storage.
//!
//! # Degraded mode
//!
//! The site has changed its markup before. When the primary selector matches
//! nothing on an otherwise successful fetch, the scraper falls back to
//! scanning every link on the page and keeping those whose visible text is
//! long enough to plausibly be a headline. The result is tagged with the
//! [`ExtractionTier`] that produced it so the degradation is visible to the
//! pipeline and to tests, not just in the logs.

use crate::config::WatchConfig;
use crate::models::{Extraction, ExtractionTier, Post};
use crate::utils::truncate_for_log;
use chrono::{Local, NaiveDate};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Container class wrapping each announcement link on the page.
const POST_SELECTOR: &str = "div.mtitle";

/// Links with visible text at or below this length are dropped during the
/// fallback scan; short labels are navigation, not headlines.
const FALLBACK_MIN_TITLE_CHARS: usize = 12;

/// Fetch the announcements page and extract every titled link.
///
/// Network errors, timeouts, and non-success statuses are absorbed here and
/// reported as an empty extraction; the pipeline decides what an empty run
/// means. Every extracted post is stamped with today's date.
#[instrument(level = "info", skip_all, fields(url = %config.source_url))]
pub async fn fetch_posts(config: &WatchConfig) -> Extraction {
    let base = match Url::parse(&config.base_url) {
        Ok(base) => base,
        Err(e) => {
            error!(base_url = %config.base_url, error = %e, "Configured base URL is not a valid URL");
            return Extraction::empty();
        }
    };

    let html = match fetch_page(config).await {
        Ok(html) => html,
        Err(e) => {
            error!(error = %e, "Failed to fetch announcements page");
            return Extraction::empty();
        }
    };

    let extraction = parse_posts(&html, &base, Local::now().date_naive());
    info!(
        count = extraction.posts.len(),
        tier = ?extraction.tier,
        "Extracted posts"
    );
    extraction
}

/// Single GET with browser-like headers and a bounded timeout.
async fn fetch_page(config: &WatchConfig) -> Result<String, Box<dyn Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.timeout())
        .build()?;

    debug!("Sending request");
    let response = client.get(&config.source_url).send().await?;
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    debug!(%status, %content_type, "Received response");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(preview = %truncate_for_log(&body, 500), "Non-success response body");
        return Err(format!("unexpected status {status} from {}", config.source_url).into());
    }

    let body = response.text().await?;
    debug!(bytes = body.len(), preview = %truncate_for_log(&body, 200), "Fetched page body");
    Ok(body)
}

/// Parse posts out of the page: primary selector first, heuristic fallback
/// when it matches nothing.
pub(crate) fn parse_posts(html: &str, base: &Url, today: NaiveDate) -> Extraction {
    let document = Html::parse_document(html);
    let marker_selector = Selector::parse(POST_SELECTOR).unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();

    let mut posts = Vec::new();
    for marker in document.select(&marker_selector) {
        if let Some(anchor) = marker.select(&link_selector).next() {
            let title = anchor.text().collect::<String>().trim().to_string();
            if title.is_empty() {
                continue;
            }
            if let Some(href) = anchor.value().attr("href") {
                debug!(%title, %href, "Found post");
                posts.push(Post {
                    title,
                    url: resolve_url(href, base),
                    scrape_date: today,
                });
            }
        }
    }
    if !posts.is_empty() {
        return Extraction {
            posts,
            tier: ExtractionTier::Primary,
        };
    }

    warn!(
        selector = POST_SELECTOR,
        "Primary selector matched nothing; scanning all links"
    );
    let mut posts = Vec::new();
    for anchor in document.select(&link_selector) {
        let title = anchor.text().collect::<String>().trim().to_string();
        if title.chars().count() <= FALLBACK_MIN_TITLE_CHARS {
            continue;
        }
        if let Some(href) = anchor.value().attr("href") {
            posts.push(Post {
                title,
                url: resolve_url(href, base),
                scrape_date: today,
            });
        }
    }
    Extraction {
        posts,
        tier: ExtractionTier::Fallback,
    }
}

/// Resolve a possibly relative href against the site origin.
///
/// Absolute hrefs pass through untouched; origin-relative (`/x`) and
/// document-relative (`x`) forms are joined onto the origin. An href the
/// `url` crate cannot join is kept verbatim rather than dropped.
fn resolve_url(href: &str, base: &Url) -> String {
    match base.join(href) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            warn!(%href, error = %e, "Could not resolve href; keeping it as-is");
            href.to_string()
        }
    }
}
