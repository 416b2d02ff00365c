//! Data models for scraped posts and extraction results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Post`]: One titled link discovered on the announcements page
//! - [`Extraction`]: The ordered posts from a single run, tagged with the
//!   parsing tier that produced them
//!
//! The snapshot file on disk is simply a JSON array of [`Post`] records, so
//! the serde field names here are the on-disk schema.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single announcement discovered on the source page.
///
/// Two posts are considered the same announcement iff both `title` and `url`
/// match exactly. The `scrape_date` records when we last saw the post and is
/// deliberately excluded from that identity, so a re-run on an unchanged page
/// refreshes dates without reporting anything as new.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Post {
    /// The link text, trimmed of surrounding whitespace.
    pub title: String,
    /// Absolute URL of the announcement. Relative hrefs on the page are
    /// resolved against the site origin before they get here.
    pub url: String,
    /// The calendar date this post was (last) scraped, serialized `YYYY-MM-DD`.
    pub scrape_date: NaiveDate,
}

impl Post {
    /// The identity used for change detection: the exact `(title, url)` pair.
    pub fn key(&self) -> (&str, &str) {
        (self.title.as_str(), self.url.as_str())
    }
}

/// Which parsing strategy produced an extraction.
///
/// The page is normally parsed with a fixed structural selector. When the
/// site's markup changes and that selector stops matching, the scraper
/// degrades to a heuristic scan over every link on the page instead of
/// reporting an empty (and therefore misleading) result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionTier {
    /// The expected `div.mtitle` structure was present.
    Primary,
    /// Heuristic all-links scan; results may be noisy.
    Fallback,
}

/// The outcome of scraping the page once: the posts in page order, plus the
/// tier that produced them.
#[derive(Debug)]
pub struct Extraction {
    pub posts: Vec<Post>,
    pub tier: ExtractionTier,
}

impl Extraction {
    /// An empty primary-tier extraction, used when the fetch itself failed.
    pub fn empty() -> Self {
        Self {
            posts: Vec::new(),
            tier: ExtractionTier::Primary,
        }
    }
}
