//! Page scrapers.
//!
//! One source, one module: [`oga`] turns the NTHU Office of Global Affairs
//! announcements page into structured [`crate::models::Post`] records.
//!
//! Scrapers absorb their own network and markup failures: a scraper returns
//! what it could extract (possibly nothing) and logs why, and the pipeline
//! decides what an empty extraction means for the run.

pub mod oga;
