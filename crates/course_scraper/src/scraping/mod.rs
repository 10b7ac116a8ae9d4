//! Course catalog scraping: fetching listing fragments and parsing them into courses.
//!
//! A site is described by a [`SiteScraper`]. The [`pipeline::Pipeline`] only
//! talks to that trait, so supporting another university means writing another
//! implementation of it rather than touching the driver.

pub mod concordia;
mod error;
pub mod fetcher;
pub mod pipeline;
pub mod retry;

pub use error::{ScrapeError, TitleField};

use crate::types::{Course, RawListing};
use async_trait::async_trait;
use std::time::Duration;

/// What to look for on a catalog page.
#[derive(Debug, Clone)]
pub struct FetchTargets {
    /// Element id of the cookie consent "accept" button, if the site shows one
    pub consent_button_id: Option<String>,
    /// CSS selector matching one element per course listing
    pub listing_selector: String,
    /// How long to wait for the consent button before giving up on it
    pub consent_wait: Duration,
    /// How long to wait for the first listing to appear
    pub listing_wait: Duration,
}

impl Default for FetchTargets {
    fn default() -> Self {
        Self {
            consent_button_id: Some(concordia::CONSENT_BUTTON_ID.to_string()),
            listing_selector: concordia::LISTING_SELECTOR.to_string(),
            consent_wait: Duration::from_secs(10),
            listing_wait: Duration::from_secs(10),
        }
    }
}

/// Something that can turn a catalog URL into raw listing fragments.
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    /// Loads `url` and returns the outer HTML of every listing, in DOM order.
    async fn fetch_listings(&self, url: &str) -> Result<Vec<RawListing>, ScrapeError>;
}

/// A university catalog: how to fetch its pages and how to read its listings.
#[async_trait]
pub trait SiteScraper: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<RawListing>, ScrapeError>;

    /// Parses one fragment. Must be a pure function of the fragment.
    fn parse(&self, fragment: &RawListing) -> Result<Course, ScrapeError>;
}
