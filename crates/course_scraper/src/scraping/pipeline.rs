//! Top-level scrape driver: URL list in, courses out.

use super::retry::{collect_fragments, RetryPolicy};
use super::{ScrapeError, SiteScraper};
use crate::types::{Course, RawListing};
use std::time::Instant;
use tracing::{info, warn};

/// Runs a [`SiteScraper`] over a fixed list of catalog URLs.
pub struct Pipeline<S> {
    scraper: S,
    urls: Vec<String>,
    retry: RetryPolicy,
}

impl<S: SiteScraper> Pipeline<S> {
    pub fn new(scraper: S, urls: Vec<String>) -> Self {
        Self {
            scraper,
            urls,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Scrapes every URL.
    pub async fn scrape_all(&self) -> Vec<Course> {
        self.scrape_urls(&self.urls).await
    }

    /// Scrapes `count` URLs starting at index `start`.
    ///
    /// Bounds are checked before anything is fetched.
    pub async fn scrape_range(&self, start: usize, count: usize) -> Result<Vec<Course>, ScrapeError> {
        let urls = self.select_range(start, count)?;
        Ok(self.scrape_urls(urls).await)
    }

    /// The slice of URLs a [`Pipeline::scrape_range`] call would fetch.
    pub fn select_range(&self, start: usize, count: usize) -> Result<&[String], ScrapeError> {
        let len = self.urls.len();
        match start.checked_add(count) {
            Some(end) if end <= len => Ok(&self.urls[start..end]),
            _ => Err(ScrapeError::Range { start, count, len }),
        }
    }

    async fn scrape_urls(&self, urls: &[String]) -> Vec<Course> {
        let started = Instant::now();
        let fragments = collect_fragments(&self.scraper, urls, &self.retry).await;
        let fragment_count = fragments.len();
        let courses = self.parse_fragments(fragments);

        info!(
            urls = urls.len(),
            fragments = fragment_count,
            courses = courses.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Scrape finished"
        );

        courses
    }

    /// Parses every fragment, dropping the ones whose title cannot be read.
    pub fn parse_fragments(&self, fragments: Vec<RawListing>) -> Vec<Course> {
        fragments
            .into_iter()
            .enumerate()
            .filter_map(|(index, fragment)| match self.scraper.parse(&fragment) {
                Ok(course) => Some(course),
                Err(e) => {
                    warn!(fragment = index, error = %e, "Dropping course listing");
                    None
                }
            })
            .collect()
    }
}
