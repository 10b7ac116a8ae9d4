//! Concordia University's undergraduate calendar.

pub mod extract;
pub mod prerequisites;

use super::{ListingFetcher, ScrapeError, SiteScraper};
use crate::types::{Course, RawListing};
use async_trait::async_trait;

/// University id Concordia courses are stored under.
pub const CONCORDIA_UNIVERSITY_ID: u32 = 1;

/// Element id of the "accept all" button on the calendar's cookie banner.
pub const CONSENT_BUTTON_ID: &str = "cassie_accept_all_pre_banner";

/// Every course on a calendar page is a `div.course`.
pub const LISTING_SELECTOR: &str = ".course";

/// Scrapes Concordia calendar pages with any [`ListingFetcher`].
pub struct ConcordiaScraper<F> {
    fetcher: F,
    university_id: u32,
}

impl<F: ListingFetcher> ConcordiaScraper<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            university_id: CONCORDIA_UNIVERSITY_ID,
        }
    }

    pub fn with_university_id(mut self, university_id: u32) -> Self {
        self.university_id = university_id;
        self
    }
}

#[async_trait]
impl<F: ListingFetcher> SiteScraper for ConcordiaScraper<F> {
    async fn fetch(&self, url: &str) -> Result<Vec<RawListing>, ScrapeError> {
        self.fetcher.fetch_listings(url).await
    }

    fn parse(&self, fragment: &RawListing) -> Result<Course, ScrapeError> {
        extract::parse_listing(fragment.as_str(), self.university_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticPage(Vec<&'static str>);

    #[async_trait]
    impl ListingFetcher for StaticPage {
        async fn fetch_listings(&self, _url: &str) -> Result<Vec<RawListing>, ScrapeError> {
            Ok(self.0.iter().map(|html| RawListing::from(*html)).collect())
        }
    }

    #[tokio::test]
    async fn test_fetch_and_parse_through_trait() {
        let scraper = ConcordiaScraper::new(StaticPage(vec![
            r#"<div class="course"><h3 class="title">SOEN 287 Web Programming (3 credits)</h3></div>"#,
        ]))
        .with_university_id(4);

        let fragments = scraper.fetch("https://calendar.test/soen").await.unwrap();
        assert_eq!(fragments.len(), 1);

        let course = scraper.parse(&fragments[0]).unwrap();
        assert_eq!(course.university_id(), 4);
        assert_eq!(course.course_type(), "SOEN");
        assert_eq!(course.number(), 287);
        assert_eq!(course.credits(), "3");
        assert_eq!(course.name(), "Web Programming");
    }
}
