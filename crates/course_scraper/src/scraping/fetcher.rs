//! Listing fetchers.
//!
//! - [`BrowserFetcher`] renders the page in headless Chromium, so listings
//!   inserted by client-side scripts are visible. This is what catalog sites
//!   with cookie banners and lazy accordions need.
//! - [`HttpFetcher`] does a plain GET. Good enough for statically rendered
//!   catalogs and much cheaper.

use super::{FetchTargets, ListingFetcher, ScrapeError};
use crate::types::RawListing;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::future::join_all;
use futures::StreamExt;
use reqwest::Client;
use scraper::{Html, Selector};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default user agent for both fetchers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches listings by driving a headless Chromium instance.
///
/// Every call launches its own browser and closes it before returning, on
/// success and on failure, so no session state leaks from one URL to the next.
pub struct BrowserFetcher {
    targets: FetchTargets,
    chrome_executable: Option<PathBuf>,
    user_agent: String,
    poll_interval: Duration,
}

impl BrowserFetcher {
    pub fn new(targets: FetchTargets) -> Self {
        Self {
            targets,
            chrome_executable: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            poll_interval: Duration::from_millis(250),
        }
    }

    /// Uses a specific Chrome/Chromium binary instead of searching for one.
    pub fn with_chrome_executable(mut self, path: Option<PathBuf>) -> Self {
        self.chrome_executable = path;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn browser_config(&self, url: &str) -> Result<BrowserConfig, ScrapeError> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg(format!("--user-agent={}", self.user_agent));

        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|e| ScrapeError::fetch(url, format!("invalid browser config: {e}")))
    }

    /// Everything that happens while the browser is open.
    async fn scrape_page(&self, browser: &Browser, url: &str) -> Result<Vec<RawListing>, ScrapeError> {
        let page = browser
            .new_page(url)
            .await
            .map_err(|e| ScrapeError::fetch(url, e))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| ScrapeError::fetch(url, e))?;

        self.dismiss_consent(&page, url).await;

        let started = Instant::now();
        let elements = self
            .poll_elements(&page, &self.targets.listing_selector, self.targets.listing_wait)
            .await;

        if elements.is_empty() {
            return Err(ScrapeError::ListingTimeout {
                url: url.to_string(),
                waited_secs: started.elapsed().as_secs_f64(),
            });
        }

        // Each element's markup is independent of the others.
        let fragments = join_all(elements.iter().map(|el| el.outer_html())).await;

        let mut listings = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            match fragment.map_err(|e| ScrapeError::fetch(url, e))? {
                Some(html) => listings.push(RawListing::from(html)),
                None => debug!(url = %url, "Listing element had no outer HTML"),
            }
        }

        Ok(listings)
    }

    /// Clicks the cookie banner away if it shows up. Never fails the fetch.
    async fn dismiss_consent(&self, page: &Page, url: &str) {
        let Some(button_id) = &self.targets.consent_button_id else {
            return;
        };

        let selector = format!("#{button_id}");
        let found = self
            .poll_elements(page, &selector, self.targets.consent_wait)
            .await;

        match found.first() {
            Some(button) => match button.click().await {
                Ok(_) => debug!(url = %url, "Dismissed cookie consent banner"),
                Err(e) => warn!(url = %url, error = %e, "Failed to click cookie consent button"),
            },
            None => warn!(
                url = %url,
                button = %button_id,
                "Cookie consent button not found, continuing without it"
            ),
        }
    }

    /// Polls until `selector` matches at least one element or `wait` runs out.
    async fn poll_elements(&self, page: &Page, selector: &str, wait: Duration) -> Vec<Element> {
        let deadline = Instant::now() + wait;

        loop {
            if let Ok(found) = page.find_elements(selector).await {
                if !found.is_empty() {
                    return found;
                }
            }

            if Instant::now() >= deadline {
                return Vec::new();
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl ListingFetcher for BrowserFetcher {
    async fn fetch_listings(&self, url: &str) -> Result<Vec<RawListing>, ScrapeError> {
        let config = self.browser_config(url)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::fetch(url, format!("failed to launch browser: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        debug!(url = %url, "Browser session opened");
        let result = self.scrape_page(&browser, url).await;

        if let Err(e) = browser.close().await {
            debug!(url = %url, error = %e, "Browser did not close cleanly");
        }
        if let Err(e) = browser.wait().await {
            debug!(url = %url, error = %e, "Failed to wait for browser exit");
        }
        handler_task.abort();
        debug!(url = %url, "Browser session closed");

        if let Ok(listings) = &result {
            info!(url = %url, fragments = listings.len(), "Fetched course listings");
        }

        result
    }
}

/// Fetches listings with a single HTTP GET, without running any scripts.
pub struct HttpFetcher {
    client: Client,
    selector: Selector,
}

impl HttpFetcher {
    pub fn new(targets: &FetchTargets, user_agent: &str) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScrapeError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let selector = listing_selector(&targets.listing_selector)?;

        Ok(Self { client, selector })
    }
}

#[async_trait]
impl ListingFetcher for HttpFetcher {
    async fn fetch_listings(&self, url: &str) -> Result<Vec<RawListing>, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::fetch(url, format!("server returned status {status}")));
        }

        let body = response.text().await.map_err(|e| ScrapeError::fetch(url, e))?;

        let listings = extract_listings(&body, &self.selector);
        if listings.is_empty() {
            return Err(ScrapeError::ListingTimeout {
                url: url.to_string(),
                waited_secs: 0.0,
            });
        }

        info!(url = %url, fragments = listings.len(), "Fetched course listings");
        Ok(listings)
    }
}

/// Parses a CSS selector for course listings.
pub fn listing_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Config {
        message: format!("Invalid listing selector {selector:?}: {e}"),
    })
}

/// Returns the outer HTML of every element in `html` matching `selector`, in document order.
pub fn extract_listings(html: &str, selector: &Selector) -> Vec<RawListing> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .map(|el| RawListing::from(el.html()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="cassie_accept_all_pre_banner">Accept</div>
          <div class="course"><h3 class="title">COMP 248 Object-Oriented Programming I (3.5 credits)</h3></div>
          <div class="other">not a course</div>
          <div class="course"><h3 class="title">COMP 249 Object-Oriented Programming II (3.5 credits)</h3></div>
        </body></html>
    "#;

    #[test]
    fn test_extract_listings_in_document_order() {
        let selector = listing_selector(".course").unwrap();
        let listings = extract_listings(PAGE, &selector);

        assert_eq!(listings.len(), 2);
        assert!(listings[0].as_str().starts_with("<div class=\"course\">"));
        assert!(listings[0].as_str().contains("COMP 248"));
        assert!(listings[1].as_str().contains("COMP 249"));
    }

    #[test]
    fn test_extract_listings_none_found() {
        let selector = listing_selector(".course").unwrap();
        assert!(extract_listings("<html><body></body></html>", &selector).is_empty());
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        assert!(matches!(
            listing_selector("div[["),
            Err(ScrapeError::Config { .. })
        ));
    }
}
