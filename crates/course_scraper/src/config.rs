//! Configuration: the list of catalog URLs and the scraper settings
use crate::scraping::fetcher::DEFAULT_USER_AGENT;
use crate::scraping::retry::{RetryPolicy, MAX_ATTEMPTS};
use crate::scraping::{concordia, FetchTargets, ScrapeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the Chrome/Chromium executable.
pub const CHROME_ENV_VAR: &str = "COURSE_SCRAPER_CHROME";

/// The catalog pages to scrape, e.g. `{"Urls": ["https://..."]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlList {
    #[serde(rename = "Urls", alias = "urls")]
    pub urls: Vec<String>,
}

impl UrlList {
    /// Loads and validates a URL list from a JSON file
    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        let content = fs::read_to_string(path).map_err(|e| ScrapeError::Config {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json(&content)
    }

    /// Parses a URL list, rejecting anything that isn't an absolute http(s) URL
    pub fn from_json(content: &str) -> Result<Self, ScrapeError> {
        let list: UrlList = serde_json::from_str(content)?;

        for raw in &list.urls {
            let parsed = Url::parse(raw).map_err(|e| ScrapeError::Config {
                message: format!("Invalid url {raw:?}: {e}"),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ScrapeError::Config {
                    message: format!("Unsupported url scheme in {raw:?}"),
                });
            }
        }

        Ok(list)
    }
}

/// Scraper settings. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub university_id: u32,
    /// Set to null to skip the cookie banner step entirely
    pub consent_button_id: Option<String>,
    pub listing_selector: String,
    pub consent_wait_secs: u64,
    pub listing_wait_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub chrome_executable: Option<PathBuf>,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            university_id: concordia::CONCORDIA_UNIVERSITY_ID,
            consent_button_id: Some(concordia::CONSENT_BUTTON_ID.to_string()),
            listing_selector: concordia::LISTING_SELECTOR.to_string(),
            consent_wait_secs: 10,
            listing_wait_secs: 10,
            max_attempts: MAX_ATTEMPTS,
            retry_backoff_ms: 500,
            chrome_executable: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScraperConfig {
    /// Loads settings from a JSON file, then applies environment overrides
    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        let content = fs::read_to_string(path).map_err(|e| ScrapeError::Config {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let config: ScraperConfig = serde_json::from_str(&content)?;
        Ok(config.with_env_overrides())
    }

    /// Default settings plus environment overrides
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(path) = std::env::var_os(CHROME_ENV_VAR) {
            self.chrome_executable = Some(PathBuf::from(path));
        }
        self
    }

    pub fn fetch_targets(&self) -> FetchTargets {
        FetchTargets {
            consent_button_id: self.consent_button_id.clone(),
            listing_selector: self.listing_selector.clone(),
            consent_wait: Duration::from_secs(self.consent_wait_secs),
            listing_wait: Duration::from_secs(self.listing_wait_secs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_base: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_list_accepts_both_key_spellings() {
        let list = UrlList::from_json(r#"{"Urls": ["https://www.concordia.ca/a.html"]}"#).unwrap();
        assert_eq!(list.urls, vec!["https://www.concordia.ca/a.html"]);

        let list = UrlList::from_json(r#"{"urls": ["http://example.edu/b"]}"#).unwrap();
        assert_eq!(list.urls.len(), 1);
    }

    #[test]
    fn test_url_list_rejects_relative_and_non_http() {
        assert!(matches!(
            UrlList::from_json(r#"{"Urls": ["/calendar/comp.html"]}"#),
            Err(ScrapeError::Config { .. })
        ));
        assert!(matches!(
            UrlList::from_json(r#"{"Urls": ["ftp://example.edu/list"]}"#),
            Err(ScrapeError::Config { .. })
        ));
        assert!(matches!(
            UrlList::from_json("not json"),
            Err(ScrapeError::Config { .. })
        ));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ScraperConfig =
            serde_json::from_str(r#"{"listing_wait_secs": 30, "consent_button_id": null}"#).unwrap();

        assert_eq!(config.university_id, 1);
        assert_eq!(config.listing_selector, ".course");
        assert_eq!(config.max_attempts, 3);

        let targets = config.fetch_targets();
        assert_eq!(targets.listing_wait, Duration::from_secs(30));
        assert!(targets.consent_button_id.is_none());
        assert_eq!(config.retry_policy().backoff_base, Duration::from_millis(500));
    }
}
