//! Error types for the scraping pipeline.

use std::fmt;
use thiserror::Error;

/// The title sub-pattern that could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleField {
    /// No element carrying the `title` class at all.
    Element,
    Type,
    Number,
    Credits,
}

impl fmt::Display for TitleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TitleField::Element => "title element",
            TitleField::Type => "type",
            TitleField::Number => "number",
            TitleField::Credits => "credits",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while scraping and parsing course listings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScrapeError {
    /// The page failed to load, or the browser/HTTP client failed
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// No course listing appeared on the page within the bounded wait
    #[error("No course listings on {url} after {waited_secs:.1}s")]
    ListingTimeout { url: String, waited_secs: f64 },

    /// The title of a listing is missing its type, number or credits
    #[error("Malformed course title, could not find the {field}: {title:?}")]
    MalformedTitle { field: TitleField, title: String },

    /// A subset scrape was requested with bounds outside the URL list
    #[error("Invalid scrape range: start {start} with count {count} is outside a list of {len} urls")]
    Range {
        start: usize,
        count: usize,
        len: usize,
    },

    /// The URL list or scraper settings could not be loaded
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ScrapeError {
    pub(crate) fn fetch(url: &str, err: impl fmt::Display) -> Self {
        ScrapeError::Fetch {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// Returns true if this error came from fetching a page (and is worth retrying).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScrapeError::Fetch { .. } | ScrapeError::ListingTimeout { .. }
        )
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(err: serde_json::Error) -> Self {
        ScrapeError::Config {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ScrapeError {
    fn from(err: std::io::Error) -> Self {
        ScrapeError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_fetch_errors_retry() {
        assert!(ScrapeError::fetch("https://a.test", "connection reset").is_retryable());
        assert!(ScrapeError::ListingTimeout {
            url: "https://a.test".to_string(),
            waited_secs: 10.0,
        }
        .is_retryable());
        assert!(!ScrapeError::MalformedTitle {
            field: TitleField::Credits,
            title: "COMP 248".to_string(),
        }
        .is_retryable());
        assert!(!ScrapeError::Range {
            start: 3,
            count: 2,
            len: 4,
        }
        .is_retryable());
    }

    #[test]
    fn test_malformed_title_message() {
        let err = ScrapeError::MalformedTitle {
            field: TitleField::Number,
            title: "COMP Intro".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed course title, could not find the number: \"COMP Intro\""
        );
    }
}
