//! Bounded retry around per-URL fetches.

use super::SiteScraper;
use crate::types::RawListing;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info};

/// Default number of attempts per URL.
pub const MAX_ATTEMPTS: u32 = 3;

/// How hard to try each URL before giving up on it.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per URL, including the first one
    pub max_attempts: u32,
    /// Base delay between attempts (exponential backoff); zero disables waiting
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            backoff_base: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_base: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1 = first retry).
    fn delay(&self, attempt: u32) -> Duration {
        let base = self.backoff_base.as_millis() as u64;
        if base == 0 {
            return Duration::ZERO;
        }
        // base * 2^min(attempt-1, 5), capped at 10 seconds
        let exponential = base.saturating_mul(2u64.pow(attempt.saturating_sub(1).min(5)));
        let capped = exponential.min(10_000);
        // 0-20% jitter
        let jitter = rand::thread_rng().gen_range(0..=(capped / 5));
        Duration::from_millis(capped + jitter)
    }
}

/// Fetches every URL in order and concatenates the fragments.
///
/// A URL that keeps failing is logged and skipped; it contributes nothing and
/// the remaining URLs are still fetched. The result can therefore be partial
/// without any error reaching the caller.
pub async fn collect_fragments<S>(scraper: &S, urls: &[String], policy: &RetryPolicy) -> Vec<RawListing>
where
    S: SiteScraper + ?Sized,
{
    let mut accumulated = Vec::new();
    let max_attempts = policy.max_attempts.max(1);

    for url in urls {
        let mut attempt = 1;

        loop {
            match scraper.fetch(url).await {
                Ok(fragments) => {
                    debug!(url = %url, attempt, fragments = fragments.len(), "Fetch succeeded");
                    accumulated.extend(fragments);
                    break;
                }
                Err(e) => {
                    debug!(url = %url, attempt, error = ?e, "Fetch attempt failed");

                    if !e.is_retryable() || attempt >= max_attempts {
                        info!(
                            url = %url,
                            attempts = attempt,
                            error = %e,
                            "Giving up on url, skipping it"
                        );
                        break;
                    }

                    let delay = policy.delay(attempt);
                    info!(
                        url = %url,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying url"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    accumulated
}
