//! HTTP GET against storefront pages with timeout and retry policy.
//!
//! [`Fetcher::fetch`] never returns an error. Every outcome, including a
//! missing page, is a [`FetchResult`] the caller inspects, so "page absent"
//! and "store unreachable" stay distinguishable.

use std::time::{Duration, Instant};

use reqwest::Client;
use thiserror::Error;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

/// Timeout, retry, and identity settings for a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub request_timeout: Duration,
    /// Additional attempts after the first failure, for transient errors only.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_retries: 2,
            backoff_base_ms: 250,
            user_agent: "Mozilla/5.0 (compatible; shopinsight/0.1; +storefront-insights)"
                .to_string(),
        }
    }
}

/// Why a fetch produced no page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("not found")]
    NotFound,
    #[error("timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP status {0}")]
    HttpStatus(u16),
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: String,
    /// Raw `Link` header, used for catalog cursors.
    pub link_header: Option<String>,
}

#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Fetched(Page),
    Failed(FetchFailure),
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub outcome: FetchOutcome,
    pub elapsed: Duration,
}

impl FetchResult {
    #[must_use]
    pub fn page(&self) -> Option<&Page> {
        match &self.outcome {
            FetchOutcome::Fetched(page) => Some(page),
            FetchOutcome::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.page().map(|p| p.body.as_str())
    }

    #[must_use]
    pub fn into_body(self) -> Option<String> {
        match self.outcome {
            FetchOutcome::Fetched(page) => Some(page.body),
            FetchOutcome::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&FetchFailure> {
        match &self.outcome {
            FetchOutcome::Fetched(_) => None,
            FetchOutcome::Failed(failure) => Some(failure),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.failure(), Some(FetchFailure::NotFound))
    }
}

/// Shared HTTP fetcher. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl Fetcher {
    /// Builds a `Fetcher` with one pooled `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying client cannot be
    /// constructed (e.g., invalid TLS config).
    pub fn new(settings: &FetchSettings) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.request_timeout.min(Duration::from_secs(10)))
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// Fetches `url`, retrying transient failures.
    ///
    /// A 404 is logged at debug level only; it is the normal answer for an
    /// optional page the store does not have.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let started = Instant::now();
        let result = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_once(url)
        })
        .await;
        let elapsed = started.elapsed();

        let outcome = match result {
            Ok(page) => FetchOutcome::Fetched(page),
            Err(err) => {
                let failure = to_failure(&err);
                if failure == FetchFailure::NotFound {
                    tracing::debug!(url, "page not found");
                } else {
                    tracing::warn!(url, error = %err, "fetch failed");
                }
                FetchOutcome::Failed(failure)
            }
        };

        FetchResult {
            url: url.to_owned(),
            outcome,
            elapsed,
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Page, ScraperError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| from_reqwest(e, url))?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(0);
            return Err(ScraperError::RateLimited {
                url: url.to_owned(),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let link_header = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.text().await.map_err(|e| from_reqwest(e, url))?;

        Ok(Page {
            status: status.as_u16(),
            body,
            link_header,
        })
    }
}

fn from_reqwest(err: reqwest::Error, url: &str) -> ScraperError {
    if err.is_timeout() {
        ScraperError::Timeout {
            url: url.to_owned(),
        }
    } else {
        ScraperError::Http(err)
    }
}

fn to_failure(err: &ScraperError) -> FetchFailure {
    match err {
        ScraperError::NotFound { .. } => FetchFailure::NotFound,
        ScraperError::Timeout { .. } => FetchFailure::Timeout,
        ScraperError::RateLimited { .. } => FetchFailure::HttpStatus(429),
        ScraperError::UnexpectedStatus { status, .. } => FetchFailure::HttpStatus(*status),
        ScraperError::Http(e) => FetchFailure::Network(e.to_string()),
        ScraperError::Deserialize { .. } | ScraperError::InvalidStoreUrl { .. } => {
            FetchFailure::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(body: &str) -> FetchResult {
        FetchResult {
            url: "https://shop.example/".to_owned(),
            outcome: FetchOutcome::Fetched(Page {
                status: 200,
                body: body.to_owned(),
                link_header: None,
            }),
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn fetched_result_exposes_body() {
        let result = fetched("<html></html>");
        assert_eq!(result.body(), Some("<html></html>"));
        assert!(result.failure().is_none());
        assert!(!result.is_not_found());
    }

    #[test]
    fn failed_result_has_no_body() {
        let result = FetchResult {
            url: "https://shop.example/pages/faq".to_owned(),
            outcome: FetchOutcome::Failed(FetchFailure::NotFound),
            elapsed: Duration::from_millis(5),
        };
        assert!(result.body().is_none());
        assert!(result.is_not_found());
        assert!(result.into_body().is_none());
    }

    #[test]
    fn maps_errors_to_failure_kinds() {
        assert_eq!(
            to_failure(&ScraperError::NotFound {
                url: "u".to_owned()
            }),
            FetchFailure::NotFound
        );
        assert_eq!(
            to_failure(&ScraperError::Timeout {
                url: "u".to_owned()
            }),
            FetchFailure::Timeout
        );
        assert_eq!(
            to_failure(&ScraperError::RateLimited {
                url: "u".to_owned(),
                retry_after_secs: 3
            }),
            FetchFailure::HttpStatus(429)
        );
        assert_eq!(
            to_failure(&ScraperError::UnexpectedStatus {
                status: 502,
                url: "u".to_owned()
            }),
            FetchFailure::HttpStatus(502)
        );
    }
}
