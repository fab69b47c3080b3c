use thiserror::Error;

use crate::fetch::FetchFailure;

/// Low-level failure of one HTTP exchange. Consumed by the retry loop and
/// converted to a [`FetchFailure`] before it leaves the fetcher.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid store URL \"{url}\": {reason}")]
    InvalidStoreUrl { url: String, reason: String },
}

/// Request-level outcome of an analysis that could not produce insights.
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("invalid store URL \"{url}\": {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("store {url} is unreachable: {failure}")]
    Unreachable { url: String, failure: FetchFailure },

    #[error("{url} does not look like a Shopify store")]
    NotShopify { url: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl InsightsError {
    /// The rejection reason recorded on the outward record, if this error is
    /// one of the "cannot produce insights" outcomes.
    #[must_use]
    pub fn failure_reason(&self) -> Option<shopinsight_core::FailureReason> {
        match self {
            InsightsError::Unreachable { .. } => Some(shopinsight_core::FailureReason::Unreachable),
            InsightsError::NotShopify { .. } => Some(shopinsight_core::FailureReason::NotShopify),
            InsightsError::InvalidTarget { .. } | InsightsError::Internal(_) => None,
        }
    }

    /// Normalized store URL the error refers to, when known.
    #[must_use]
    pub fn store_url(&self) -> Option<&str> {
        match self {
            InsightsError::InvalidTarget { url, .. }
            | InsightsError::Unreachable { url, .. }
            | InsightsError::NotShopify { url } => Some(url),
            InsightsError::Internal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_variants_map_to_failure_reasons() {
        let unreachable = InsightsError::Unreachable {
            url: "https://down.example".to_string(),
            failure: FetchFailure::Timeout,
        };
        let not_shopify = InsightsError::NotShopify {
            url: "https://blog.example".to_string(),
        };
        assert_eq!(
            unreachable.failure_reason(),
            Some(shopinsight_core::FailureReason::Unreachable)
        );
        assert_eq!(
            not_shopify.failure_reason(),
            Some(shopinsight_core::FailureReason::NotShopify)
        );
        assert!(InsightsError::Internal("boom".to_string())
            .failure_reason()
            .is_none());
    }

    #[test]
    fn unreachable_message_names_the_failure() {
        let err = InsightsError::Unreachable {
            url: "https://down.example".to_string(),
            failure: FetchFailure::HttpStatus(503),
        };
        assert_eq!(
            err.to_string(),
            "store https://down.example is unreachable: HTTP status 503"
        );
    }
}
