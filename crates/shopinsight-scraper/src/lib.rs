//! Storefront fetching, field extraction, and insights aggregation.

pub mod aggregator;
pub mod candidates;
pub mod catalog;
pub mod competitors;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod origin;
pub mod pagination;
pub(crate) mod retry;
pub mod strategy;
pub mod text_api;
pub mod types;

pub use aggregator::{AnalysisPhase, InsightsAggregator, InsightsSettings};
pub use candidates::CandidateKind;
pub use catalog::{fetch_catalog, probe_products_json, CatalogFetch};
pub use error::{InsightsError, ScraperError};
pub use fetch::{FetchFailure, FetchOutcome, FetchResult, FetchSettings, Fetcher, Page};
pub use origin::{extract_domain, normalize_store_url};
pub use strategy::{first_success, Found};
pub use text_api::{TextApiClient, TextApiSettings};
