//! Orchestrates one storefront analysis.
//!
//! The homepage is fetched first and decides whether the store is usable at
//! all. Everything after that fans out concurrently under one shared
//! deadline. A branch that misses the deadline is dropped, which cancels its
//! in-flight request, and its field keeps the empty default. The record is
//! still returned with a warning naming the missing branch.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use shopinsight_core::{
    AppConfig, ContactInfo, FaqEntry, InsightsRecord, InsightsRequest, Policy, PolicyKind,
};
use tokio::time::timeout_at;

use crate::candidates::CandidateKind;
use crate::catalog::{fetch_catalog, probe_products_json, CatalogFetch, MAX_PAGE_LIMIT};
use crate::competitors::summarize_competitors;
use crate::error::{InsightsError, ScraperError};
use crate::extract::{
    detect_currency, extract_brand_context, extract_contact, extract_faqs, extract_hero_products,
    extract_important_links, extract_policy, extract_social_handles, extract_store_name,
    find_contact_link, has_shopify_markers,
};
use crate::fetch::{FetchFailure, FetchOutcome, FetchSettings, Fetcher};
use crate::origin::normalize_store_url;
use crate::strategy::{first_success, Found};
use crate::text_api::{TextApiClient, TextApiSettings};

/// Tunables for [`InsightsAggregator`].
#[derive(Debug, Clone)]
pub struct InsightsSettings {
    pub fetch: FetchSettings,
    /// Budget for one whole analysis, homepage included.
    pub aggregate_timeout: Duration,
    pub catalog_max_pages: usize,
    pub catalog_page_limit: u32,
    pub competitor_urls: Vec<String>,
    pub text_api: Option<TextApiSettings>,
}

impl Default for InsightsSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            aggregate_timeout: Duration::from_secs(45),
            catalog_max_pages: 10,
            catalog_page_limit: MAX_PAGE_LIMIT,
            competitor_urls: Vec::new(),
            text_api: None,
        }
    }
}

impl InsightsSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let request_timeout = Duration::from_secs(config.scraper_request_timeout_secs);
        Self {
            fetch: FetchSettings {
                request_timeout,
                max_retries: config.scraper_max_retries,
                backoff_base_ms: config.scraper_retry_backoff_base_ms,
                user_agent: config.scraper_user_agent.clone(),
            },
            aggregate_timeout: Duration::from_secs(config.scraper_aggregate_timeout_secs),
            catalog_max_pages: config.scraper_catalog_max_pages,
            catalog_page_limit: MAX_PAGE_LIMIT,
            competitor_urls: config.competitor_urls.clone(),
            text_api: config.openai_api_key.as_ref().map(|key| TextApiSettings {
                api_key: key.clone(),
                base_url: config.openai_base_url.clone(),
                model: config.openai_model.clone(),
                timeout: request_timeout.max(Duration::from_secs(20)),
            }),
        }
    }
}

/// Lifecycle of one analysis, emitted in logs at each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    Started,
    HomepageFetched,
    ExtractionInFlight,
    Merged,
    Returned,
    Rejected,
}

impl AnalysisPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisPhase::Started => "started",
            AnalysisPhase::HomepageFetched => "homepage_fetched",
            AnalysisPhase::ExtractionInFlight => "extraction_in_flight",
            AnalysisPhase::Merged => "merged",
            AnalysisPhase::Returned => "returned",
            AnalysisPhase::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn log_phase(store: &str, phase: AnalysisPhase) {
    tracing::info!(store, phase = %phase, "analysis phase");
}

/// Runs `fut` until `deadline`; `None` when the deadline passed first.
async fn within<T>(deadline: tokio::time::Instant, fut: impl Future<Output = T>) -> Option<T> {
    timeout_at(deadline, fut).await.ok()
}

/// Shared, cloneable analysis service. Clones share one connection pool.
#[derive(Debug, Clone)]
pub struct InsightsAggregator {
    fetcher: Fetcher,
    text_api: Option<TextApiClient>,
    settings: Arc<InsightsSettings>,
}

impl InsightsAggregator {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if an HTTP client cannot be constructed.
    pub fn new(settings: InsightsSettings) -> Result<Self, ScraperError> {
        let fetcher = Fetcher::new(&settings.fetch)?;
        let text_api = settings
            .text_api
            .clone()
            .map(TextApiClient::new)
            .transpose()?;
        Ok(Self {
            fetcher,
            text_api,
            settings: Arc::new(settings),
        })
    }

    #[must_use]
    pub fn settings(&self) -> &InsightsSettings {
        &self.settings
    }

    /// Analyzes one storefront.
    ///
    /// # Errors
    ///
    /// - [`InsightsError::InvalidTarget`] when the URL is malformed; nothing is fetched.
    /// - [`InsightsError::Unreachable`] when the homepage cannot be fetched.
    /// - [`InsightsError::NotShopify`] when the homepage carries no Shopify
    ///   markers and `products.json` is not served.
    ///
    /// Failures of individual extractors never produce an error; they leave
    /// their field empty.
    pub async fn analyze(&self, request: &InsightsRequest) -> Result<InsightsRecord, InsightsError> {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.settings.aggregate_timeout;

        let origin = normalize_store_url(&request.website_url).map_err(|e| match e {
            ScraperError::InvalidStoreUrl { url, reason } => InsightsError::InvalidTarget { url, reason },
            other => InsightsError::InvalidTarget {
                url: request.website_url.clone(),
                reason: other.to_string(),
            },
        })?;
        log_phase(&origin, AnalysisPhase::Started);

        let html = match within(deadline, self.fetcher.fetch(&origin)).await {
            Some(result) => match result.outcome {
                FetchOutcome::Fetched(page) => page.body,
                FetchOutcome::Failed(failure) => {
                    return Err(rejected(InsightsError::Unreachable { url: origin, failure }));
                }
            },
            None => {
                return Err(rejected(InsightsError::Unreachable {
                    url: origin,
                    failure: FetchFailure::Timeout,
                }));
            }
        };
        log_phase(&origin, AnalysisPhase::HomepageFetched);

        let is_shopify = has_shopify_markers(&html)
            || within(deadline, probe_products_json(&self.fetcher, &origin))
                .await
                .unwrap_or(false);
        if !is_shopify {
            return Err(rejected(InsightsError::NotShopify { url: origin }));
        }

        let mut record = InsightsRecord::empty(origin.clone());
        let currency = detect_currency(&html);
        record.store_name = extract_store_name(&html);
        record.hero_products = extract_hero_products(&html, &origin);
        record.social_handles = extract_social_handles(&html);
        record.important_links = extract_important_links(&html, &origin);
        let mut contact = extract_contact(&html);
        let contact_link = find_contact_link(&html, &origin);

        log_phase(&origin, AnalysisPhase::ExtractionInFlight);
        let competitor_urls = if request.include_competitors {
            self.settings.competitor_urls.as_slice()
        } else {
            &[]
        };
        let store = origin.as_str();
        let (catalog, policies, faqs, contact_page, about_page, competitors) = tokio::join!(
            within(deadline, self.catalog(store, currency.as_deref())),
            join_all(PolicyKind::ALL.into_iter().map(|kind| async move {
                (kind, within(deadline, self.find_policy(store, kind)).await)
            })),
            within(deadline, self.find_faqs(store)),
            within(deadline, self.find_contact_page(store, contact_link)),
            within(deadline, self.find_about_page(store)),
            within(deadline, summarize_competitors(&self.fetcher, competitor_urls, store)),
        );

        match catalog {
            Some(CatalogFetch { catalog, warnings }) => {
                record.product_catalog = catalog;
                record.warnings.extend(warnings);
            }
            None => record.warnings.push(timed_out("product catalog")),
        }

        for (kind, outcome) in policies {
            match outcome {
                Some(Some(policy)) => record.set_policy(policy),
                Some(None) => {}
                None => record.warnings.push(timed_out(&format!("{kind} policy"))),
            }
        }

        match faqs {
            Some(found) => record.faqs = found.unwrap_or_default(),
            None => record.warnings.push(timed_out("FAQ")),
        }

        match contact_page {
            Some(Some(Found { url, value })) => contact.merge(ContactInfo {
                contact_page_url: Some(url),
                ..value
            }),
            Some(None) => {}
            None => record.warnings.push(timed_out("contact page")),
        }
        record.contact_info = contact;

        let about_html = match about_page {
            Some(found) => found.map(|f| f.value),
            None => {
                record.warnings.push(timed_out("about page"));
                None
            }
        };
        record.brand_context = extract_brand_context(about_html.as_deref(), &html);

        match competitors {
            Some((summaries, warnings)) => {
                record.competitors = summaries;
                record.warnings.extend(warnings);
            }
            None => record.warnings.push(timed_out("competitor lookup")),
        }

        if let (Some(client), Some(about)) = (&self.text_api, record.brand_context.about_text.as_deref()) {
            match within(deadline, client.summarize_brand(record.store_name.as_deref(), about)).await {
                Some(summary) => record.brand_context.summary = summary,
                None => record.warnings.push(timed_out("brand summary")),
            }
        }
        log_phase(&origin, AnalysisPhase::Merged);

        record.processing_time_seconds = started.elapsed().as_secs_f64();
        tracing::info!(
            store = %origin,
            products = record.product_catalog.total_products,
            faqs = record.faqs.len(),
            warnings = record.warnings.len(),
            elapsed_secs = record.processing_time_seconds,
            "analysis complete"
        );
        log_phase(&origin, AnalysisPhase::Returned);
        Ok(record)
    }

    async fn catalog(&self, origin: &str, currency: Option<&str>) -> CatalogFetch {
        fetch_catalog(
            &self.fetcher,
            origin,
            self.settings.catalog_page_limit,
            self.settings.catalog_max_pages,
            currency,
        )
        .await
    }

    async fn find_policy(&self, origin: &str, kind: PolicyKind) -> Option<Policy> {
        let urls = CandidateKind::Policy(kind).urls(origin);
        first_success(&self.fetcher, &urls, |body, url| extract_policy(body, kind, url))
            .await
            .map(|found| found.value)
    }

    async fn find_faqs(&self, origin: &str) -> Option<Vec<FaqEntry>> {
        let urls = CandidateKind::Faq.urls(origin);
        first_success(&self.fetcher, &urls, |body, _| {
            let faqs = extract_faqs(body);
            (!faqs.is_empty()).then_some(faqs)
        })
        .await
        .map(|found| found.value)
    }

    /// The homepage's own contact link goes first, then the fixed candidates.
    async fn find_contact_page(
        &self,
        origin: &str,
        linked: Option<String>,
    ) -> Option<Found<ContactInfo>> {
        let mut urls: Vec<String> = linked.into_iter().collect();
        for url in CandidateKind::Contact.urls(origin) {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        first_success(&self.fetcher, &urls, |body, _| Some(extract_contact(body))).await
    }

    async fn find_about_page(&self, origin: &str) -> Option<Found<String>> {
        let urls = CandidateKind::About.urls(origin);
        first_success(&self.fetcher, &urls, |body, _| Some(body.to_owned())).await
    }
}

fn rejected(err: InsightsError) -> InsightsError {
    if let Some(url) = err.store_url() {
        log_phase(url, AnalysisPhase::Rejected);
    }
    tracing::warn!(error = %err, "analysis rejected");
    err
}

fn timed_out(branch: &str) -> String {
    format!("{branch} lookup did not finish before the analysis deadline")
}
