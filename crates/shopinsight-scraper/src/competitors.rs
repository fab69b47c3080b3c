//! Lightweight summaries of configured competitor storefronts.

use futures::future::join_all;
use scraper::Html;
use shopinsight_core::CompetitorSummary;

use crate::catalog::{fetch_first_page, MAX_PAGE_LIMIT};
use crate::extract::html::meta_content;
use crate::extract::{extract_social_handles, extract_store_name};
use crate::fetch::Fetcher;
use crate::origin::{extract_domain, normalize_store_url};
use crate::types::RawProduct;

/// Summarizes every competitor in `urls` concurrently.
///
/// `own_origin` is skipped so a store is never its own competitor.
/// Unreachable or invalid competitors are dropped and reported as warnings.
pub async fn summarize_competitors(
    fetcher: &Fetcher,
    urls: &[String],
    own_origin: &str,
) -> (Vec<CompetitorSummary>, Vec<String>) {
    let targets: Vec<Result<String, String>> = urls
        .iter()
        .map(|raw| normalize_store_url(raw).map_err(|e| format!("competitor skipped: {e}")))
        .filter(|target| target.as_ref().map_or(true, |origin| origin != own_origin))
        .collect();

    let lookups = targets.into_iter().map(|target| async move {
        let origin = target?;
        summarize_competitor(fetcher, &origin)
            .await
            .ok_or_else(|| format!("competitor {origin} unreachable"))
    });

    let mut summaries = Vec::new();
    let mut warnings = Vec::new();
    for outcome in join_all(lookups).await {
        match outcome {
            Ok(summary) => summaries.push(summary),
            Err(warning) => {
                tracing::warn!(%warning, "competitor lookup failed");
                warnings.push(warning);
            }
        }
    }
    (summaries, warnings)
}

/// Summary of one competitor, or `None` when its homepage cannot be fetched.
pub async fn summarize_competitor(fetcher: &Fetcher, origin: &str) -> Option<CompetitorSummary> {
    let (home, products) = tokio::join!(
        fetcher.fetch(origin),
        fetch_first_page(fetcher, origin, MAX_PAGE_LIMIT)
    );
    let html = home.body()?;

    let description = {
        let doc = Html::parse_document(html);
        meta_content(&doc, "name", "description")
            .or_else(|| meta_content(&doc, "property", "og:description"))
    };
    let products = products.unwrap_or_default();

    Some(CompetitorSummary {
        name: extract_store_name(html).or_else(|| Some(extract_domain(origin))),
        website_url: origin.to_owned(),
        description,
        estimated_products: products.len(),
        price_range: price_range(&products),
        social_handles: extract_social_handles(html),
    })
}

/// `"min - max"` over every variant price, or `None` without prices.
fn price_range(products: &[RawProduct]) -> Option<String> {
    let prices: Vec<f64> = products
        .iter()
        .flat_map(|p| &p.variants)
        .filter_map(|v| v.price.as_deref()?.parse::<f64>().ok())
        .filter(|p| p.is_finite() && *p >= 0.0)
        .collect();
    let min = prices.iter().copied().reduce(f64::min)?;
    let max = prices.iter().copied().reduce(f64::max)?;
    Some(format!("{min:.2} - {max:.2}"))
}
