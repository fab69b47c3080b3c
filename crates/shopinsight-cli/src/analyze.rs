//! `analyze`: run one storefront analysis in-process and print the result.

use std::fmt::Write as _;
use std::time::Instant;

use shopinsight_core::{AppConfig, InsightsRecord, InsightsRequest, PolicyKind};
use shopinsight_scraper::{InsightsAggregator, InsightsSettings};

/// Analyzes `url` and prints a summary, or the full record with `json`.
///
/// Unreachable and non-Shopify stores still print their rejected record and
/// then fail the command.
///
/// # Errors
///
/// Returns an error for an invalid URL, a rejected store, or a failed save.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    url: &str,
    include_competitors: bool,
    json: bool,
    save: bool,
) -> anyhow::Result<()> {
    let aggregator = InsightsAggregator::new(InsightsSettings::from_app_config(config))?;
    let request = InsightsRequest {
        website_url: url.to_owned(),
        include_competitors,
    };

    tracing::info!(url, include_competitors, "analyzing store");
    let started = Instant::now();
    let record = match aggregator.analyze(&request).await {
        Ok(record) => record,
        Err(err) => match err.failure_reason() {
            Some(reason) => {
                tracing::warn!(url, error = %err, "store rejected");
                InsightsRecord::rejected(
                    err.store_url().unwrap_or(url),
                    reason,
                    started.elapsed().as_secs_f64(),
                )
            }
            None => return Err(err.into()),
        },
    };

    if save {
        let pool = shopinsight_db::connect_pool_from_config(config).await?;
        let row = shopinsight_db::NewInsightsRecord::from_record(&record)?;
        let saved = shopinsight_db::insert_insights_record(&pool, &row).await?;
        tracing::info!(record_id = %saved.public_id, store_url = %saved.store_url, "saved insights record");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", render_summary(&record));
    }

    if let Some(reason) = record.failure_reason {
        anyhow::bail!("analysis of {} rejected: {reason}", record.store_url);
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn join_or_dash<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let joined = items.into_iter().collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

/// Plain-text summary of a record, one field per line.
pub(crate) fn render_summary(record: &InsightsRecord) -> String {
    let mut out = String::new();
    let name = record.store_name.as_deref().unwrap_or("(unnamed store)");
    let _ = writeln!(out, "{:<13}{name} ({})", "Store:", record.store_url);

    if let Some(reason) = record.failure_reason {
        let _ = writeln!(out, "{:<13}{reason}", "Rejected:");
        return out;
    }

    let catalog = &record.product_catalog;
    let _ = writeln!(
        out,
        "{:<13}{} (pages: {}, more available: {})",
        "Products:",
        catalog.total_products,
        catalog.pages_fetched,
        yes_no(catalog.has_more)
    );
    let _ = writeln!(out, "{:<13}{}", "Hero:", record.hero_products.len());

    let policies: Vec<String> = PolicyKind::ALL
        .into_iter()
        .filter(|kind| record.policy(*kind).is_some())
        .map(|kind| kind.to_string())
        .collect();
    let _ = writeln!(
        out,
        "{:<13}{}",
        "Policies:",
        join_or_dash(policies.iter().map(String::as_str))
    );
    let _ = writeln!(out, "{:<13}{}", "FAQs:", record.faqs.len());

    let contact = &record.contact_info;
    let _ = writeln!(
        out,
        "{:<13}{}",
        "Emails:",
        join_or_dash(contact.emails.iter().map(String::as_str))
    );
    let _ = writeln!(
        out,
        "{:<13}{}",
        "Phones:",
        join_or_dash(contact.phone_numbers.iter().map(String::as_str))
    );

    let social: Vec<String> = record
        .social_handles
        .iter()
        .map(|(platform, url)| format!("{} {url}", format!("{platform:?}").to_lowercase()))
        .collect();
    let _ = writeln!(
        out,
        "{:<13}{}",
        "Social:",
        join_or_dash(social.iter().map(String::as_str))
    );
    let _ = writeln!(out, "{:<13}{}", "Links:", record.important_links.len());
    if !record.competitors.is_empty() {
        let _ = writeln!(out, "{:<13}{}", "Competitors:", record.competitors.len());
    }
    let _ = writeln!(
        out,
        "{:<13}{:.2}s",
        "Time:",
        record.processing_time_seconds
    );

    if !record.warnings.is_empty() {
        let _ = writeln!(out, "Warnings:");
        for warning in &record.warnings {
            let _ = writeln!(out, "  - {warning}");
        }
    }

    out
}
