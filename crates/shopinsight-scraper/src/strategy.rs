//! Ordered-strategy helpers shared by the extractors.
//!
//! Three selection rules appear across the extractors:
//!
//! - [`first_success`]: fetch candidate URLs one at a time and stop at the
//!   first page an extractor accepts (policies, FAQ, contact, about).
//! - [`first_non_empty`]: run sync strategies in order and stop at the first
//!   that yields anything (hero products).
//! - [`most_entries`]: run every sync strategy and keep the one with the most
//!   entries, ties going to the earlier strategy (FAQ layouts).

use crate::fetch::Fetcher;

/// A named synchronous extraction strategy over some input.
pub struct Strategy<I: ?Sized, T> {
    pub name: &'static str,
    pub run: fn(&I) -> Vec<T>,
}

/// Value accepted from one candidate page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found<T> {
    pub url: String,
    pub value: T,
}

/// Fetches `urls` sequentially and returns the first accepted page.
///
/// `extract` receives the page body and its URL and returns `None` to reject
/// the page. Candidates after the winner are never requested.
pub async fn first_success<T, F>(fetcher: &Fetcher, urls: &[String], extract: F) -> Option<Found<T>>
where
    F: Fn(&str, &str) -> Option<T>,
{
    for url in urls {
        let result = fetcher.fetch(url).await;
        let Some(body) = result.body() else {
            continue;
        };
        if let Some(value) = extract(body, url) {
            tracing::debug!(url = %url, "candidate accepted");
            return Some(Found {
                url: url.clone(),
                value,
            });
        }
        tracing::debug!(url = %url, "candidate fetched but yielded nothing");
    }
    None
}

/// Output of the first strategy that yields any entries, or an empty vec.
pub fn first_non_empty<I: ?Sized, T>(strategies: &[Strategy<I, T>], input: &I) -> Vec<T> {
    strategies
        .iter()
        .map(|s| (s.name, (s.run)(input)))
        .find(|(_, entries)| !entries.is_empty())
        .map(|(name, entries)| {
            tracing::trace!(strategy = name, count = entries.len(), "strategy matched");
            entries
        })
        .unwrap_or_default()
}

/// Output of the strategy yielding the most entries; ties keep the earlier one.
pub fn most_entries<I: ?Sized, T>(strategies: &[Strategy<I, T>], input: &I) -> Vec<T> {
    let mut best: Option<(&'static str, Vec<T>)> = None;
    for strategy in strategies {
        let entries = (strategy.run)(input);
        let better = best
            .as_ref()
            .map_or(!entries.is_empty(), |(_, current)| entries.len() > current.len());
        if better {
            best = Some((strategy.name, entries));
        }
    }
    best.map(|(name, entries)| {
        tracing::trace!(strategy = name, count = entries.len(), "strategy selected");
        entries
    })
    .unwrap_or_default()
}
