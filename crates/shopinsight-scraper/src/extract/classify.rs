//! Homepage classification: is this a Shopify storefront, and in what currency.

use std::sync::LazyLock;

use regex::Regex;

static ACTIVE_CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Shopify\.currency\s*=\s*\{[^}]*"active"\s*:\s*"([A-Z]{3})""#).expect("valid regex")
});

static META_CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+(?:property|name)=["'](?:og|product):price:currency["'][^>]+content=["']([A-Za-z]{3})["']"#,
    )
    .expect("valid regex")
});

/// Markup fragments every Shopify theme emits somewhere on the homepage.
const SHOPIFY_MARKERS: &[&str] = &[
    "cdn.shopify.com",
    "Shopify.theme",
    "window.Shopify",
    "myshopify.com",
    "shopify-section",
    "shopify-digital-wallet",
];

/// `true` when the homepage carries any Shopify platform marker.
#[must_use]
pub fn has_shopify_markers(html: &str) -> bool {
    SHOPIFY_MARKERS.iter().any(|marker| html.contains(marker))
}

/// ISO 4217 store currency advertised by the homepage, uppercased.
#[must_use]
pub fn detect_currency(html: &str) -> Option<String> {
    ACTIVE_CURRENCY_RE
        .captures(html)
        .or_else(|| META_CURRENCY_RE.captures(html))
        .map(|caps| caps[1].to_ascii_uppercase())
}
