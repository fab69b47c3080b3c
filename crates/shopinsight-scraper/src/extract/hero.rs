//! Featured products on the homepage.

use scraper::{ElementRef, Html};
use shopinsight_core::HeroProduct;

use super::html::{clean_text, first_match, first_text, image_src, selector, visible_text};
use crate::origin::absolutize;

/// Upper bound on hero products reported per store.
pub const MAX_HERO_PRODUCTS: usize = 10;

/// Card selectors tried in order; the first that matches anything wins.
const CARD_SELECTORS: &[&str] = &[
    ".featured-product",
    ".hero-product",
    ".product-hero",
    ".featured-collection .product-item",
    ".collection-hero .product",
    ".homepage-product",
    ".product-card",
    ".grid-product",
    ".card-wrapper",
];

const TITLE_SELECTORS: &[&str] = &[
    ".product-title",
    ".product-name",
    ".card__heading",
    ".product-card__title",
    ".grid-product__title",
    "h3",
    "h2",
    "a",
];

const DESCRIPTION_SELECTORS: &[&str] = &[".product-description", ".product-summary", "p"];

const PRICE_SELECTORS: &[&str] = &[".price-item", ".price", ".product-price", ".money"];

/// Extracts up to [`MAX_HERO_PRODUCTS`] featured products from homepage markup.
///
/// Card selectors are tried in priority order and the first one with any
/// match is used. When none match, bare `/products/` links are used.
#[must_use]
pub fn extract_hero_products(html: &str, base: &str) -> Vec<HeroProduct> {
    let doc = Html::parse_document(html);

    for css in CARD_SELECTORS {
        let Some(sel) = selector(css) else {
            continue;
        };
        let found = collect_unique(doc.select(&sel).filter_map(|card| parse_card(card, base)));
        if !found.is_empty() {
            tracing::debug!(selector = css, count = found.len(), "hero products matched");
            return found;
        }
    }

    let Some(links) = selector(r#"a[href*="/products/"]"#) else {
        return Vec::new();
    };
    collect_unique(doc.select(&links).filter_map(|a| parse_link(a, base)))
}

fn collect_unique(items: impl Iterator<Item = HeroProduct>) -> Vec<HeroProduct> {
    let mut out: Vec<HeroProduct> = Vec::new();
    for item in items {
        let duplicate = out.iter().any(|seen| match (&seen.product_url, &item.product_url) {
            (Some(a), Some(b)) => a == b,
            _ => seen.title == item.title,
        });
        if !duplicate {
            out.push(item);
        }
        if out.len() >= MAX_HERO_PRODUCTS {
            break;
        }
    }
    out
}

fn parse_card(card: ElementRef<'_>, base: &str) -> Option<HeroProduct> {
    let img = first_match(card, &["img"]);
    let title = first_text(card, TITLE_SELECTORS)
        .or_else(|| img.and_then(|i| i.value().attr("alt")).map(clean_text))
        .filter(|t| !t.is_empty())?;

    let link = if card.value().name() == "a" {
        Some(card)
    } else {
        first_match(card, &["a[href]"])
    };

    Some(HeroProduct {
        description: first_text(card, DESCRIPTION_SELECTORS).filter(|d| *d != title),
        price: first_text(card, PRICE_SELECTORS),
        image_url: img.and_then(image_src).and_then(|src| absolutize(base, src)),
        product_url: link
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| absolutize(base, href)),
        title,
    })
}

fn parse_link(anchor: ElementRef<'_>, base: &str) -> Option<HeroProduct> {
    let img = first_match(anchor, &["img"]);
    let title = Some(visible_text(anchor))
        .filter(|t| !t.is_empty())
        .or_else(|| img.and_then(|i| i.value().attr("alt")).map(clean_text))
        .filter(|t| !t.is_empty())?;
    Some(HeroProduct {
        title,
        description: None,
        price: None,
        image_url: img.and_then(image_src).and_then(|src| absolutize(base, src)),
        product_url: anchor
            .value()
            .attr("href")
            .and_then(|href| absolutize(base, href)),
    })
}
