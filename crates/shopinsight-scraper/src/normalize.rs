//! Conversion from raw `products.json` entries to [`shopinsight_core::Product`].

use shopinsight_core::{Product, ProductVariant};

use crate::extract::html::html_to_text;
use crate::types::{RawProduct, RawVariant};

/// Maps a raw product field by field, filling gaps with empty values.
///
/// `origin` is the store origin used to build the product URL; `currency`
/// is the store-wide currency detected on the homepage, if any.
#[must_use]
pub fn normalize_product(raw: RawProduct, origin: &str, currency: Option<&str>) -> Product {
    let handle = raw.handle.filter(|h| !h.trim().is_empty());
    let url = handle
        .as_ref()
        .map(|h| format!("{}/products/{h}", origin.trim_end_matches('/')));

    let description = raw
        .body_html
        .as_deref()
        .map(html_to_text)
        .filter(|d| !d.is_empty());

    let variants: Vec<ProductVariant> = raw.variants.into_iter().map(normalize_variant).collect();
    let price = variants.first().and_then(|v| v.price.clone());
    let compare_at_price = variants.first().and_then(|v| v.compare_at_price.clone());
    let available = variants.iter().any(|v| v.available);

    Product {
        id: raw.id,
        title: raw.title.trim().to_owned(),
        handle,
        description,
        vendor: raw.vendor.filter(|s| !s.trim().is_empty()),
        product_type: raw.product_type.filter(|s| !s.trim().is_empty()),
        tags: raw.tags,
        price,
        compare_at_price,
        currency: currency.map(str::to_owned),
        available,
        images: raw
            .images
            .into_iter()
            .filter_map(|i| i.src.filter(|src| !src.trim().is_empty()))
            .collect(),
        variants,
        url,
    }
}

fn normalize_variant(raw: RawVariant) -> ProductVariant {
    ProductVariant {
        id: raw.id,
        title: raw.title,
        sku: raw.sku.filter(|s| !s.is_empty()),
        price: raw.price,
        // Some stores send "0.00" instead of null when no sale is active.
        compare_at_price: raw
            .compare_at_price
            .filter(|p| p.parse::<f64>().map_or(true, |v| v > 0.0)),
        available: raw.available,
    }
}
