//! Raw shapes of the public `products.json` endpoint.
//!
//! Storefronts vary: prices arrive as strings (`"12.99"`) or numbers,
//! tags as an array or a comma-separated string, and any key may be absent
//! or null. Every field decodes to a default when its value has the wrong
//! shape, so only `products` entries that are not objects get skipped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ScraperError;

#[derive(Debug, Deserialize)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "id_from_any")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub handle: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub body_html: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub vendor: Option<String>,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub product_type: Option<String>,
    #[serde(default, deserialize_with = "tags_from_any")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "vec_from_any")]
    pub images: Vec<RawImage>,
    #[serde(default, deserialize_with = "vec_from_any")]
    pub variants: Vec<RawVariant>,
}

#[derive(Debug, Deserialize)]
pub struct RawVariant {
    #[serde(default, deserialize_with = "id_from_any")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "price_from_any")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "price_from_any")]
    pub compare_at_price: Option<String>,
    /// Absent or null on some older stores; treated as available.
    #[serde(default = "default_available", deserialize_with = "available_from_any")]
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct RawImage {
    #[serde(default, deserialize_with = "opt_string_from_any")]
    pub src: Option<String>,
}

fn default_available() -> bool {
    true
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string_from_any(deserializer)?.unwrap_or_default())
}

fn opt_string_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn id_from_any<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn available_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_bool()
        .unwrap_or_else(default_available))
}

/// Decodes an array element by element, dropping entries that do not fit.
/// Anything other than an array becomes empty.
fn vec_from_any<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn price_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => n.as_f64().map(|f| format!("{f:.2}")),
        _ => None,
    })
}

fn tags_from_any<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        Value::String(s) => s.split(',').map(str::to_owned).collect(),
        _ => Vec::new(),
    };
    Ok(tags
        .into_iter()
        .map(|t: String| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect())
}

/// One decoded catalog page.
#[derive(Debug)]
pub struct RawPage {
    pub products: Vec<RawProduct>,
    /// Entries in the `products` array, including ones that failed to decode.
    pub raw_count: usize,
}

/// Decodes a `products.json` body.
///
/// # Errors
///
/// Returns [`ScraperError::Deserialize`] when the body is not JSON or has no
/// `products` array. Entries that are not JSON objects are skipped.
pub fn parse_products_page(body: &str, context: &str) -> Result<RawPage, ScraperError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ScraperError::Deserialize {
        context: context.to_owned(),
        source: e,
    })?;

    let Some(items) = value.get("products").and_then(Value::as_array) else {
        return Err(ScraperError::Deserialize {
            context: context.to_owned(),
            source: serde::de::Error::custom("missing \"products\" array"),
        });
    };

    let raw_count = items.len();
    let products = items
        .iter()
        .filter(|item| item.is_object())
        .filter_map(|item| match RawProduct::deserialize(item) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::debug!(context, error = %e, "skipping malformed product");
                None
            }
        })
        .collect();

    Ok(RawPage {
        products,
        raw_count,
    })
}

/// `true` when `body` is JSON with a `products` array.
#[must_use]
pub fn looks_like_products_json(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .is_some_and(|v| v.get("products").is_some_and(Value::is_array))
}
