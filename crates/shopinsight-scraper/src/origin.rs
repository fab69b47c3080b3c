//! Store URL validation plus origin and link resolution helpers.

use reqwest::Url;

use crate::error::ScraperError;

/// Validates a user-supplied store URL and reduces it to its origin.
///
/// A missing scheme defaults to `https://`. Only `http` and `https` with a
/// host are accepted. `"Shop.Example/collections/all"` becomes
/// `"https://shop.example"`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidStoreUrl`] for empty input, an unparseable
/// URL, a non-HTTP(S) scheme, or a URL without a host.
pub fn normalize_store_url(raw: &str) -> Result<String, ScraperError> {
    let invalid = |reason: &str| ScraperError::InvalidStoreUrl {
        url: raw.to_owned(),
        reason: reason.to_owned(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("URL is empty"));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid("URL contains whitespace"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(&e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(&format!("unsupported scheme \"{other}\""))),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("URL has no host"));
    }

    Ok(url.origin().ascii_serialization())
}

/// Extracts the hostname from a URL, or returns the input when parsing fails.
#[must_use]
pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

/// Resolves `href` against `base` into an absolute HTTP(S) URL.
///
/// Fragment-only, `javascript:`, `mailto:`, and `tel:` links resolve to `None`.
#[must_use]
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|p| lower.starts_with(p))
    {
        return None;
    }
    let base = Url::parse(base).ok()?;
    let joined = base.join(href).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

/// `true` when `url` is on the same host as `origin`.
#[must_use]
pub fn same_host(origin: &str, url: &str) -> bool {
    match (Url::parse(origin), Url::parse(url)) {
        (Ok(a), Ok(b)) => a.host_str() == b.host_str(),
        _ => false,
    }
}
