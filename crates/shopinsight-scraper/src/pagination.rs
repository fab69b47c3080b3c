//! Catalog page addressing for `products.json`.
//!
//! Stores that send a `Link` header get cursor pagination:
//!
//! ```text
//! <https://shop.example/products.json?limit=250&page_info=NEXT>; rel="next"
//! ```
//!
//! Stores that do not are walked with the legacy `page=N` parameter until a
//! page comes back empty or short.

use reqwest::Url;

use crate::error::ScraperError;

/// Position of the next catalog page to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// 1-based legacy page number.
    Number(u32),
    /// Opaque `page_info` token from a `Link: rel="next"` header.
    PageInfo(String),
}

impl PageCursor {
    #[must_use]
    pub fn first() -> Self {
        PageCursor::Number(1)
    }
}

/// Builds the `products.json` URL for `origin`, page size, and cursor.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidStoreUrl`] if `origin` is not a valid URL base.
pub fn products_url(origin: &str, limit: u32, cursor: &PageCursor) -> Result<String, ScraperError> {
    let base = format!("{}/products.json", origin.trim_end_matches('/'));
    let mut url = Url::parse(&base).map_err(|e| ScraperError::InvalidStoreUrl {
        url: origin.to_owned(),
        reason: format!("not a valid URL base: {e}"),
    })?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("limit", &limit.to_string());
        match cursor {
            PageCursor::Number(page) => {
                query.append_pair("page", &page.to_string());
            }
            PageCursor::PageInfo(token) => {
                query.append_pair("page_info", token);
            }
        }
    }

    Ok(url.to_string())
}

/// Extracts the `page_info` token of the `rel="next"` entry in a `Link` header.
#[must_use]
pub fn next_page_info(link_header: Option<&str>) -> Option<String> {
    link_header?
        .split(',')
        .map(str::trim)
        .filter(|segment| segment.contains(r#"rel="next""#))
        .find_map(|segment| {
            let start = segment.find('<')? + 1;
            let end = segment.find('>')?;
            let url = Url::parse(segment.get(start..end)?).ok()?;
            url.query_pairs()
                .find(|(key, value)| key == "page_info" && !value.is_empty())
                .map(|(_, value)| value.into_owned())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_uses_page_number() {
        let url = products_url("https://shop.example", 250, &PageCursor::first()).unwrap();
        assert_eq!(url, "https://shop.example/products.json?limit=250&page=1");
    }

    #[test]
    fn cursor_page_uses_page_info() {
        let url = products_url(
            "https://shop.example/",
            50,
            &PageCursor::PageInfo("eyJsYXN0X2lkIjo2fQ".to_owned()),
        )
        .unwrap();
        assert_eq!(
            url,
            "https://shop.example/products.json?limit=50&page_info=eyJsYXN0X2lkIjo2fQ"
        );
    }

    #[test]
    fn products_url_rejects_invalid_origin() {
        let err = products_url("not-a-url", 250, &PageCursor::first()).unwrap_err();
        assert!(matches!(err, ScraperError::InvalidStoreUrl { .. }));
    }

    #[test]
    fn next_page_info_none_without_header() {
        assert!(next_page_info(None).is_none());
        assert!(next_page_info(Some("")).is_none());
    }

    #[test]
    fn next_page_info_picks_next_over_previous() {
        let header = concat!(
            r#"<https://shop.example/products.json?limit=250&page_info=PREV>; rel="previous", "#,
            r#"<https://shop.example/products.json?limit=250&page_info=NEXT>; rel="next""#
        );
        assert_eq!(next_page_info(Some(header)).as_deref(), Some("NEXT"));
    }

    #[test]
    fn next_page_info_none_when_only_previous() {
        let header = r#"<https://shop.example/products.json?limit=250&page_info=PREV>; rel="previous""#;
        assert!(next_page_info(Some(header)).is_none());
    }

    #[test]
    fn next_page_info_none_without_token() {
        let header = r#"<https://shop.example/products.json?limit=250>; rel="next""#;
        assert!(next_page_info(Some(header)).is_none());
    }
}
