//! Product catalog retrieval from the public `products.json` endpoint.

use std::collections::HashSet;

use shopinsight_core::{Product, ProductCatalog};

use crate::fetch::Fetcher;
use crate::normalize::normalize_product;
use crate::pagination::{next_page_info, products_url, PageCursor};
use crate::types::{looks_like_products_json, parse_products_page, RawProduct};

/// Largest page size the endpoint honours.
pub const MAX_PAGE_LIMIT: u32 = 250;

/// Catalog plus any warnings raised while paging through it.
#[derive(Debug, Clone, Default)]
pub struct CatalogFetch {
    pub catalog: ProductCatalog,
    pub warnings: Vec<String>,
}

/// Walks the catalog of `origin` page by page.
///
/// Follows `Link` cursors when the store sends them and falls back to
/// `page=N` otherwise, stopping at an empty or short page. At most
/// `max_pages` pages are requested; hitting that bound with more pages
/// available sets `has_more`.
///
/// A failed first page yields an empty catalog. A failed later page keeps
/// the products already collected. Both cases add a warning.
pub async fn fetch_catalog(
    fetcher: &Fetcher,
    origin: &str,
    limit: u32,
    max_pages: usize,
    currency: Option<&str>,
) -> CatalogFetch {
    let limit = limit.clamp(1, MAX_PAGE_LIMIT);
    let mut out = CatalogFetch::default();
    let mut products: Vec<Product> = Vec::new();
    let mut seen: HashSet<i64> = HashSet::new();
    let mut cursor = PageCursor::first();
    let mut pages_fetched = 0usize;
    let mut has_more = false;

    while pages_fetched < max_pages {
        let url = match products_url(origin, limit, &cursor) {
            Ok(url) => url,
            Err(e) => {
                out.warnings.push(format!("product catalog skipped: {e}"));
                break;
            }
        };

        let result = fetcher.fetch(&url).await;
        let Some(page) = result.page() else {
            let failure = result
                .failure()
                .map_or_else(|| "unknown error".to_owned(), ToString::to_string);
            out.warnings.push(if pages_fetched == 0 {
                format!("product catalog unavailable: {failure}")
            } else {
                format!(
                    "product catalog page {} failed ({failure}); kept {} products",
                    pages_fetched + 1,
                    products.len()
                )
            });
            break;
        };

        let raw = match parse_products_page(&page.body, &url) {
            Ok(raw) => raw,
            Err(e) => {
                out.warnings.push(format!("product catalog page {} unreadable: {e}", pages_fetched + 1));
                break;
            }
        };
        pages_fetched += 1;

        let raw_count = raw.raw_count;
        for product in raw.products {
            if product.id.is_some_and(|id| !seen.insert(id)) {
                continue;
            }
            products.push(normalize_product(product, origin, currency));
        }

        let next = match (&cursor, next_page_info(page.link_header.as_deref())) {
            (_, Some(token)) => Some(PageCursor::PageInfo(token)),
            (PageCursor::PageInfo(_), None) => None,
            (PageCursor::Number(n), None) => {
                (raw_count >= limit as usize).then(|| PageCursor::Number(n + 1))
            }
        };

        let Some(next) = next else {
            break;
        };
        if pages_fetched >= max_pages {
            has_more = true;
            break;
        }
        cursor = next;
    }

    tracing::debug!(
        origin,
        pages = pages_fetched,
        products = products.len(),
        has_more,
        "catalog fetched"
    );
    out.catalog = ProductCatalog::from_products(products, has_more, pages_fetched);
    out
}

/// `true` when `origin` serves a decodable `products.json`.
pub async fn probe_products_json(fetcher: &Fetcher, origin: &str) -> bool {
    let Ok(url) = products_url(origin, 1, &PageCursor::first()) else {
        return false;
    };
    fetcher
        .fetch(&url)
        .await
        .body()
        .is_some_and(looks_like_products_json)
}

/// Raw products of the first catalog page only, or `None` when unavailable.
pub async fn fetch_first_page(fetcher: &Fetcher, origin: &str, limit: u32) -> Option<Vec<RawProduct>> {
    let url = products_url(origin, limit.clamp(1, MAX_PAGE_LIMIT), &PageCursor::first()).ok()?;
    let result = fetcher.fetch(&url).await;
    parse_products_page(result.body()?, &url)
        .ok()
        .map(|page| page.products)
}
