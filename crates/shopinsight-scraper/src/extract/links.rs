use scraper::Html;
use shopinsight_core::{ImportantLink, LinkCategory};

use super::html::{selector, visible_text};
use crate::origin::absolutize;

const NAV_ANCHORS: &str = "nav a[href], header a[href], footer a[href], .menu a[href], \
    .site-nav a[href], .footer a[href], [role=\"navigation\"] a[href]";

/// Keyword table checked in order; the first category with a hit wins.
const CATEGORY_KEYWORDS: &[(LinkCategory, &[&str])] = &[
    (
        LinkCategory::OrderTracking,
        &["track", "order status", "where is my order"],
    ),
    (LinkCategory::Contact, &["contact"]),
    (LinkCategory::Blog, &["blog", "journal", "news"]),
    (LinkCategory::Support, &["support", "help", "faq"]),
    (LinkCategory::Shipping, &["shipping", "delivery"]),
    (LinkCategory::Returns, &["return", "refund", "exchange"]),
    (LinkCategory::SizeGuide, &["size guide", "size chart", "sizing", "size-guide", "size-chart"]),
];

/// Categorizes a link by its label and href, or `None` when it is not notable.
#[must_use]
pub fn categorize(label: &str, href: &str) -> Option<LinkCategory> {
    let haystack = format!("{} {}", label.to_lowercase(), href.to_lowercase());
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(category, _)| *category)
}

/// Navigation and footer links that point at notable store pages.
#[must_use]
pub fn extract_important_links(html: &str, base: &str) -> Vec<ImportantLink> {
    let doc = Html::parse_document(html);
    let Some(anchors) = selector(NAV_ANCHORS) else {
        return Vec::new();
    };

    let mut links: Vec<ImportantLink> = Vec::new();
    for anchor in doc.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = absolutize(base, href) else {
            continue;
        };
        if links.iter().any(|l| l.url == url) {
            continue;
        }
        let title = visible_text(anchor);
        let Some(category) = categorize(&title, href) else {
            continue;
        };
        links.push(ImportantLink {
            title: if title.is_empty() { url.clone() } else { title },
            url,
            category,
        });
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizes_in_priority_order() {
        assert_eq!(
            categorize("Track your order", "/apps/track"),
            Some(LinkCategory::OrderTracking)
        );
        assert_eq!(
            categorize("Help & Contact", "/pages/contact"),
            Some(LinkCategory::Contact)
        );
        assert_eq!(categorize("Journal", "/blogs/news"), Some(LinkCategory::Blog));
        assert_eq!(
            categorize("Size Guide", "/pages/size-guide"),
            Some(LinkCategory::SizeGuide)
        );
        assert_eq!(categorize("Shop All", "/collections/all"), None);
    }

    #[test]
    fn collects_nav_and_footer_links_once() {
        let html = r#"
            <header><nav>
              <a href="/collections/all">Shop</a>
              <a href="/blogs/journal">Journal</a>
            </nav></header>
            <main><a href="/pages/shipping">Shipping (body link)</a></main>
            <footer>
              <a href="/pages/shipping">Shipping</a>
              <a href="/policies/refund-policy">Refunds</a>
              <a href="/blogs/journal">Journal</a>
            </footer>"#;
        let links = extract_important_links(html, "https://shop.example");
        let got: Vec<(&str, LinkCategory)> = links
            .iter()
            .map(|l| (l.url.as_str(), l.category))
            .collect();
        assert_eq!(
            got,
            vec![
                ("https://shop.example/blogs/journal", LinkCategory::Blog),
                ("https://shop.example/pages/shipping", LinkCategory::Shipping),
                (
                    "https://shop.example/policies/refund-policy",
                    LinkCategory::Returns
                ),
            ]
        );
    }
}
