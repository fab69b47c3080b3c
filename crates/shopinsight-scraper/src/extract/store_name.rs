use scraper::Html;

use super::html::{first_match, first_text, meta_content, visible_text};

const TITLE_SEPARATORS: &[&str] = &[" – ", " — ", " - ", " | ", " :: "];

const LOGO_IMAGES: &[&str] = &[
    ".site-header__logo img",
    ".header__logo img",
    ".header__heading-logo",
    ".logo img",
];

const TEXT_LOGOS: &[&str] = &["h1.site-title", ".site-title", ".header__heading", ".header-logo"];

/// Best guess at the storefront's display name.
///
/// Tries `og:site_name`, then the `<title>` up to its first separator, then
/// a logo image's alt text, then a text logo.
#[must_use]
pub fn extract_store_name(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);

    if let Some(name) = meta_content(&doc, "property", "og:site_name") {
        return Some(name);
    }

    if let Some(title) = first_match(doc.root_element(), &["title"]).map(visible_text) {
        let head = TITLE_SEPARATORS
            .iter()
            .filter_map(|sep| title.split_once(sep).map(|(head, _)| head))
            .min_by_key(|head| head.len())
            .unwrap_or(title.as_str())
            .trim();
        if !head.is_empty() {
            return Some(head.to_owned());
        }
    }

    if let Some(alt) = first_match(doc.root_element(), LOGO_IMAGES)
        .and_then(|img| img.value().attr("alt"))
        .map(super::html::clean_text)
        .filter(|alt| !alt.is_empty())
    {
        return Some(alt);
    }

    first_text(doc.root_element(), TEXT_LOGOS)
}
