//! Shared HTML helpers for the extractors.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements whose text is never user-visible.
const INVISIBLE: &[&str] = &["script", "style", "noscript", "template", "svg", "iframe"];

/// Page chrome dropped when looking for a page's main content.
const CHROME: &[&str] = &["nav", "header", "footer", "aside", "form", "button"];

/// Elements that break words when their text is concatenated.
const BLOCK: &[&str] = &[
    "p", "div", "li", "ul", "ol", "br", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "th",
    "dd", "dt", "section", "article", "summary", "details", "blockquote",
];

/// Containers that usually hold a page's main text, most specific first.
const CONTENT_SELECTORS: &[&str] = &[
    ".shopify-policy__body",
    ".policy-content",
    ".page-content",
    ".rte",
    ".main-content",
    "#MainContent",
    "main",
    "article",
    ".content",
    ".page",
];

/// Collapses runs of whitespace into single spaces and trims the ends.
#[must_use]
pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to at most `max` characters on a char boundary.
#[must_use]
pub fn truncate_chars(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((idx, _)) => input[..idx].trim_end().to_owned(),
        None => input.to_owned(),
    }
}

/// Plain text of an HTML fragment such as a product's `body_html`.
#[must_use]
pub fn html_to_text(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    visible_text(doc.root_element())
}

/// Visible text of `element`, whitespace-normalized.
#[must_use]
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(element, INVISIBLE, &mut out);
    clean_text(&out)
}

/// Visible text of `element` without navigation, header, or footer chrome.
#[must_use]
pub fn content_text(element: ElementRef<'_>) -> String {
    let skip: Vec<&str> = INVISIBLE.iter().chain(CHROME).copied().collect();
    let mut out = String::new();
    push_text(element, &skip, &mut out);
    clean_text(&out)
}

fn push_text(element: ElementRef<'_>, skip: &[&str], out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if skip.contains(&name) {
                    continue;
                }
                let block = BLOCK.contains(&name);
                if block {
                    out.push(' ');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_text(child_el, skip, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Parses a selector, returning `None` for invalid syntax.
#[must_use]
pub fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// First element under `scope` matching any of `selectors`, in selector order.
#[must_use]
pub fn first_match<'a>(scope: ElementRef<'a>, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| scope.select(&sel).next())
}

/// Visible text of the first non-empty match among `selectors`.
#[must_use]
pub fn first_text(scope: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| {
            scope
                .select(&sel)
                .map(visible_text)
                .find(|text| !text.is_empty())
        })
}

/// `content` of the first `<meta {attr}="{key}">`.
#[must_use]
pub fn meta_content(doc: &Html, attr: &str, key: &str) -> Option<String> {
    let sel = selector(&format!(r#"meta[{attr}="{key}"]"#))?;
    doc.select(&sel)
        .filter_map(|m| m.value().attr("content"))
        .map(clean_text)
        .find(|c| !c.is_empty())
}

/// The largest text block among the known content containers.
///
/// Returns `None` when no container holds at least `min_chars` characters.
#[must_use]
pub fn main_content(doc: &Html, min_chars: usize) -> Option<String> {
    CONTENT_SELECTORS
        .iter()
        .filter_map(|css| selector(css))
        .flat_map(|sel| doc.select(&sel).map(content_text).collect::<Vec<_>>())
        .filter(|text| text.chars().count() >= min_chars)
        .max_by_key(String::len)
}

/// Image URL of an `<img>`, preferring lazy-load attributes over placeholders.
#[must_use]
pub fn image_src(img: ElementRef<'_>) -> Option<&str> {
    let attrs = img.value();
    ["data-src", "src", "data-srcset", "srcset"]
        .iter()
        .filter_map(|name| attrs.attr(name))
        .map(|v| v.split_whitespace().next().unwrap_or(v))
        .find(|v| !v.is_empty() && !v.starts_with("data:"))
}
