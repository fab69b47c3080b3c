//! Contact details: emails, phone numbers, postal addresses.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use shopinsight_core::ContactInfo;

use super::html::{clean_text, selector, visible_text};
use crate::origin::{absolutize, same_host};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").expect("valid regex")
});

/// Phone numbers in running text must look formatted: a leading `+`, or a
/// parenthesized or separated area code followed by separated groups. Bare
/// digit runs (barcodes, order numbers) do not match.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \+\d{1,3}[\s.-]?(?:\(\d{1,4}\)[\s.-]?)?\d[\d\s.-]{5,16}\d
        |
        (?:\(\d{2,4}\)\s?|\d{2,4}[\s.-])
        \d{3,4}[\s.-]\d{3,4}
        (?:[\s.-]\d{2,4})?",
    )
    .expect("valid regex")
});

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \b\d{1,5}\s+(?:[A-Z][A-Za-z0-9.]*\s+){1,5}
        (?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Way|Court|Ct|Place|Pl)\b\.?
        (?:,?\s*(?:Suite|Ste|Unit)\.?\s*\#?\w+)?
        (?:,\s*[A-Z][A-Za-z]+(?:\s[A-Z][A-Za-z]+)*,\s*[A-Z]{2}\s*\d{5}(?:-\d{4})?)?",
    )
    .expect("valid regex")
});

/// Asset suffixes that look like emails in retina image names (`logo@2x.png`).
const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".avif"];

pub const MAX_ADDRESSES: usize = 5;

/// Contact details found anywhere in `html`, including `mailto:` and `tel:` links.
///
/// Emails are lowercased. Phone numbers are reduced to an optional `+` and
/// their digits so that differently formatted copies of one number collapse.
#[must_use]
pub fn extract_contact(html: &str) -> ContactInfo {
    let doc = Html::parse_document(html);
    let text = visible_text(doc.root_element());
    let mut info = ContactInfo::default();

    for m in EMAIL_RE.find_iter(&text) {
        push_email(&mut info, m.as_str());
    }
    for m in PHONE_RE.find_iter(&text) {
        if is_standalone(&text, m.start(), m.end()) {
            push_phone(&mut info, m.as_str(), 10);
        }
    }
    for m in ADDRESS_RE.find_iter(&text) {
        let address = clean_text(m.as_str());
        if info.addresses.len() < MAX_ADDRESSES && !info.addresses.contains(&address) {
            info.addresses.push(address);
        }
    }

    if let Some(links) = selector("a[href]") {
        for href in doc.select(&links).filter_map(|a| a.value().attr("href")) {
            let href = href.trim();
            if let Some(addr) = strip_scheme(href, "mailto:") {
                let addr = addr.split('?').next().unwrap_or(addr);
                push_email(&mut info, addr);
            } else if let Some(number) = strip_scheme(href, "tel:") {
                push_phone(&mut info, number, 7);
            }
        }
    }

    info
}

/// Absolute URL of a same-site link that looks like a contact page.
#[must_use]
pub fn find_contact_link(html: &str, base: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let links = selector("a[href]")?;
    doc.select(&links).find_map(|a| {
        let href = a.value().attr("href")?;
        let label = visible_text(a).to_lowercase();
        let looks_like_contact =
            href.to_lowercase().contains("contact") || label.contains("contact");
        if !looks_like_contact {
            return None;
        }
        absolutize(base, href).filter(|url| same_host(base, url))
    })
}

fn strip_scheme<'a>(href: &'a str, scheme: &str) -> Option<&'a str> {
    href.get(..scheme.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
        .map(|_| &href[scheme.len()..])
}

/// `true` when the match is not glued to surrounding letters or digits.
fn is_standalone(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

fn push_email(info: &mut ContactInfo, raw: &str) {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return;
    }
    if ASSET_SUFFIXES.iter().any(|ext| email.ends_with(ext)) {
        return;
    }
    info.emails.insert(email);
}

fn push_phone(info: &mut ContactInfo, raw: &str, min_digits: usize) {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if !(min_digits..=15).contains(&digits.len()) {
        return;
    }
    let normalized = if raw.trim_start().starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    };
    info.phone_numbers.insert(normalized);
}
