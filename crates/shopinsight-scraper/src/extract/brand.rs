//! Brand narrative: about text, mission statement, founding story.

use scraper::{ElementRef, Html};
use shopinsight_core::BrandContext;

use super::html::{main_content, selector, truncate_chars, visible_text};

pub const MIN_ABOUT_CHARS: usize = 100;
pub const MAX_ABOUT_CHARS: usize = 2000;
const MAX_STATEMENT_CHARS: usize = 500;

const ABOUT_SECTION_SELECTORS: &str =
    ".about, .about-us, .brand-story, .our-story, #about, [class*=\"about\"], [class*=\"story\"]";

/// Tried only when no about-like section has enough text.
const INTRO_SECTION_SELECTORS: &str = ".intro, .hero, .banner";

const MISSION_CUES: &[&str] = &["our mission", "mission is", "we believe", "our purpose", "we exist to"];
const STORY_CUES: &[&str] = &["founded", "started", "began", "our story", "was born"];

/// Assembles brand context from the about page, falling back to homepage
/// sections when no about page was found.
#[must_use]
pub fn extract_brand_context(about_html: Option<&str>, homepage_html: &str) -> BrandContext {
    let about_doc = about_html.map(Html::parse_document);
    let home_doc = Html::parse_document(homepage_html);

    let about_text = about_doc
        .as_ref()
        .and_then(|doc| main_content(doc, MIN_ABOUT_CHARS))
        .or_else(|| homepage_about(&home_doc))
        .map(|text| truncate_chars(&text, MAX_ABOUT_CHARS));

    let docs: Vec<&Html> = about_doc.iter().chain(std::iter::once(&home_doc)).collect();

    let mission = docs
        .iter()
        .find_map(|doc| section_after_heading(doc, &["mission", "purpose", "what we believe"]))
        .or_else(|| about_text.as_deref().and_then(|t| sentence_with(t, MISSION_CUES)));

    let story = docs
        .iter()
        .find_map(|doc| section_after_heading(doc, &["our story", "story", "history"]))
        .or_else(|| about_text.as_deref().and_then(|t| sentence_with(t, STORY_CUES)));

    BrandContext {
        about_text,
        mission,
        story,
        summary: None,
    }
}

fn homepage_about(doc: &Html) -> Option<String> {
    longest_section(doc, ABOUT_SECTION_SELECTORS)
        .or_else(|| longest_section(doc, INTRO_SECTION_SELECTORS))
}

fn longest_section(doc: &Html, css: &str) -> Option<String> {
    let sections = selector(css)?;
    doc.select(&sections)
        .map(visible_text)
        .filter(|text| text.chars().count() >= MIN_ABOUT_CHARS)
        .max_by_key(String::len)
}

/// Text following the first heading whose label contains one of `labels`.
fn section_after_heading(doc: &Html, labels: &[&str]) -> Option<String> {
    let headings = selector("h1, h2, h3, h4")?;
    doc.select(&headings).find_map(|heading| {
        let label = visible_text(heading).to_lowercase();
        if !labels.iter().any(|l| label.contains(l)) {
            return None;
        }
        let text: Vec<String> = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|el| !matches!(el.value().name(), "h1" | "h2" | "h3" | "h4"))
            .map(visible_text)
            .filter(|t| !t.is_empty())
            .collect();
        let joined = text.join(" ");
        (!joined.is_empty()).then(|| truncate_chars(&joined, MAX_STATEMENT_CHARS))
    })
}

/// First sentence of `text` containing any of `cues`, case-insensitively.
fn sentence_with(text: &str, cues: &[&str]) -> Option<String> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .find(|sentence| {
            let lower = sentence.to_lowercase();
            cues.iter().any(|cue| lower.contains(cue))
        })
        .map(|sentence| truncate_chars(sentence, MAX_STATEMENT_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABOUT: &str = "Acme Goods was founded in 2014 in a small Portland garage. \
        Our mission is to make durable kitchenware that lasts a lifetime. \
        Every piece is made by hand in our own workshop.";

    #[test]
    fn about_page_supplies_text_mission_and_story() {
        let about = format!("<main><p>{ABOUT}</p></main>");
        let ctx = extract_brand_context(Some(about.as_str()), "<p>Home</p>");
        assert!(ctx.about_text.as_deref().unwrap().contains("founded in 2014"));
        assert_eq!(
            ctx.mission.as_deref(),
            Some("Our mission is to make durable kitchenware that lasts a lifetime.")
        );
        assert_eq!(
            ctx.story.as_deref(),
            Some("Acme Goods was founded in 2014 in a small Portland garage.")
        );
        assert!(ctx.summary.is_none());
    }

    #[test]
    fn mission_heading_beats_sentence_search() {
        let home = r#"<section><h2>Our Mission</h2><p>Better pans for everyone.</p><h2>Shop</h2></section>"#;
        let ctx = extract_brand_context(None, home);
        assert_eq!(ctx.mission.as_deref(), Some("Better pans for everyone."));
    }

    #[test]
    fn falls_back_to_homepage_about_section() {
        let home = format!(r#"<div class="about-section"><p>{ABOUT}</p></div>"#);
        let ctx = extract_brand_context(None, &home);
        assert_eq!(ctx.about_text.as_deref(), Some(ABOUT));
    }

    #[test]
    fn falls_back_to_hero_banner_text() {
        let home = format!(r#"<div class="hero"><h1>Welcome</h1><p>{ABOUT}</p></div>"#);
        let ctx = extract_brand_context(None, &home);
        assert!(ctx.about_text.as_deref().unwrap().contains("founded in 2014"));
    }

    #[test]
    fn about_section_wins_over_longer_banner() {
        let banner = "Free shipping on every order over fifty dollars this week only. ".repeat(4);
        let home = format!(
            r#"<div class="banner"><p>{banner}</p></div><div class="about-us"><p>{ABOUT}</p></div>"#
        );
        let ctx = extract_brand_context(None, &home);
        assert_eq!(ctx.about_text.as_deref(), Some(ABOUT));
    }

    #[test]
    fn empty_context_for_plain_homepage() {
        let ctx = extract_brand_context(None, "<p>Shop now</p>");
        assert_eq!(ctx, BrandContext::default());
    }

    #[test]
    fn about_text_is_truncated() {
        let long = "word ".repeat(1000);
        let about = format!("<main><p>{long}</p></main>");
        let ctx = extract_brand_context(Some(about.as_str()), "");
        assert!(ctx.about_text.unwrap().chars().count() <= MAX_ABOUT_CHARS);
    }
}
