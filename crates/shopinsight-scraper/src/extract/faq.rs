//! FAQ extraction.
//!
//! Themes lay FAQs out in one of a few shapes. Every layout strategy runs
//! against the page and the one recovering the most pairs wins.

use scraper::{ElementRef, Html};
use shopinsight_core::FaqEntry;

use super::html::{first_text, selector, visible_text};
use crate::strategy::{most_entries, Strategy};

const ITEM_SELECTORS: &str = ".accordion-item, .faq-item, .collapsible-item, details";

const QUESTION_SELECTORS: &[&str] = &[
    "summary",
    ".accordion-title",
    ".accordion__title",
    ".faq-question",
    ".collapsible-trigger",
    "button",
    "h3",
    "h4",
];

const ANSWER_SELECTORS: &[&str] = &[
    ".accordion-content",
    ".accordion__content",
    ".faq-answer",
    ".collapsible-content",
    ".rte",
];

const HEADINGS: &[&str] = &["h2", "h3", "h4", "h5"];

const STRATEGIES: &[Strategy<Html, FaqEntry>] = &[
    Strategy {
        name: "accordion",
        run: accordion_items,
    },
    Strategy {
        name: "definition_list",
        run: definition_lists,
    },
    Strategy {
        name: "question_headings",
        run: question_headings,
    },
];

/// Question/answer pairs from an FAQ page, or empty when none are found.
#[must_use]
pub fn extract_faqs(html: &str) -> Vec<FaqEntry> {
    let doc = Html::parse_document(html);
    most_entries(STRATEGIES, &doc)
}

fn accordion_items(doc: &Html) -> Vec<FaqEntry> {
    let Some(items) = selector(ITEM_SELECTORS) else {
        return Vec::new();
    };
    let pairs = doc.select(&items).filter_map(|item| {
        let question = first_text(item, QUESTION_SELECTORS)?;
        let answer = first_text(item, ANSWER_SELECTORS).or_else(|| {
            let full = visible_text(item);
            full.strip_prefix(question.as_str())
                .map(|rest| rest.trim().to_owned())
        })?;
        Some((question, answer))
    });
    dedupe(pairs)
}

fn definition_lists(doc: &Html) -> Vec<FaqEntry> {
    let Some(lists) = selector("dl") else {
        return Vec::new();
    };
    let mut pairs = Vec::new();
    for list in doc.select(&lists) {
        let mut question: Option<String> = None;
        for child in list.children().filter_map(ElementRef::wrap) {
            match child.value().name() {
                "dt" => question = Some(visible_text(child)),
                "dd" => {
                    if let Some(q) = question.take() {
                        pairs.push((q, visible_text(child)));
                    }
                }
                _ => {}
            }
        }
    }
    dedupe(pairs.into_iter())
}

fn question_headings(doc: &Html) -> Vec<FaqEntry> {
    let Some(headings) = selector(&HEADINGS.join(", ")) else {
        return Vec::new();
    };
    let pairs = doc.select(&headings).filter_map(|heading| {
        let question = visible_text(heading);
        if !question.contains('?') {
            return None;
        }
        let answer: Vec<String> = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|el| !HEADINGS.contains(&el.value().name()) && el.value().name() != "h1")
            .map(visible_text)
            .filter(|text| !text.is_empty())
            .collect();
        Some((question, answer.join(" ")))
    });
    dedupe(pairs)
}

fn dedupe(pairs: impl Iterator<Item = (String, String)>) -> Vec<FaqEntry> {
    let mut out: Vec<FaqEntry> = Vec::new();
    for (question, answer) in pairs {
        if question.is_empty() || answer.is_empty() {
            continue;
        }
        if out.iter().any(|e| e.question == question) {
            continue;
        }
        out.push(FaqEntry { question, answer });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_details_accordions() {
        let html = r#"
            <details><summary>Do you ship abroad?</summary><p>Yes, to 40 countries.</p></details>
            <details><summary>Can I return sale items?</summary><p>Within 14 days.</p></details>"#;
        let faqs = extract_faqs(html);
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[0].question, "Do you ship abroad?");
        assert_eq!(faqs[0].answer, "Yes, to 40 countries.");
    }

    #[test]
    fn reads_accordion_with_explicit_content() {
        let html = r#"
            <div class="accordion-item">
              <button class="accordion-title">How long is delivery?</button>
              <div class="accordion-content">Three to five business days.</div>
            </div>"#;
        let faqs = extract_faqs(html);
        assert_eq!(
            faqs,
            vec![FaqEntry {
                question: "How long is delivery?".into(),
                answer: "Three to five business days.".into(),
            }]
        );
    }

    #[test]
    fn reads_definition_lists() {
        let html = "<dl><dt>Is it vegan?</dt><dd>Yes.</dd><dt>Is it organic?</dt><dd>Mostly.</dd></dl>";
        let faqs = extract_faqs(html);
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[1].answer, "Mostly.");
    }

    #[test]
    fn reads_question_headings_until_next_heading() {
        let html = r#"
            <h2>Shipping</h2>
            <h3>When will my order ship?</h3><p>Within two days.</p><p>Often sooner.</p>
            <h3>Do you offer gift wrap?</h3><p>Yes, at checkout.</p>"#;
        let faqs = extract_faqs(html);
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[0].answer, "Within two days. Often sooner.");
    }

    #[test]
    fn picks_layout_with_most_pairs() {
        let html = r#"
            <details><summary>Single accordion?</summary><p>Only one.</p></details>
            <dl><dt>First?</dt><dd>A.</dd><dt>Second?</dt><dd>B.</dd></dl>"#;
        let faqs = extract_faqs(html);
        let questions: Vec<&str> = faqs.iter().map(|f| f.question.as_str()).collect();
        assert_eq!(questions, vec!["First?", "Second?"]);
    }

    #[test]
    fn prefers_question_headings_when_they_outnumber_accordions() {
        let html = r#"
            <div class="faq"><details><summary>Gift cards?</summary><p>Yes, in store.</p></details></div>
            <section>
              <h3>Do you ship abroad?</h3><p>To 40 countries.</p>
              <h3>Can I change my order?</h3><p>Within an hour of placing it.</p>
            </section>"#;
        let questions: Vec<String> = extract_faqs(html).into_iter().map(|f| f.question).collect();
        assert_eq!(questions, vec!["Do you ship abroad?", "Can I change my order?"]);
    }

    #[test]
    fn prefers_accordions_when_they_outnumber_question_headings() {
        let html = r#"
            <div class="faq">
              <details><summary>Gift cards?</summary><p>Yes, in store.</p></details>
              <details><summary>Student discount?</summary><p>Ten percent.</p></details>
            </div>
            <section><h3>Do you ship abroad?</h3><p>To 40 countries.</p></section>"#;
        let questions: Vec<String> = extract_faqs(html).into_iter().map(|f| f.question).collect();
        assert_eq!(questions, vec!["Gift cards?", "Student discount?"]);
    }

    #[test]
    fn equal_counts_go_to_the_accordion_layout() {
        let html = r#"
            <div class="faq"><details><summary>Gift cards?</summary><p>Yes, in store.</p></details></div>
            <section><h3>Do you ship abroad?</h3><p>To 40 countries.</p></section>"#;
        let faqs = extract_faqs(html);
        assert_eq!(faqs.len(), 1);
        assert_eq!(faqs[0].question, "Gift cards?");
    }

    #[test]
    fn same_page_yields_identical_entries() {
        let html = r#"
            <details><summary>Do you ship abroad?</summary><p>Yes, to 40 countries.</p></details>
            <details><summary>Can I return sale items?</summary><p>Within 14 days.</p></details>"#;
        assert_eq!(extract_faqs(html), extract_faqs(html));
    }

    #[test]
    fn empty_for_page_without_faqs() {
        assert!(extract_faqs("<main><p>Nothing to see.</p></main>").is_empty());
    }
}
