use scraper::Html;
use shopinsight_core::{Policy, PolicyKind};

use super::html::{first_text, main_content};

/// Shortest body accepted as a policy; shorter pages are theme stubs.
pub const MIN_POLICY_CHARS: usize = 100;

const TITLE_SELECTORS: &[&str] = &[
    ".shopify-policy__title h1",
    ".shopify-policy__title",
    ".policy-title",
    ".page-title",
    "main h1",
    "h1",
];

/// Extracts one policy from its page, or `None` when the page has no
/// substantive body.
#[must_use]
pub fn extract_policy(html: &str, kind: PolicyKind, url: &str) -> Option<Policy> {
    let doc = Html::parse_document(html);
    let body_text = main_content(&doc, MIN_POLICY_CHARS)?;
    let title = first_text(doc.root_element(), TITLE_SELECTORS)
        .unwrap_or_else(|| kind.default_title().to_owned());

    Some(Policy {
        kind,
        title,
        body_text,
        source_url: url.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "We collect the minimum personal data needed to fulfil your order. \
        We never sell it and you may request deletion at any time by emailing us.";

    #[test]
    fn reads_shopify_policy_layout() {
        let html = format!(
            r#"<html><body><header>Menu</header>
               <div class="shopify-policy__container">
                 <div class="shopify-policy__title"><h1>Privacy policy</h1></div>
                 <div class="shopify-policy__body"><div class="rte"><p>{BODY}</p></div></div>
               </div></body></html>"#
        );
        let policy = extract_policy(
            &html,
            PolicyKind::Privacy,
            "https://shop.example/policies/privacy-policy",
        )
        .unwrap();
        assert_eq!(policy.title, "Privacy policy");
        assert_eq!(policy.body_text, BODY);
        assert_eq!(policy.kind, PolicyKind::Privacy);
        assert_eq!(
            policy.source_url,
            "https://shop.example/policies/privacy-policy"
        );
    }

    #[test]
    fn uses_default_title_when_page_has_none() {
        let html = format!(r#"<main><p>{BODY}</p></main>"#);
        let policy = extract_policy(&html, PolicyKind::Shipping, "https://s.example/x").unwrap();
        assert_eq!(policy.title, "Shipping Policy");
    }

    #[test]
    fn rejects_stub_pages() {
        let html = r#"<main><h1>Refunds</h1><p>Coming soon.</p></main>"#;
        assert!(extract_policy(html, PolicyKind::Returns, "https://s.example/x").is_none());
    }
}
