//! Fixed, ordered candidate paths per content kind.
//!
//! Storefront themes place the same content under different paths. Each
//! list is tried in order and the first page that fetches and yields content
//! wins. The order is a policy choice, not a claim about where content must
//! live.

use shopinsight_core::PolicyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Policy(PolicyKind),
    Faq,
    Contact,
    About,
}

impl CandidateKind {
    /// Candidate paths for this kind, most likely first.
    #[must_use]
    pub fn paths(self) -> &'static [&'static str] {
        match self {
            CandidateKind::Policy(PolicyKind::Privacy) => &[
                "/policies/privacy-policy",
                "/pages/privacy-policy",
                "/pages/privacy",
                "/privacy-policy",
            ],
            CandidateKind::Policy(PolicyKind::Returns) => &[
                "/policies/refund-policy",
                "/pages/refund-policy",
                "/pages/returns",
                "/pages/return-policy",
                "/refund-policy",
            ],
            CandidateKind::Policy(PolicyKind::Terms) => &[
                "/policies/terms-of-service",
                "/pages/terms-of-service",
                "/pages/terms",
                "/terms-of-service",
            ],
            CandidateKind::Policy(PolicyKind::Shipping) => &[
                "/policies/shipping-policy",
                "/pages/shipping-policy",
                "/pages/shipping",
                "/shipping-policy",
            ],
            CandidateKind::Faq => &[
                "/pages/faq",
                "/pages/faqs",
                "/pages/frequently-asked-questions",
                "/faq",
                "/pages/help",
            ],
            CandidateKind::Contact => &["/pages/contact", "/pages/contact-us", "/contact"],
            CandidateKind::About => &["/pages/about", "/pages/about-us", "/about", "/about-us"],
        }
    }

    /// Absolute candidate URLs under `origin`, in order.
    #[must_use]
    pub fn urls(self, origin: &str) -> Vec<String> {
        let origin = origin.trim_end_matches('/');
        self.paths()
            .iter()
            .map(|path| format!("{origin}{path}"))
            .collect()
    }
}
