//! Typed insights records produced for one storefront analysis.
//!
//! Every field has an explicit "not found" value: empty collections, `None`
//! for optional scalars. Records are built once per request and serialized
//! as-is to API clients and to the `insights_records.insights_data` column.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Incoming analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsRequest {
    pub website_url: String,
    #[serde(default)]
    pub include_competitors: bool,
}

/// A single purchasable variant of a [`Product`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: Option<i64>,
    pub title: String,
    pub sku: Option<String>,
    /// Decimal string exactly as the store returns it, e.g. `"12.99"`.
    pub price: Option<String>,
    pub compare_at_price: Option<String>,
    pub available: bool,
}

/// A product from the storefront's public catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<i64>,
    pub title: String,
    pub handle: Option<String>,
    /// Plain text of `body_html`.
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub tags: Vec<String>,
    /// Price of the first variant.
    pub price: Option<String>,
    pub compare_at_price: Option<String>,
    /// ISO 4217 store currency when the storefront advertises one.
    pub currency: Option<String>,
    /// `true` when any variant is available.
    pub available: bool,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
    /// Canonical storefront URL, e.g. `"https://shop.example/products/widget"`.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCatalog {
    pub total_products: usize,
    pub products: Vec<Product>,
    /// `true` when the page bound stopped pagination before the catalog ended.
    pub has_more: bool,
    pub pages_fetched: usize,
}

impl ProductCatalog {
    #[must_use]
    pub fn from_products(products: Vec<Product>, has_more: bool, pages_fetched: usize) -> Self {
        Self {
            total_products: products.len(),
            products,
            has_more,
            pages_fetched,
        }
    }
}

/// A product featured on the homepage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroProduct {
    pub title: String,
    pub description: Option<String>,
    pub price: Option<String>,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Privacy,
    Returns,
    Terms,
    Shipping,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Privacy,
        PolicyKind::Returns,
        PolicyKind::Terms,
        PolicyKind::Shipping,
    ];

    /// Title used when the policy page has no heading of its own.
    #[must_use]
    pub fn default_title(self) -> &'static str {
        match self {
            PolicyKind::Privacy => "Privacy Policy",
            PolicyKind::Returns => "Refund Policy",
            PolicyKind::Terms => "Terms of Service",
            PolicyKind::Shipping => "Shipping Policy",
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyKind::Privacy => write!(f, "privacy"),
            PolicyKind::Returns => write!(f, "returns"),
            PolicyKind::Terms => write!(f, "terms"),
            PolicyKind::Shipping => write!(f, "shipping"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub kind: PolicyKind,
    pub title: String,
    pub body_text: String,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Contact details found on the homepage and contact page.
///
/// Sets are ordered so identical input always serializes identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub emails: BTreeSet<String>,
    pub phone_numbers: BTreeSet<String>,
    pub addresses: Vec<String>,
    pub contact_page_url: Option<String>,
}

impl ContactInfo {
    /// Folds `other` into `self`, keeping first-seen addresses and contact page.
    pub fn merge(&mut self, other: ContactInfo) {
        self.emails.extend(other.emails);
        self.phone_numbers.extend(other.phone_numbers);
        for address in other.addresses {
            if !self.addresses.contains(&address) {
                self.addresses.push(address);
            }
        }
        if self.contact_page_url.is_none() {
            self.contact_page_url = other.contact_page_url;
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phone_numbers.is_empty() && self.addresses.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Instagram,
    Facebook,
    Twitter,
    Tiktok,
    Youtube,
    Linkedin,
    Pinterest,
}

/// Platform to profile URL. One entry per platform.
pub type SocialHandles = BTreeMap<SocialPlatform, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandContext {
    pub about_text: Option<String>,
    pub mission: Option<String>,
    pub story: Option<String>,
    /// Short summary from the optional text API.
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkCategory {
    OrderTracking,
    Contact,
    Blog,
    Support,
    Shipping,
    Returns,
    SizeGuide,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantLink {
    pub title: String,
    pub url: String,
    pub category: LinkCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorSummary {
    pub name: Option<String>,
    pub website_url: String,
    pub description: Option<String>,
    pub estimated_products: usize,
    /// `"min - max"` over first-page variant prices.
    pub price_range: Option<String>,
    pub social_handles: SocialHandles,
}

/// Why an analysis produced no insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Unreachable,
    NotShopify,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Unreachable => write!(f, "store unreachable"),
            FailureReason::NotShopify => write!(f, "not a Shopify store"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsRecord {
    pub store_url: String,
    pub store_name: Option<String>,
    pub is_shopify_store: bool,
    pub product_catalog: ProductCatalog,
    pub hero_products: Vec<HeroProduct>,
    pub privacy_policy: Option<Policy>,
    pub return_refund_policy: Option<Policy>,
    pub terms_of_service: Option<Policy>,
    pub shipping_policy: Option<Policy>,
    pub faqs: Vec<FaqEntry>,
    pub contact_info: ContactInfo,
    pub social_handles: SocialHandles,
    pub brand_context: BrandContext,
    pub important_links: Vec<ImportantLink>,
    pub competitors: Vec<CompetitorSummary>,
    pub scraped_at: DateTime<Utc>,
    pub processing_time_seconds: f64,
    pub success: bool,
    pub failure_reason: Option<FailureReason>,
    pub warnings: Vec<String>,
}

impl InsightsRecord {
    /// A successful record with every extracted field at its empty value.
    #[must_use]
    pub fn empty(store_url: impl Into<String>) -> Self {
        Self {
            store_url: store_url.into(),
            store_name: None,
            is_shopify_store: true,
            product_catalog: ProductCatalog::default(),
            hero_products: Vec::new(),
            privacy_policy: None,
            return_refund_policy: None,
            terms_of_service: None,
            shipping_policy: None,
            faqs: Vec::new(),
            contact_info: ContactInfo::default(),
            social_handles: SocialHandles::new(),
            brand_context: BrandContext::default(),
            important_links: Vec::new(),
            competitors: Vec::new(),
            scraped_at: Utc::now(),
            processing_time_seconds: 0.0,
            success: true,
            failure_reason: None,
            warnings: Vec::new(),
        }
    }

    /// The record returned when a store is unreachable or not a Shopify store.
    ///
    /// Every collection is empty; no partial data is carried.
    #[must_use]
    pub fn rejected(
        store_url: impl Into<String>,
        reason: FailureReason,
        processing_time_seconds: f64,
    ) -> Self {
        Self {
            is_shopify_store: false,
            processing_time_seconds,
            success: false,
            failure_reason: Some(reason),
            ..Self::empty(store_url)
        }
    }

    /// Returns the stored policy for `kind`.
    #[must_use]
    pub fn policy(&self, kind: PolicyKind) -> Option<&Policy> {
        match kind {
            PolicyKind::Privacy => self.privacy_policy.as_ref(),
            PolicyKind::Returns => self.return_refund_policy.as_ref(),
            PolicyKind::Terms => self.terms_of_service.as_ref(),
            PolicyKind::Shipping => self.shipping_policy.as_ref(),
        }
    }

    /// Stores `policy` in the field matching its kind.
    pub fn set_policy(&mut self, policy: Policy) {
        match policy.kind {
            PolicyKind::Privacy => self.privacy_policy = Some(policy),
            PolicyKind::Returns => self.return_refund_policy = Some(policy),
            PolicyKind::Terms => self.terms_of_service = Some(policy),
            PolicyKind::Shipping => self.shipping_policy = Some(policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_include_competitors_to_false() {
        let req: InsightsRequest =
            serde_json::from_str(r#"{"website_url":"https://shop.example"}"#).unwrap();
        assert_eq!(req.website_url, "https://shop.example");
        assert!(!req.include_competitors);
    }

    #[test]
    fn rejected_record_has_only_empty_collections() {
        let record = InsightsRecord::rejected("https://down.example", FailureReason::Unreachable, 1.5);
        assert!(!record.success);
        assert!(!record.is_shopify_store);
        assert_eq!(record.failure_reason, Some(FailureReason::Unreachable));
        assert!(record.product_catalog.products.is_empty());
        assert_eq!(record.product_catalog.total_products, 0);
        assert!(record.hero_products.is_empty());
        assert!(record.faqs.is_empty());
        assert!(record.contact_info.is_empty());
        assert!(record.social_handles.is_empty());
        assert!(record.important_links.is_empty());
        assert!(record.competitors.is_empty());
        assert!(record.privacy_policy.is_none());
    }

    #[test]
    fn serialized_record_has_every_field_present() {
        let record = InsightsRecord::empty("https://shop.example");
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "store_url",
            "store_name",
            "is_shopify_store",
            "product_catalog",
            "hero_products",
            "privacy_policy",
            "return_refund_policy",
            "terms_of_service",
            "shipping_policy",
            "faqs",
            "contact_info",
            "social_handles",
            "brand_context",
            "important_links",
            "competitors",
            "scraped_at",
            "processing_time_seconds",
            "success",
            "failure_reason",
            "warnings",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(json["faqs"], serde_json::json!([]));
        assert_eq!(json["contact_info"]["emails"], serde_json::json!([]));
        assert_eq!(json["social_handles"], serde_json::json!({}));
    }

    #[test]
    fn social_handles_serialize_with_lowercase_platform_keys() {
        let mut handles = SocialHandles::new();
        handles.insert(
            SocialPlatform::Instagram,
            "https://instagram.com/shop".to_string(),
        );
        handles.insert(SocialPlatform::Tiktok, "https://tiktok.com/@shop".to_string());
        let json = serde_json::to_string(&handles).unwrap();
        assert_eq!(
            json,
            r#"{"instagram":"https://instagram.com/shop","tiktok":"https://tiktok.com/@shop"}"#
        );
    }

    #[test]
    fn set_policy_routes_by_kind() {
        let mut record = InsightsRecord::empty("https://shop.example");
        record.set_policy(Policy {
            kind: PolicyKind::Returns,
            title: "Refund Policy".to_string(),
            body_text: "30 days".to_string(),
            source_url: "https://shop.example/policies/refund-policy".to_string(),
        });
        assert!(record.return_refund_policy.is_some());
        assert!(record.privacy_policy.is_none());
        assert_eq!(
            record.policy(PolicyKind::Returns).map(|p| p.body_text.as_str()),
            Some("30 days")
        );
    }

    #[test]
    fn contact_merge_deduplicates() {
        let mut a = ContactInfo::default();
        a.emails.insert("hello@shop.example".to_string());
        a.addresses.push("1 Main Street, Springfield 12345".to_string());
        let mut b = ContactInfo::default();
        b.emails.insert("hello@shop.example".to_string());
        b.phone_numbers.insert("+1 555 123 4567".to_string());
        b.addresses.push("1 Main Street, Springfield 12345".to_string());
        b.contact_page_url = Some("https://shop.example/pages/contact".to_string());
        a.merge(b);
        assert_eq!(a.emails.len(), 1);
        assert_eq!(a.phone_numbers.len(), 1);
        assert_eq!(a.addresses.len(), 1);
        assert!(a.contact_page_url.is_some());
    }
}
