//! Field extractors.
//!
//! Each extractor takes fetched markup and returns one field of the
//! insights record. None of them perform I/O; the aggregator decides which
//! pages to fetch and feeds them in.

pub mod brand;
pub mod classify;
pub mod contact;
pub mod faq;
pub mod hero;
pub(crate) mod html;
pub mod links;
pub mod policy;
pub mod social;
pub mod store_name;

pub use brand::extract_brand_context;
pub use classify::{detect_currency, has_shopify_markers};
pub use contact::{extract_contact, find_contact_link};
pub use faq::extract_faqs;
pub use hero::extract_hero_products;
pub use html::html_to_text;
pub use links::{categorize, extract_important_links};
pub use policy::extract_policy;
pub use social::extract_social_handles;
pub use store_name::extract_store_name;
