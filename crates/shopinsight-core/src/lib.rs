pub mod app_config;
pub mod config;
pub mod insights;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use insights::{
    BrandContext, CompetitorSummary, ContactInfo, FailureReason, FaqEntry, HeroProduct,
    ImportantLink, InsightsRecord, InsightsRequest, LinkCategory, Policy, PolicyKind, Product,
    ProductCatalog, ProductVariant, SocialHandles, SocialPlatform,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
