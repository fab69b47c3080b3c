use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional. Decoupled from the process environment so it
/// can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("SHOPINSIGHT_ENV", "development"))?;

    let bind_addr = parse_addr("SHOPINSIGHT_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("SHOPINSIGHT_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("SHOPINSIGHT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SHOPINSIGHT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SHOPINSIGHT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("SHOPINSIGHT_REQUEST_TIMEOUT_SECS", "10")?;
    if scraper_request_timeout_secs == 0 {
        return Err(invalid(
            "SHOPINSIGHT_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let scraper_user_agent = or_default(
        "SHOPINSIGHT_USER_AGENT",
        "Mozilla/5.0 (compatible; shopinsight/0.1; +storefront-insights)",
    );
    let scraper_max_retries = parse_u32("SHOPINSIGHT_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_ms = parse_u64("SHOPINSIGHT_RETRY_BACKOFF_BASE_MS", "250")?;
    let scraper_aggregate_timeout_secs = parse_u64("SHOPINSIGHT_AGGREGATE_TIMEOUT_SECS", "45")?;
    let scraper_catalog_max_pages = parse_usize("SHOPINSIGHT_CATALOG_MAX_PAGES", "10")?;

    let cache_ttl_secs = parse_u64("SHOPINSIGHT_CACHE_TTL_SECS", "86400")?;
    let competitor_urls = parse_url_list(&or_default("SHOPINSIGHT_COMPETITOR_URLS", ""));

    let openai_api_key = optional("SHOPINSIGHT_OPENAI_API_KEY");
    let openai_base_url = or_default("SHOPINSIGHT_OPENAI_BASE_URL", "https://api.openai.com")
        .trim_end_matches('/')
        .to_string();
    let openai_model = or_default("SHOPINSIGHT_OPENAI_MODEL", "gpt-4o-mini");

    let rate_limit_per_minute = parse_usize("SHOPINSIGHT_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
        scraper_aggregate_timeout_secs,
        scraper_catalog_max_pages,
        cache_ttl_secs,
        competitor_urls,
        openai_api_key,
        openai_base_url,
        openai_model,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPINSIGHT_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

/// Splits a comma-separated list, dropping blanks.
fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
