use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    // A base URL names the store on its own; the hash is only needed to
    // derive the production URL.
    let base_url = lookup("STOREAPI_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let store_hash = match base_url {
        Some(_) => lookup("STOREAPI_STORE_HASH")
            .ok()
            .filter(|v| !v.trim().is_empty()),
        None => Some(require("STOREAPI_STORE_HASH")?),
    };
    let api_token = require("STOREAPI_API_TOKEN")?;

    let env = parse_environment(&or_default("STOREAPI_ENV", "development"))?;
    let debug = parse_bool("STOREAPI_DEBUG", &or_default("STOREAPI_DEBUG", "false"))?;
    let log_level = or_default("STOREAPI_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("STOREAPI_REQUEST_TIMEOUT_SECS", "15")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "STOREAPI_REQUEST_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let max_retries = parse_u32("STOREAPI_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("STOREAPI_RETRY_BACKOFF_BASE_MS", "500")?;

    let page_concurrency = parse_usize("STOREAPI_PAGE_CONCURRENCY", "3")?;
    if page_concurrency == 0 {
        return Err(invalid(
            "STOREAPI_PAGE_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }

    let delete_limit = parse_u32("STOREAPI_DELETE_LIMIT", "3")?;
    if delete_limit == 0 {
        return Err(invalid(
            "STOREAPI_DELETE_LIMIT",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        store_hash,
        api_token,
        base_url,
        debug,
        log_level,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        page_concurrency,
        delete_limit,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREAPI_ENV".to_string(),
            reason: format!("expected development, test or production, got \"{other}\""),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
