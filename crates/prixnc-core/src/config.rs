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
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real process environment so it can be tested with a
/// plain `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if `DATABASE_URL` is missing or any value fails to parse.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let value = parse_num(var, default)?;
        u32::try_from(value).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("PRIXNC_ENV", "development"))?;

    let bind_addr = {
        let raw = or_default("PRIXNC_BIND_ADDR", "0.0.0.0:3000");
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "PRIXNC_BIND_ADDR".to_string(),
                reason: e.to_string(),
            })?
    };
    let log_level = or_default("PRIXNC_LOG_LEVEL", "info");

    let catalog_base_url = or_default("PRIXNC_CATALOG_BASE_URL", "https://prix.nc/api/v1")
        .trim_end_matches('/')
        .to_string();
    let catalog_timeout_secs = parse_num("PRIXNC_CATALOG_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("PRIXNC_USER_AGENT", "prixnc/0.1 (price-comparison)");

    let default_page_size = parse_u32("PRIXNC_DEFAULT_PAGE_SIZE", "15")?;
    if default_page_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRIXNC_DEFAULT_PAGE_SIZE".to_string(),
            reason: "page size must be at least 1".to_string(),
        });
    }

    let openai_api_key = lookup("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty());
    let llm_base_url = or_default("PRIXNC_LLM_BASE_URL", "https://api.openai.com/v1")
        .trim_end_matches('/')
        .to_string();
    let llm_model = or_default("PRIXNC_LLM_MODEL", "gpt-3.5-turbo");
    let llm_timeout_secs = parse_num("PRIXNC_LLM_TIMEOUT_SECS", "60")?;

    let ocr_command = or_default("PRIXNC_OCR_COMMAND", "tesseract");
    let ocr_language = or_default("PRIXNC_OCR_LANGUAGE", "fra");
    let max_upload_bytes = usize::try_from(parse_num("PRIXNC_MAX_UPLOAD_BYTES", "10485760")?)
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "PRIXNC_MAX_UPLOAD_BYTES".to_string(),
            reason: e.to_string(),
        })?;

    let db_max_connections = parse_u32("PRIXNC_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PRIXNC_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_num("PRIXNC_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        catalog_base_url,
        catalog_timeout_secs,
        user_agent,
        default_page_size,
        openai_api_key,
        llm_base_url,
        llm_model,
        llm_timeout_secs,
        ocr_command,
        ocr_language,
        max_upload_bytes,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRIXNC_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
