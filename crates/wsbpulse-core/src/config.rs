use std::path::PathBuf;

use crate::app_config::{AppConfig, RedditCredentials};
use crate::ConfigError;

const DEFAULT_TICKER_FILES: &str = "tickers/nasdaq.csv,tickers/nyse.csv,tickers/amex.csv";

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
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let non_zero = |var: &str, value: u64| -> Result<u64, ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let reddit = RedditCredentials {
        client_id: require("REDDIT_CLIENT_ID")?,
        client_secret: require("REDDIT_CLIENT_SECRET")?,
        user_agent: require("REDDIT_USER_AGENT")?,
    };

    let subreddit = or_default("WSBPULSE_SUBREDDIT", "wallstreetbets")
        .trim()
        .trim_start_matches("r/")
        .to_string();
    if subreddit.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "WSBPULSE_SUBREDDIT".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let log_level = or_default("WSBPULSE_LOG_LEVEL", "info");
    let thread_limit = parse_usize("WSBPULSE_THREAD_LIMIT", "100")?;
    if thread_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WSBPULSE_THREAD_LIMIT".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let comment_limit = parse_usize("WSBPULSE_COMMENT_LIMIT", "500")?;
    let crawl_interval_secs = non_zero(
        "WSBPULSE_CRAWL_INTERVAL_SECS",
        parse_u64("WSBPULSE_CRAWL_INTERVAL_SECS", "3600")?,
    )?;
    let thread_timeout_secs = non_zero(
        "WSBPULSE_THREAD_TIMEOUT_SECS",
        parse_u64("WSBPULSE_THREAD_TIMEOUT_SECS", "30")?,
    )?;
    let request_timeout_secs = non_zero(
        "WSBPULSE_REQUEST_TIMEOUT_SECS",
        parse_u64("WSBPULSE_REQUEST_TIMEOUT_SECS", "30")?,
    )?;
    let max_retries = parse_u32("WSBPULSE_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("WSBPULSE_RETRY_BACKOFF_BASE_MS", "1000")?;

    let ticker_files = parse_path_list(&or_default("WSBPULSE_TICKER_FILES", DEFAULT_TICKER_FILES));
    if ticker_files.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "WSBPULSE_TICKER_FILES".to_string(),
            reason: "at least one listing file is required".to_string(),
        });
    }
    let output_dir = PathBuf::from(or_default("WSBPULSE_OUTPUT_DIR", "."));

    Ok(AppConfig {
        reddit,
        subreddit,
        log_level,
        thread_limit,
        comment_limit,
        crawl_interval_secs,
        thread_timeout_secs,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        ticker_files,
        output_dir,
    })
}

/// Split a comma-separated list of paths, dropping blank entries.
fn parse_path_list(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
