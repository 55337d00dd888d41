//! Shared configuration and reference data for wsbpulse.

mod app_config;
mod config;
mod symbols;

use thiserror::Error;

pub use app_config::{AppConfig, RedditCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use symbols::{load_universe, SymbolUniverse};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read listing file {path}: {source}")]
    ListingIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse listing file {path}: {source}")]
    ListingParse {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("listing file {path} has no `{column}` column")]
    ListingMissingColumn { path: String, column: String },

    #[error("symbol universe is empty after loading {0} listing file(s)")]
    EmptyUniverse(usize),
}
