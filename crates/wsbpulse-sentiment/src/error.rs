use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Reddit {context} failed with status {status}")]
    Status { context: String, status: u16 },

    /// HTTP 429. `reset_secs` comes from Reddit's `x-ratelimit-reset` header.
    #[error("Reddit {context} rate limited (reset in {reset_secs:?}s)")]
    RateLimited {
        context: String,
        reset_secs: Option<u64>,
    },

    #[error("Reddit API error: {0}")]
    Reddit(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("polarity model error: {0}")]
    Polarity(String),
}
