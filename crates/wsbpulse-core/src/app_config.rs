use std::path::PathBuf;
use std::time::Duration;

/// Reddit client-credentials grant inputs.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub reddit: RedditCredentials,
    pub subreddit: String,
    pub log_level: String,
    pub thread_limit: usize,
    pub comment_limit: usize,
    pub crawl_interval_secs: u64,
    pub thread_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub ticker_files: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

impl AppConfig {
    #[must_use]
    pub fn crawl_interval(&self) -> Duration {
        Duration::from_secs(self.crawl_interval_secs)
    }

    #[must_use]
    pub fn thread_timeout(&self) -> Duration {
        Duration::from_secs(self.thread_timeout_secs)
    }
}
