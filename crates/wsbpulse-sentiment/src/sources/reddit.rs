//! Reddit feed client (client-credentials OAuth).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use wsbpulse_core::{AppConfig, RedditCredentials};

use crate::error::SentimentError;
use crate::pipeline::ThreadFeed;
use crate::retry::retry_with_backoff;
use crate::types::ThreadObservation;

use super::reddit_helpers::{to_observation, top_level_comments, CommentListing, Listing};

const DEFAULT_AUTH_BASE: &str = "https://www.reddit.com";
const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";
/// Reddit caps listing pages at 100 items.
const MAX_PAGE_LIMIT: usize = 100;
const RATELIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Everything the client needs besides the token.
#[derive(Debug, Clone)]
pub struct RedditSettings {
    pub credentials: RedditCredentials,
    pub subreddit: String,
    pub comment_limit: usize,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub auth_base: String,
    pub api_base: String,
}

impl RedditSettings {
    /// Production endpoints with tunables taken from `config`.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            credentials: config.reddit.clone(),
            subreddit: config.subreddit.clone(),
            comment_limit: config.comment_limit,
            request_timeout_secs: config.request_timeout_secs,
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
            auth_base: DEFAULT_AUTH_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Reddit OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Reddit API client with a valid access token.
///
/// Tokens last about an hour, so callers connect once per crawl cycle.
pub struct RedditClient {
    client: reqwest::Client,
    token: String,
    settings: RedditSettings,
}

impl RedditClient {
    /// Create a client by exchanging client credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError`] if the HTTP client cannot be built or the
    /// token exchange fails after retries.
    pub async fn connect(settings: RedditSettings) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.credentials.user_agent.clone())
            .build()
            .map_err(|e| SentimentError::Reddit(format!("failed to build HTTP client: {e}")))?;

        let token = retry_with_backoff(settings.max_retries, settings.retry_backoff_base_ms, || {
            Self::fetch_token(&client, &settings)
        })
        .await?;

        Ok(Self {
            client,
            token,
            settings,
        })
    }

    async fn fetch_token(
        client: &reqwest::Client,
        settings: &RedditSettings,
    ) -> Result<String, SentimentError> {
        let url = format!(
            "{}/api/v1/access_token",
            settings.auth_base.trim_end_matches('/')
        );
        let response = client
            .post(url)
            .basic_auth(
                &settings.credentials.client_id,
                Some(&settings.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(&response, "token exchange"));
        }

        let token: TokenResponse = decode(response, "token exchange").await?;
        if token.access_token.is_empty() {
            return Err(SentimentError::Reddit(
                "token exchange returned an empty access token".to_string(),
            ));
        }
        Ok(token.access_token)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T, SentimentError> {
        let url = format!("{}{path}", self.settings.api_base.trim_end_matches('/'));
        let url = url.as_str();
        retry_with_backoff(
            self.settings.max_retries,
            self.settings.retry_backoff_base_ms,
            || async move {
                let response = self
                    .client
                    .get(url)
                    .bearer_auth(&self.token)
                    .query(query)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    return Err(status_error(&response, context));
                }
                decode(response, context).await
            },
        )
        .await
    }

    /// Newest submissions in the configured subreddit.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError`] if the listing request fails after retries.
    pub async fn new_threads(&self, limit: usize) -> Result<Vec<ThreadObservation>, SentimentError> {
        let path = format!("/r/{}/new", self.settings.subreddit);
        let listing: Listing = self
            .get_json(
                &path,
                &[
                    ("limit", limit.min(MAX_PAGE_LIMIT).to_string()),
                    ("raw_json", "1".to_string()),
                ],
                "new listing",
            )
            .await?;

        let threads: Vec<ThreadObservation> = listing
            .data
            .children
            .into_iter()
            .filter_map(|post| to_observation(post.data))
            .take(limit)
            .collect();

        tracing::debug!(
            subreddit = %self.settings.subreddit,
            threads = threads.len(),
            "fetched new threads"
        );
        Ok(threads)
    }

    /// Top-level comment bodies of a thread, in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError`] if the comments request fails after retries
    /// or the payload is not the expected `[post, comments]` pair.
    pub async fn comments(&self, thread_id: &str) -> Result<Vec<String>, SentimentError> {
        let path = format!("/comments/{thread_id}");
        let context = format!("comments({thread_id})");
        let mut listings: Vec<CommentListing> = self
            .get_json(
                &path,
                &[
                    ("limit", self.settings.comment_limit.to_string()),
                    ("raw_json", "1".to_string()),
                ],
                &context,
            )
            .await?;

        if listings.len() < 2 {
            return Err(SentimentError::Reddit(format!(
                "{context}: expected 2 listings, got {}",
                listings.len()
            )));
        }

        let comments = top_level_comments(listings.swap_remove(1));
        tracing::debug!(thread = thread_id, comments = comments.len(), "fetched comments");
        Ok(comments)
    }
}

impl ThreadFeed for RedditClient {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<ThreadObservation>, SentimentError> {
        self.new_threads(limit).await
    }

    async fn fetch_reactions(
        &self,
        thread: &ThreadObservation,
    ) -> Result<Vec<String>, SentimentError> {
        self.comments(&thread.id).await
    }
}

/// Map a non-success response, keeping Reddit's rate-limit reset on 429.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn status_error(response: &reqwest::Response, context: &str) -> SentimentError {
    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let reset_secs = response
            .headers()
            .get(RATELIMIT_RESET_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(|secs| secs.ceil() as u64);
        return SentimentError::RateLimited {
            context: context.to_string(),
            reset_secs,
        };
    }
    SentimentError::Status {
        context: context.to_string(),
        status: response.status().as_u16(),
    }
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, SentimentError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| SentimentError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}
