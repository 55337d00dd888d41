use chrono::{DateTime, Utc};

/// One submission pulled from the feed.
///
/// Comments are not carried here; the feed produces them on request for a
/// thread that already resolved to a ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadObservation {
    /// Feed-side identifier (Reddit base36 id without the `t3_` prefix).
    pub id: String,
    pub title: String,
    pub body: String,
    pub num_comments: u64,
    pub score: i64,
    pub upvote_ratio: f64,
    pub created_utc: DateTime<Utc>,
    /// Author name, `[deleted]` when the account no longer exists.
    pub author: String,
}

impl ThreadObservation {
    /// Build the leaderboard row this thread contributes for `ticker`.
    #[must_use]
    pub fn to_record(&self, ticker: &str, avg_comment_sentiment: f64) -> SecurityRecord {
        SecurityRecord {
            ticker: ticker.to_string(),
            avg_comment_sentiment,
            num_comments: self.num_comments,
            score: self.score,
            upvote_ratio: self.upvote_ratio,
            created_date_utc: self.created_utc,
            author: self.author.clone(),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityRecord {
    pub ticker: String,
    /// Mean comment verdict in `[-1.0, 1.0]`. Never exactly `0.0`.
    pub avg_comment_sentiment: f64,
    pub num_comments: u64,
    pub score: i64,
    pub upvote_ratio: f64,
    pub created_date_utc: DateTime<Utc>,
    pub author: String,
}

/// Leaderboard for one crawl cycle, sorted by descending sentiment.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    pub records: Vec<SecurityRecord>,
}

impl Snapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` records, strongest signal first.
    #[must_use]
    pub fn top(&self, n: usize) -> &[SecurityRecord] {
        &self.records[..n.min(self.records.len())]
    }
}
