//! Ticker resolution and sentiment aggregation for wsbpulse.
//!
//! Pulls the newest threads from a subreddit, resolves each to a ticker from
//! the symbol universe, scores its comments with VADER plus a small
//! domain keyword boost, and keeps the most extreme thread per ticker.

pub mod aggregator;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod scorer;
pub mod types;

mod retry;
mod sources;

pub use aggregator::{Merge, SnapshotAggregator};
pub use error::SentimentError;
pub use pipeline::{run_cycle, CycleOptions, CycleOutcome, CycleReport, ThreadFeed};
pub use resolver::resolve_ticker;
pub use scorer::{
    Polarity, PolarityModel, ScoreOutcome, SentimentScorer, SentimentVerdict, VaderModel,
    BOOST_INCREMENT, BOOST_KEYWORDS,
};
pub use sources::{RedditClient, RedditSettings};
pub use types::{SecurityRecord, Snapshot, ThreadObservation};
