//! One crawl cycle wired to the live feed and the snapshot sink.

use std::fmt;
use std::path::PathBuf;

use wsbpulse_core::SymbolUniverse;
use wsbpulse_export::SnapshotSink;
use wsbpulse_sentiment::{
    run_cycle, CycleOptions, RedditClient, RedditSettings, SentimentScorer, ThreadFeed,
};

use crate::leaderboard::print_leaderboard;

/// Everything a cycle needs, shared across scheduler ticks.
pub(crate) struct CrawlContext {
    pub(crate) settings: RedditSettings,
    pub(crate) universe: SymbolUniverse,
    pub(crate) scorer: SentimentScorer,
    pub(crate) options: CycleOptions,
    /// `None` for dry runs.
    pub(crate) sink: Option<Box<dyn SnapshotSink>>,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CycleStatus {
    Exported(PathBuf),
    DryRun,
    FeedFailed,
    ExportFailed,
}

impl CycleStatus {
    pub(crate) fn is_failure(&self) -> bool {
        matches!(self, Self::FeedFailed | Self::ExportFailed)
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exported(path) => write!(f, "exported to {}", path.display()),
            Self::DryRun => f.write_str("dry run, nothing written"),
            Self::FeedFailed => f.write_str("feed unavailable"),
            Self::ExportFailed => f.write_str("snapshot export failed"),
        }
    }
}

/// Connect to Reddit and run one cycle. Failures are logged and reported
/// through the returned status.
pub(crate) async fn crawl_once(ctx: &CrawlContext) -> CycleStatus {
    let client = match RedditClient::connect(ctx.settings.clone()).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "crawl: failed to authenticate with reddit");
            return CycleStatus::FeedFailed;
        }
    };
    crawl_with_feed(ctx, &client).await
}

pub(crate) async fn crawl_with_feed<F>(ctx: &CrawlContext, feed: &F) -> CycleStatus
where
    F: ThreadFeed + Sync,
{
    tracing::info!(subreddit = %ctx.settings.subreddit, "crawl: starting cycle");

    let outcome = match run_cycle(feed, &ctx.universe, &ctx.scorer, &ctx.options).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "crawl: failed to fetch thread listing");
            return CycleStatus::FeedFailed;
        }
    };

    let report = outcome.report;
    tracing::info!(
        threads_seen = report.threads_seen,
        resolved = report.resolved,
        scored = report.scored,
        skipped_no_ticker = report.skipped_no_ticker,
        skipped_neutral = report.skipped_neutral,
        skipped_failed = report.skipped_failed,
        replaced = report.replaced,
        records = report.records,
        "crawl: cycle complete"
    );
    print_leaderboard(&outcome.snapshot);

    let Some(sink) = &ctx.sink else {
        return CycleStatus::DryRun;
    };
    match sink.write(&outcome.snapshot) {
        Ok(path) => CycleStatus::Exported(path),
        Err(e) => {
            tracing::error!(error = %e, "crawl: snapshot export failed");
            CycleStatus::ExportFailed
        }
    }
}
