//! One crawl cycle: fetch, resolve, score, aggregate.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use wsbpulse_core::SymbolUniverse;

use crate::aggregator::{Merge, SnapshotAggregator};
use crate::error::SentimentError;
use crate::resolver::resolve_ticker;
use crate::scorer::{ScoreOutcome, SentimentScorer};
use crate::types::{Snapshot, ThreadObservation};

/// Source of threads and their comments.
pub trait ThreadFeed {
    /// Newest threads, at most `limit`.
    fn fetch_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ThreadObservation>, SentimentError>> + Send;

    /// Comment bodies for one thread.
    fn fetch_reactions(
        &self,
        thread: &ThreadObservation,
    ) -> impl Future<Output = Result<Vec<String>, SentimentError>> + Send;
}

#[derive(Debug, Clone, Copy)]
pub struct CycleOptions {
    pub thread_limit: usize,
    /// Budget for fetching and scoring one thread's comments.
    pub thread_timeout: Duration,
}

/// Counters for one cycle, logged when it ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub threads_seen: usize,
    pub resolved: usize,
    pub scored: usize,
    pub skipped_no_ticker: usize,
    pub skipped_neutral: usize,
    pub skipped_failed: usize,
    pub replaced: usize,
    pub records: usize,
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub snapshot: Snapshot,
    pub report: CycleReport,
}

enum ThreadResult {
    Scored(f64),
    Neutral,
    Failed,
}

/// Run one crawl pass against `feed`.
///
/// Threads are handled one at a time. A thread is dropped when it resolves to
/// no ticker, when its comments cannot be fetched or scored within
/// `options.thread_timeout`, or when its mean verdict is exactly `0.0`.
///
/// # Errors
///
/// Returns the feed's error only when the thread listing itself cannot be
/// fetched. Per-thread failures are logged and counted in the report.
pub async fn run_cycle<F>(
    feed: &F,
    universe: &SymbolUniverse,
    scorer: &SentimentScorer,
    options: &CycleOptions,
) -> Result<CycleOutcome, SentimentError>
where
    F: ThreadFeed + Sync,
{
    let threads = feed.fetch_recent(options.thread_limit).await?;
    let mut report = CycleReport {
        threads_seen: threads.len(),
        ..CycleReport::default()
    };
    let mut aggregator = SnapshotAggregator::new();

    for thread in &threads {
        let Some(ticker) = resolve_ticker(universe, &thread.title, &thread.body) else {
            report.skipped_no_ticker += 1;
            continue;
        };
        report.resolved += 1;

        let sentiment = match score_thread(feed, scorer, thread, options.thread_timeout).await {
            ThreadResult::Scored(value) => value,
            ThreadResult::Neutral => {
                report.skipped_neutral += 1;
                continue;
            }
            ThreadResult::Failed => {
                report.skipped_failed += 1;
                continue;
            }
        };
        report.scored += 1;

        tracing::debug!(
            thread = %thread.id,
            ticker = %ticker,
            sentiment,
            "thread scored"
        );
        if aggregator.offer(thread.to_record(&ticker, sentiment)) == Merge::Replaced {
            report.replaced += 1;
        }
    }

    report.records = aggregator.len();
    Ok(CycleOutcome {
        snapshot: aggregator.finish(Utc::now()),
        report,
    })
}

async fn score_thread<F>(
    feed: &F,
    scorer: &SentimentScorer,
    thread: &ThreadObservation,
    budget: Duration,
) -> ThreadResult
where
    F: ThreadFeed + Sync,
{
    let work = async {
        let reactions = feed.fetch_reactions(thread).await?;
        scorer.score(reactions.as_slice())
    };

    match tokio::time::timeout(budget, work).await {
        Ok(Ok(ScoreOutcome::Scored(value))) if value != 0.0 => ThreadResult::Scored(value),
        Ok(Ok(ScoreOutcome::Scored(_))) => ThreadResult::Neutral,
        Ok(Ok(ScoreOutcome::NoReactions)) => {
            tracing::debug!(thread = %thread.id, "thread has no comments; skipping");
            ThreadResult::Neutral
        }
        Ok(Err(e)) => {
            tracing::warn!(thread = %thread.id, error = %e, "thread scoring failed; skipping");
            ThreadResult::Failed
        }
        Err(_) => {
            tracing::warn!(
                thread = %thread.id,
                timeout_secs = budget.as_secs_f64(),
                "thread scoring timed out; skipping"
            );
            ThreadResult::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeZone;

    use super::*;
    use crate::scorer::tests::FixedModel;

    enum Reactions {
        Ready(Vec<String>),
        Fail,
        Hang,
    }

    #[derive(Default)]
    struct FakeFeed {
        threads: Vec<ThreadObservation>,
        reactions: HashMap<String, Reactions>,
        listing_fails: bool,
        reaction_calls: AtomicUsize,
    }

    impl FakeFeed {
        fn thread(mut self, id: &str, title: &str, body: &str, reactions: Reactions) -> Self {
            self.threads.push(ThreadObservation {
                id: id.to_string(),
                title: title.to_string(),
                body: body.to_string(),
                num_comments: 3,
                score: 100,
                upvote_ratio: 0.95,
                created_utc: Utc.with_ymd_and_hms(2021, 1, 27, 14, 0, 0).unwrap(),
                author: format!("author_{id}"),
            });
            self.reactions.insert(id.to_string(), reactions);
            self
        }
    }

    impl ThreadFeed for FakeFeed {
        async fn fetch_recent(&self, limit: usize) -> Result<Vec<ThreadObservation>, SentimentError> {
            if self.listing_fails {
                return Err(SentimentError::Status {
                    context: "listing".to_string(),
                    status: 503,
                });
            }
            Ok(self.threads.iter().take(limit).cloned().collect())
        }

        async fn fetch_reactions(
            &self,
            thread: &ThreadObservation,
        ) -> Result<Vec<String>, SentimentError> {
            self.reaction_calls.fetch_add(1, Ordering::SeqCst);
            match self.reactions.get(&thread.id) {
                Some(Reactions::Ready(r)) => Ok(r.clone()),
                Some(Reactions::Fail) | None => {
                    Err(SentimentError::Reddit("comments unavailable".to_string()))
                }
                Some(Reactions::Hang) => std::future::pending().await,
            }
        }
    }

    fn ready(texts: &[&str]) -> Reactions {
        Reactions::Ready(texts.iter().map(|t| (*t).to_string()).collect())
    }

    fn options() -> CycleOptions {
        CycleOptions {
            thread_limit: 100,
            thread_timeout: Duration::from_millis(200),
        }
    }

    fn universe() -> SymbolUniverse {
        SymbolUniverse::from_symbols(["GME", "AMC"])
    }

    #[tokio::test]
    async fn gme_thread_reaches_the_snapshot_with_boosted_sentiment() {
        let feed = FakeFeed::default().thread(
            "t1",
            "GME to the moon",
            "",
            ready(&["yolo calls on GME, this is going to the moon", "meh"]),
        );
        let boosted = SentimentScorer::new(FixedModel::default());
        let unboosted =
            SentimentScorer::with_keywords(FixedModel::default(), Vec::<String>::new(), 0.1);

        let outcome = run_cycle(&feed, &universe(), &boosted, &options())
            .await
            .unwrap();
        let baseline = unboosted
            .score(&["yolo calls on GME, this is going to the moon", "meh"])
            .unwrap()
            .value();

        assert_eq!(outcome.snapshot.len(), 1);
        let record = &outcome.snapshot.records[0];
        assert_eq!(record.ticker, "GME");
        assert!(record.avg_comment_sentiment > 0.0);
        assert!(record.avg_comment_sentiment > baseline);
        assert_eq!(record.author, "author_t1");
        assert_eq!(outcome.report.records, 1);
    }

    #[tokio::test]
    async fn unresolved_threads_never_fetch_comments() {
        let feed = FakeFeed::default().thread(
            "t1",
            "Loss porn thread",
            "no tickers here",
            ready(&["moon"]),
        );
        let scorer = SentimentScorer::new(FixedModel::default());

        let outcome = run_cycle(&feed, &universe(), &scorer, &options())
            .await
            .unwrap();

        assert!(outcome.snapshot.is_empty());
        assert_eq!(outcome.report.skipped_no_ticker, 1);
        assert_eq!(feed.reaction_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exactly_neutral_threads_are_skipped() {
        let feed = FakeFeed::default()
            .thread("t1", "AMC", "", ready(&["up", "down"]))
            .thread("t2", "GME", "", ready(&[]));
        let scorer = SentimentScorer::new(FixedModel::with(&[("up", 0.6), ("down", -0.6)]));

        let outcome = run_cycle(&feed, &universe(), &scorer, &options())
            .await
            .unwrap();

        assert!(outcome.snapshot.is_empty());
        assert_eq!(outcome.report.skipped_neutral, 2);
        assert_eq!(outcome.report.resolved, 2);
    }

    #[tokio::test]
    async fn failing_and_hanging_threads_do_not_abort_the_cycle() {
        let feed = FakeFeed::default()
            .thread("t1", "GME", "", Reactions::Fail)
            .thread("t2", "GME", "", Reactions::Hang)
            .thread("t3", "GME", "", ready(&["ERR"]))
            .thread("t4", "AMC", "", ready(&["moon moon"]));
        let scorer = SentimentScorer::new(FixedModel::default());

        let outcome = run_cycle(&feed, &universe(), &scorer, &options())
            .await
            .unwrap();

        assert_eq!(outcome.report.skipped_failed, 3);
        assert_eq!(outcome.snapshot.len(), 1);
        assert_eq!(outcome.snapshot.records[0].ticker, "AMC");
    }

    #[tokio::test]
    async fn duplicate_tickers_keep_the_most_extreme_thread() {
        let feed = FakeFeed::default()
            .thread("t1", "GME", "", ready(&["good", "meh"]))
            .thread("t2", "GME", "", ready(&["bad"]))
            .thread("t3", "AMC", "", ready(&["good"]));
        let scorer = SentimentScorer::new(FixedModel::with(&[("good", 0.5), ("bad", -0.5)]));

        let outcome = run_cycle(&feed, &universe(), &scorer, &options())
            .await
            .unwrap();

        let rows: Vec<(&str, f64)> = outcome
            .snapshot
            .records
            .iter()
            .map(|r| (r.ticker.as_str(), r.avg_comment_sentiment))
            .collect();
        assert_eq!(rows, vec![("AMC", 1.0), ("GME", -1.0)]);
        assert_eq!(outcome.report.replaced, 1);
        assert_eq!(outcome.snapshot.records[1].author, "author_t2");
    }

    #[tokio::test]
    async fn listing_failure_fails_the_cycle() {
        let feed = FakeFeed {
            listing_fails: true,
            ..FakeFeed::default()
        };
        let scorer = SentimentScorer::new(FixedModel::default());

        let result = run_cycle(&feed, &universe(), &scorer, &options()).await;
        assert!(matches!(result, Err(SentimentError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn thread_limit_is_forwarded_to_the_feed() {
        let feed = FakeFeed::default()
            .thread("t1", "GME", "", ready(&["moon moon"]))
            .thread("t2", "AMC", "", ready(&["moon moon"]));
        let scorer = SentimentScorer::new(FixedModel::default());
        let opts = CycleOptions {
            thread_limit: 1,
            ..options()
        };

        let outcome = run_cycle(&feed, &universe(), &scorer, &opts).await.unwrap();
        assert_eq!(outcome.report.threads_seen, 1);
        assert_eq!(outcome.snapshot.records[0].ticker, "GME");
    }
}
