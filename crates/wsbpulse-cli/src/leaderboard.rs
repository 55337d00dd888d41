//! Console leaderboard printed after each cycle.

use std::fmt::Write as _;

use wsbpulse_sentiment::Snapshot;

const LEADERBOARD_SIZE: usize = 10;

pub(crate) fn print_leaderboard(snapshot: &Snapshot) {
    print!("{}", render_leaderboard(snapshot, LEADERBOARD_SIZE));
}

/// Fixed-width table of the first `n` snapshot records.
pub(crate) fn render_leaderboard(snapshot: &Snapshot, n: usize) -> String {
    if snapshot.is_empty() {
        return "no tickers with a sentiment signal this cycle\n".to_string();
    }

    let mut out = format!(
        "{:<4}{:<8}{:>11}{:>10}{:>9}{:>8}  AUTHOR\n",
        "#", "TICKER", "SENTIMENT", "COMMENTS", "SCORE", "RATIO"
    );
    for (rank, record) in snapshot.top(n).iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4}{:<8}{:>11.4}{:>10}{:>9}{:>8.2}  {}",
            rank + 1,
            record.ticker,
            record.avg_comment_sentiment,
            record.num_comments,
            record.score,
            record.upvote_ratio,
            record.author
        );
    }
    out
}
