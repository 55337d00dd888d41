//! Flat CSV export of crawl snapshots.
//!
//! Each snapshot lands in `<dir>/<YYYYMMDD-HHMMSS>.csv`, one column per ticker:
//!
//! ```text
//! field,GME,AMC
//! avg_comment_sentiment,0.75,-0.5
//! num_comments,1200,300
//! ...
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;
use wsbpulse_sentiment::{SecurityRecord, Snapshot};

const LABEL_HEADER: &str = "field";
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

type Cell = fn(&SecurityRecord) -> String;

/// Row label and cell renderer, in file order.
const ROWS: [(&str, Cell); 6] = [
    ("avg_comment_sentiment", |r| r.avg_comment_sentiment.to_string()),
    ("num_comments", |r| r.num_comments.to_string()),
    ("score", |r| r.score.to_string()),
    ("upvote_ratio", |r| r.upvote_ratio.to_string()),
    ("created_date_utc", |r| {
        r.created_date_utc.format(CREATED_FORMAT).to_string()
    }),
    ("author", |r| r.author.clone()),
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to flush snapshot {path}: {source}")]
    Flush {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Durable destination for finished snapshots.
pub trait SnapshotSink: Send + Sync {
    /// Persist `snapshot`, returning where it went.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the snapshot cannot be written.
    fn write(&self, snapshot: &Snapshot) -> Result<PathBuf, ExportError>;
}

/// `YYYYMMDD-HHMMSS.csv` for the given wall-clock time.
#[must_use]
pub fn snapshot_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}.csv", now.format("%Y%m%d-%H%M%S"))
}

/// Writes transposed CSV snapshots into a directory.
#[derive(Debug, Clone)]
pub struct CsvSnapshotSink {
    dir: PathBuf,
}

impl CsvSnapshotSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `snapshot` under an explicit file name inside the sink directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the directory cannot be created or the file
    /// cannot be written.
    pub fn write_named(&self, snapshot: &Snapshot, file_name: &str) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| ExportError::CreateDir {
            path: self.dir.display().to_string(),
            source: e,
        })?;

        let path = self.dir.join(file_name);
        let shown = path.display().to_string();
        let write_err = |e: csv::Error| ExportError::Write {
            path: shown.clone(),
            source: e,
        };

        let mut writer = csv::Writer::from_path(&path).map_err(write_err)?;
        for row in transpose(&snapshot.records) {
            writer.write_record(&row).map_err(write_err)?;
        }
        writer.flush().map_err(|e| ExportError::Flush {
            path: shown.clone(),
            source: e,
        })?;

        tracing::info!(
            path = %shown,
            records = snapshot.len(),
            "snapshot exported"
        );
        Ok(path)
    }
}

impl SnapshotSink for CsvSnapshotSink {
    fn write(&self, snapshot: &Snapshot) -> Result<PathBuf, ExportError> {
        self.write_named(snapshot, &snapshot_file_name(&Local::now()))
    }
}

/// Header row of tickers, then one row per field.
fn transpose(records: &[SecurityRecord]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(ROWS.len() + 1);

    let mut header = vec![LABEL_HEADER.to_string()];
    header.extend(records.iter().map(|r| r.ticker.clone()));
    rows.push(header);

    for (label, cell) in ROWS {
        let mut row = vec![label.to_string()];
        row.extend(records.iter().map(cell));
        rows.push(row);
    }

    rows
}
