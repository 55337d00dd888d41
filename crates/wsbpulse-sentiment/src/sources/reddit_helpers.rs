//! Reddit payload shapes and conversion into pipeline types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::ThreadObservation;

const DELETED_AUTHOR: &str = "[deleted]";

/// Submission listing wrapper.
#[derive(Debug, Deserialize)]
pub(super) struct Listing {
    pub(super) data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListingData {
    pub(super) children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Post {
    pub(super) data: PostData,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct PostData {
    pub(super) id: Option<String>,
    pub(super) title: Option<String>,
    pub(super) selftext: Option<String>,
    #[serde(default)]
    pub(super) num_comments: u64,
    #[serde(default)]
    pub(super) score: i64,
    #[serde(default)]
    pub(super) upvote_ratio: f64,
    #[serde(default)]
    pub(super) created_utc: f64,
    pub(super) author: Option<String>,
}

/// Comment tree listing. The comments endpoint returns `[post, comments]`.
#[derive(Debug, Deserialize)]
pub(super) struct CommentListing {
    pub(super) data: CommentListingData,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommentListingData {
    #[serde(default)]
    pub(super) children: Vec<CommentThing>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommentThing {
    pub(super) kind: String,
    pub(super) data: CommentData,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommentData {
    pub(super) body: Option<String>,
}

pub(super) fn to_observation(data: PostData) -> Option<ThreadObservation> {
    let id = data.id.filter(|id| !id.trim().is_empty())?;
    let author = data
        .author
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| DELETED_AUTHOR.to_string());

    Some(ThreadObservation {
        id,
        title: data.title.unwrap_or_default(),
        body: data
            .selftext
            .filter(|b| !is_tombstone(b))
            .unwrap_or_default(),
        num_comments: data.num_comments,
        score: data.score,
        upvote_ratio: data.upvote_ratio,
        created_utc: epoch_to_utc(data.created_utc),
        author,
    })
}

fn epoch_to_utc(secs: f64) -> DateTime<Utc> {
    #[allow(clippy::cast_possible_truncation)]
    let whole = secs.trunc() as i64;
    DateTime::from_timestamp(whole, 0).unwrap_or_default()
}

fn is_tombstone(text: &str) -> bool {
    let t = text.trim();
    t == "[deleted]" || t == "[removed]"
}

/// Bodies of the top-level comments, in listing order. Replies are not
/// scored; `more` stubs, tombstones and empty bodies are dropped.
pub(super) fn top_level_comments(listing: CommentListing) -> Vec<String> {
    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t1")
        .filter_map(|thing| thing.data.body)
        .filter(|body| !body.trim().is_empty() && !is_tombstone(body))
        .collect()
}
