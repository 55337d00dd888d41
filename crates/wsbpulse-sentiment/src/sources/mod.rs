//! Thread feed implementations.

mod reddit;
mod reddit_helpers;

pub use reddit::{RedditClient, RedditSettings};
