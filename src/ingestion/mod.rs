use chrono::Utc;
use std::fmt;
use tokio_util::sync::CancellationToken;

use crate::post::types::NewPost;
use crate::store::{FeedStore, StoreError};
use crate::telemetry::{self};
use crate::telemetry::ops::agg::Phase as AggPhase;

pub mod db;
pub mod fetch;
pub mod parse;
pub mod published;
pub mod types;

use fetch::{FeedSource, FetchError};
use parse::DecodeError;
use types::CycleSummary;

#[derive(Debug)]
pub enum IngestError {
    /// Nothing registered yet; the cycle is a no-op.
    NoFeeds,
    Fetch(FetchError),
    Decode(DecodeError),
    Store(StoreError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::NoFeeds => write!(f, "no feeds registered"),
            IngestError::Fetch(e) => write!(f, "fetching feed: {e}"),
            IngestError::Decode(e) => write!(f, "decoding feed: {e}"),
            IngestError::Store(e) => write!(f, "storage: {e}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::NoFeeds => None,
            IngestError::Fetch(e) => Some(e),
            IngestError::Decode(e) => Some(e),
            IngestError::Store(e) => Some(e),
        }
    }
}

impl From<FetchError> for IngestError {
    fn from(e: FetchError) -> Self { IngestError::Fetch(e) }
}

impl From<DecodeError> for IngestError {
    fn from(e: DecodeError) -> Self { IngestError::Decode(e) }
}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self { IngestError::Store(e) }
}

/// One ingestion cycle: pick the stalest feed, mark it fetched, fetch it and
/// store one post per item. Per-item failures are logged and counted; only
/// selection, marking and the fetch itself can fail the cycle.
pub async fn run_once<S, F>(store: &S, source: &F, ct: &CancellationToken) -> Result<CycleSummary, IngestError>
where
    S: FeedStore + ?Sized,
    F: FeedSource + ?Sized,
{
    let log = telemetry::agg();

    let feed = {
        let _s = log.span(&AggPhase::SelectFeed).entered();
        match store.get_next_feed_to_fetch().await {
            Ok(feed) => feed,
            Err(StoreError::NotFound) => return Err(IngestError::NoFeeds),
            Err(e) => return Err(e.into()),
        }
    };
    let _cycle = log.span_kv(&AggPhase::Cycle, [("feed", feed.name.clone()), ("url", feed.url.clone())]).entered();

    // marked before the fetch so a broken feed waits for its next turn
    { let _s = log.span(&AggPhase::MarkFetched).entered(); store.mark_feed_fetched(feed.id, Utc::now()).await? };

    let doc = { let _s = log.span(&AggPhase::Fetch).entered(); source.fetch(&feed.url, ct).await? };
    log.debug_kv("📥 fetched", [("channel", doc.title.clone()), ("items", doc.items.len().to_string())]);

    let mut summary = CycleSummary {
        feed_id: feed.id,
        feed_name: feed.name.clone(),
        url: feed.url.clone(),
        items: doc.items.len(),
        created: 0,
        duplicates: 0,
        skipped: 0,
        errors: 0,
        undated: 0,
    };

    for item in doc.items {
        if item.link.is_empty() {
            summary.skipped += 1;
            log.debug_kv("↩️ skip", [("reason", "no-link".to_string()), ("title", item.title)]);
            continue;
        }

        let published_at = if item.pub_date.trim().is_empty() {
            None
        } else {
            match published::normalize_published(&item.pub_date) {
                Ok(dt) => Some(dt),
                Err(e) => {
                    log.debug_kv("🕒 dropping publish date", [("url", item.link.clone()), ("error", e.to_string())]);
                    None
                }
            }
        };
        if published_at.is_none() { summary.undated += 1; }

        let post = NewPost {
            feed_id: feed.id,
            title: item.title,
            url: item.link,
            description: Some(item.description).filter(|d| !d.is_empty()),
            published_at,
        };
        let url = post.url.clone();
        let _w = log.span(&AggPhase::WritePost).entered();
        match store.create_post(post).await {
            Ok(_) => summary.created += 1,
            Err(e) if e.is_duplicate() => {
                summary.duplicates += 1;
                log.debug_kv("↩️ already stored", [("url", url)]);
            }
            Err(e) => {
                summary.errors += 1;
                log.warn_kv("⚠️ post not saved", [("url", url), ("error", e.to_string())]);
            }
        }
    }

    log.cycle_summary(&summary);
    Ok(summary)
}
