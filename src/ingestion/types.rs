use serde::Serialize;
use uuid::Uuid;

/// Parsed RSS channel; lives only for one fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteFeedDocument {
    pub title: String,
    pub description: String,
    pub link: String,
    pub items: Vec<RemoteItem>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Raw `<pubDate>` text; normalized later.
    pub pub_date: String,
}

// Outcome of one ingestion cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSummary {
    pub feed_id: Uuid,
    pub feed_name: String,
    pub url: String,
    pub items: usize,
    pub created: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub errors: usize,
    pub undated: usize,
}
