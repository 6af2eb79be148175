use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::fmt;
use tokio_util::sync::CancellationToken;

use super::parse;
use super::types::RemoteFeedDocument;
use super::IngestError;

pub const USER_AGENT: &str = "gator";

#[derive(Debug)]
pub enum FetchError {
    Http(reqwest::Error),
    Status(StatusCode),
    Cancelled,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Http(err) => write!(f, "http error: {err}"),
            FetchError::Status(status) => write!(f, "unexpected status {status}"),
            FetchError::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(err) => Some(err),
            _ => None,
        }
    }
}

/// Where ingestion gets remote documents from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str, ct: &CancellationToken) -> Result<RemoteFeedDocument, IngestError>;
}

/// Plain HTTP GET; no retries and no timeout beyond the cancellation token.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = client_builder().build().map_err(FetchError::Http)?;
        Ok(Self { client })
    }
}

fn client_builder() -> ClientBuilder {
    Client::builder().user_agent(USER_AGENT)
}

pub async fn fetch_rss(client: &Client, url: &str, ct: &CancellationToken) -> Result<Bytes, FetchError> {
    tokio::select! {
        biased;
        _ = ct.cancelled() => Err(FetchError::Cancelled),
        res = get_body(client, url) => res,
    }
}

async fn get_body(client: &Client, url: &str) -> Result<Bytes, FetchError> {
    let resp = client.get(url).send().await.map_err(FetchError::Http)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    resp.bytes().await.map_err(FetchError::Http)
}

#[async_trait]
impl FeedSource for HttpFetcher {
    async fn fetch(&self, url: &str, ct: &CancellationToken) -> Result<RemoteFeedDocument, IngestError> {
        let body = fetch_rss(&self.client, url, ct).await?;
        Ok(parse::parse_document(&body)?)
    }
}
