use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::helpers;
use crate::snapshot::{ListingError, Snapshot, parse_listing};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("listing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed listing payload: {0}")]
    Malformed(#[from] ListingError),
}

/// Capability to pull the full current games list, called once per tick.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError>;
}

/// Production fetcher for the public games list endpoint.
pub struct HttpSnapshotFetcher {
    client: reqwest::Client,
    url: String,
    username: String,
    token: String,
}

impl HttpSnapshotFetcher {
    /// Build a fetcher from config. The request timeout bounds the whole
    /// call so a stalled listing endpoint cannot stall the tick loop
    /// longer than configured.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()?;
        Ok(Self {
            client,
            url: config.listing_url.clone(),
            username: config.listing_username.clone(),
            token: config.listing_token.clone(),
        })
    }
}

#[async_trait]
impl SnapshotFetcher for HttpSnapshotFetcher {
    async fn fetch_snapshot(&self) -> Result<Snapshot, FetchError> {
        let payload: serde_json::Value = self
            .client
            .get(&self.url)
            .query(&[
                ("username", self.username.as_str()),
                ("token", self.token.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_listing(payload, helpers::now())?)
    }
}
