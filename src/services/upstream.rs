// src/services/upstream.rs
use std::env;
use std::error::Error as StdError;
use std::time::Duration;

use log::info;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::models::{
    ApiEnvelope, Creator, CreatorData, CreatorSnapshot, CreatorSnapshotDetail, Snapshot,
};

pub type Result<T> = std::result::Result<T, Box<dyn StdError + Send + Sync>>;

/// Client for the remote analytics backend. Every endpoint answers a
/// `{success, data, error}` envelope; `success: false` becomes an error here
/// and is degraded to defaults by the callers that can.
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            // The forced re-scrape can take the better part of a minute.
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(UpstreamClient { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn from_env() -> Result<Self> {
        let base_url =
            env::var("UPSTREAM_API_URL").map_err(|_| "UPSTREAM_API_URL must be set")?;
        UpstreamClient::new(&base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, username: Option<&str>) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        info!("Fetching upstream data from {}", url);
        let mut request = self.client.get(&url);
        if let Some(name) = username {
            request = request.query(&[("username", name)]);
        }
        let envelope: ApiEnvelope<T> = request.send().await?.json().await?;
        unwrap_envelope(envelope)
    }

    /// `GET /api/data`: cached creator + video records.
    pub async fn cached_data(&self) -> Result<Vec<Creator>> {
        let data: CreatorData = self.get("/api/data", None).await?;
        Ok(data.stats)
    }

    /// `POST /api/fetch`: triggers a fresh scrape server-side.
    pub async fn refresh_data(&self) -> Result<Vec<Creator>> {
        let url = format!("{}/api/fetch", self.base_url);
        info!("Requesting fresh upstream scrape via {}", url);
        let envelope: ApiEnvelope<CreatorData> =
            self.client.post(&url).send().await?.json().await?;
        Ok(unwrap_envelope(envelope)?.stats)
    }

    /// `GET /api/snapshots`: global daily view-growth series.
    pub async fn snapshots(&self) -> Result<Vec<Snapshot>> {
        self.get("/api/snapshots", None).await
    }

    pub async fn creator_snapshots(&self) -> Result<Vec<CreatorSnapshot>> {
        self.get("/api/creator-snapshots", None).await
    }

    pub async fn creator_snapshot_detail(&self, username: &str) -> Result<CreatorSnapshotDetail> {
        self.get("/api/creator-snapshots", Some(username)).await
    }

    pub async fn instagram_creator_snapshots(&self) -> Result<Vec<CreatorSnapshot>> {
        self.get("/api/instagram-creator-snapshots", None).await
    }

    pub async fn instagram_creator_snapshot_detail(
        &self,
        username: &str,
    ) -> Result<CreatorSnapshotDetail> {
        self.get("/api/instagram-creator-snapshots", Some(username)).await
    }
}

fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T> {
    if !envelope.success {
        let message = envelope.error.unwrap_or_else(|| "upstream reported failure".to_string());
        return Err(message.into());
    }
    envelope.data.ok_or_else(|| "upstream envelope missing data".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_envelope_surfaces_error_message() {
        let envelope: ApiEnvelope<Vec<Snapshot>> = ApiEnvelope::err("scrape failed");
        let err = unwrap_envelope(envelope).unwrap_err();
        assert_eq!(err.to_string(), "scrape failed");
    }

    #[test]
    fn successful_envelope_without_data_is_an_error() {
        let envelope: ApiEnvelope<Vec<Snapshot>> =
            ApiEnvelope { success: true, data: None, error: None };
        assert!(unwrap_envelope(envelope).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = UpstreamClient::new("https://example.com/").unwrap();
        assert_eq!(client.base_url, "https://example.com");
    }
}
