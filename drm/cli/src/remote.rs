use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use drm_keybox::{RevocationSet, RevocationSource, RevocationUnavailable};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;

/**
    Attestation status endpoint publishing revoked certificate serials.
*/
pub const DEFAULT_STATUS_URL: &str = "https://android.googleapis.com/attestation/status";

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    entries: HashMap<String, serde_json::Value>,
}

/**
    Fetches the revocation list over HTTP. Every fetch bypasses caches.
*/
pub struct HttpRevocationSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRevocationSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl RevocationSource for HttpRevocationSource {
    fn fetch(&self) -> impl Future<Output = Result<RevocationSet, RevocationUnavailable>> + Send {
        async move {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default();
            let url = cache_busting_url(&self.url, nanos);
            tracing::debug!("fetching revocation list from {url}");

            let unavailable = |e: reqwest::Error| RevocationUnavailable(e.to_string());
            let body = self
                .client
                .get(&url)
                .header(CACHE_CONTROL, "max-age=0")
                .send()
                .await
                .map_err(unavailable)?
                .error_for_status()
                .map_err(unavailable)?
                .text()
                .await
                .map_err(unavailable)?;

            let set = parse_status(&body)?;
            tracing::debug!("revocation list has {} entries", set.len());
            Ok(set)
        }
    }
}

fn cache_busting_url(base: &str, nanos: u128) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{nanos}")
}

/**
    Revoked serials are the keys of the `entries` object.
*/
fn parse_status(body: &str) -> Result<RevocationSet, RevocationUnavailable> {
    let response: StatusResponse = serde_json::from_str(body)
        .map_err(|e| RevocationUnavailable(format!("invalid status response: {e}")))?;
    Ok(response.entries.into_keys().collect())
}
