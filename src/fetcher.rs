use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::FetcherConfig;
use crate::utils::error::{AppError, Result};

/// Retrieves raw page markup over HTTP.
///
/// A single client is built at startup and reused for every request; it
/// carries the configured timeout and a browser-like User-Agent so the
/// target sites serve the normal product page.
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Fetches the markup behind `url`.
    ///
    /// Any transport error, timeout, or non-success status comes back as
    /// `AppError::Fetch`; callers treat that as "no data this cycle" and
    /// move on.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| AppError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch {
                url: url.to_string(),
                reason: format!("unexpected status {}", status),
            });
        }

        let body = response.text().await.map_err(|e| AppError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!(url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}
