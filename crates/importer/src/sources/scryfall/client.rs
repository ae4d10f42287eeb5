use std::path::Path;

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use super::config::ScryfallConfig;
use super::rate_limit::RateLimiter;
use crate::error::{ImporterError, Result};

const DOWNLOAD_ACCEPT: &str = "application/json, application/octet-stream";

/// Rate-limited HTTP access to the Scryfall API and its bulk file host.
#[derive(Debug, Clone)]
pub struct ScryfallClient {
    client: Client,
    limiter: RateLimiter,
    config: ScryfallConfig,
}

impl ScryfallClient {
    pub fn new(config: ScryfallConfig) -> Result<Self> {
        let limiter = RateLimiter::new(config.rate_limit);
        Self::with_limiter(config, limiter)
    }

    /// Builds a client drawing from an existing request budget.
    pub fn with_limiter(config: ScryfallConfig, limiter: RateLimiter) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|_| {
                ImporterError::ValidationError(format!(
                    "Invalid Scryfall user agent: {}",
                    config.user_agent
                ))
            })?,
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            limiter,
            config,
        })
    }

    pub fn config(&self) -> &ScryfallConfig {
        &self.config
    }

    pub async fn fetch_json(&self, url: &str) -> Result<Value> {
        self.limiter
            .run(async {
                tracing::debug!("GET {}", url);
                let response = self
                    .client
                    .get(url)
                    .header(ACCEPT, "application/json")
                    .timeout(self.config.request_timeout)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ImporterError::RemoteApiError(format!(
                        "{} - {}",
                        status.as_u16(),
                        body
                    )));
                }

                Ok(response.json::<Value>().await?)
            })
            .await
    }

    /// Streams the response body to `destination` and returns the byte count.
    pub async fn download_to_file(&self, url: &str, destination: &Path) -> Result<u64> {
        self.limiter
            .run(async {
                tracing::info!("Downloading {} to {}", url, destination.display());
                let mut response = self
                    .client
                    .get(url)
                    .header(ACCEPT, DOWNLOAD_ACCEPT)
                    .timeout(self.config.download_timeout)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    return Err(ImporterError::DownloadError {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }

                let mut file = tokio::fs::File::create(destination).await?;
                let mut written = 0u64;
                while let Some(chunk) = response.chunk().await? {
                    file.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                }
                file.flush().await?;

                tracing::info!(
                    "Download completed: {:.2} MB",
                    written as f64 / 1024.0 / 1024.0
                );
                Ok(written)
            })
            .await
    }
}
