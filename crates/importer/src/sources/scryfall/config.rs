use std::time::Duration;

use crate::error::{ImporterError, Result};

pub const DEFAULT_API_URL: &str = "https://api.scryfall.com";
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ScryfallConfig {
    pub api_url: String,
    pub user_agent: String,
    pub rate_limit: Duration,
    pub request_timeout: Duration,
    pub download_timeout: Duration,
}

impl Default for ScryfallConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: default_user_agent(),
            rate_limit: DEFAULT_RATE_LIMIT,
            request_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(600),
        }
    }
}

impl ScryfallConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let rate_limit = match std::env::var("SCRYFALL_RATE_LIMIT_MS") {
            Ok(value) => Duration::from_millis(value.parse().map_err(|_| {
                ImporterError::ValidationError(format!(
                    "SCRYFALL_RATE_LIMIT_MS must be a number of milliseconds, got '{}'",
                    value
                ))
            })?),
            Err(_) => defaults.rate_limit,
        };

        Ok(Self {
            api_url: std::env::var("SCRYFALL_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            user_agent: std::env::var("SCRYFALL_USER_AGENT").unwrap_or(defaults.user_agent),
            rate_limit,
            ..defaults
        })
    }

    pub fn bulk_data_url(&self) -> String {
        format!("{}/bulk-data", self.api_url)
    }
}

fn default_user_agent() -> String {
    format!(
        "mtg-collection/{} (MTG Collection API)",
        env!("CARGO_PKG_VERSION")
    )
}
