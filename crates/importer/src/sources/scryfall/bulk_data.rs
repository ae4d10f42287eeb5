use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::ScryfallClient;
use crate::error::{ImporterError, Result};

/// One dataset advertised by the bulk-data manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkDataEntry {
    #[serde(rename = "type")]
    pub data_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub download_uri: String,
    pub size: u64,
    #[serde(default)]
    pub content_type: String,
    pub updated_at: DateTime<Utc>,
}

impl BulkDataEntry {
    pub fn size_mb(&self) -> f64 {
        (self.size as f64 / 1024.0 / 1024.0 * 100.0).round() / 100.0
    }
}

pub struct BulkDataSource<'a> {
    client: &'a ScryfallClient,
}

impl<'a> BulkDataSource<'a> {
    pub fn new(client: &'a ScryfallClient) -> Self {
        Self { client }
    }

    pub async fn list_available(&self) -> Result<Vec<BulkDataEntry>> {
        let manifest = self
            .client
            .fetch_json(&self.client.config().bulk_data_url())
            .await?;
        parse_manifest(manifest)
    }

    pub async fn resolve_url(&self, data_type: &str) -> Result<String> {
        let entries = self.list_available().await?;
        find_download_uri(&entries, data_type)
    }
}

pub fn parse_manifest(manifest: Value) -> Result<Vec<BulkDataEntry>> {
    match manifest {
        Value::Object(mut object) => match object.remove("data") {
            Some(data @ Value::Array(_)) => Ok(serde_json::from_value(data)?),
            _ => Err(invalid_manifest()),
        },
        _ => Err(invalid_manifest()),
    }
}

pub fn find_download_uri(entries: &[BulkDataEntry], data_type: &str) -> Result<String> {
    entries
        .iter()
        .find(|entry| entry.data_type == data_type)
        .map(|entry| entry.download_uri.clone())
        .ok_or_else(|| ImporterError::NotFoundError(format!("Bulk data type: {}", data_type)))
}

fn invalid_manifest() -> ImporterError {
    ImporterError::RemoteApiError("Invalid bulk data response: missing data array".to_string())
}
