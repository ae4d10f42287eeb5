use importer::sources::scryfall::DEFAULT_DATA_TYPE;
use importer::{
    BulkDataEntry, BulkDataSource, ImportContext, ImportOptions, ImportSource, ImportStats,
    Result, ScryfallImporter,
};
use serde::Deserialize;
use storage::models::CatalogStats;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ScryfallImportRequest {
    /// Bulk file URL or server-side path; the latest dataset of `type` when absent
    pub source: Option<String>,
    #[serde(rename = "type", default = "default_data_type")]
    pub data_type: String,
    #[serde(default)]
    #[validate(nested)]
    pub options: ImportRequestOptions,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ImportRequestOptions {
    pub skip_layouts: Option<Vec<String>>,
    #[validate(range(min = 100, max = 5000))]
    pub batch_size: Option<usize>,
}

fn default_data_type() -> String {
    DEFAULT_DATA_TYPE.to_string()
}

impl ScryfallImportRequest {
    pub fn source(&self) -> ImportSource {
        match &self.source {
            Some(source) => ImportSource::parse(source),
            None => ImportSource::Latest {
                data_type: self.data_type.clone(),
            },
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        let defaults = ImportOptions::default();
        ImportOptions {
            skip_layouts: self
                .options
                .skip_layouts
                .clone()
                .unwrap_or(defaults.skip_layouts),
            batch_size: self.options.batch_size.unwrap_or(defaults.batch_size),
        }
    }
}

/// Run a bulk catalog import
pub async fn import_bulk_data(
    importer: &ScryfallImporter,
    context: &ImportContext,
    request: &ScryfallImportRequest,
) -> Result<ImportStats> {
    importer
        .import(request.source(), &request.import_options(), context)
        .await
}

/// List the bulk datasets Scryfall offers
pub async fn list_bulk_data(importer: &ScryfallImporter) -> Result<Vec<BulkDataEntry>> {
    BulkDataSource::new(importer.client())
        .list_available()
        .await
}

/// Catalog statistics
pub async fn catalog_stats(context: &ImportContext) -> storage::error::Result<CatalogStats> {
    context.store.catalog_stats().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_request_imports_latest_default_cards() {
        let request: ScryfallImportRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(
            request.source(),
            ImportSource::Latest {
                data_type: "default_cards".to_string()
            }
        );
        assert_eq!(request.import_options(), ImportOptions::default());
    }

    #[test]
    fn test_explicit_options_override_defaults() {
        let request: ScryfallImportRequest = serde_json::from_value(json!({
            "source": "https://data.scryfall.io/oracle-cards/oracle-cards.json",
            "options": {"skip_layouts": ["token"], "batch_size": 500}
        }))
        .unwrap();

        assert!(matches!(request.source(), ImportSource::Url(_)));
        let options = request.import_options();
        assert_eq!(options.skip_layouts, ["token"]);
        assert_eq!(options.batch_size, 500);
    }

    #[test]
    fn test_batch_size_out_of_range_is_rejected() {
        for batch_size in [99, 5001] {
            let request: ScryfallImportRequest =
                serde_json::from_value(json!({"options": {"batch_size": batch_size}})).unwrap();
            assert!(request.validate().is_err(), "batch size {batch_size}");
        }
    }
}
