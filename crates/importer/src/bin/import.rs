use std::path::PathBuf;

use clap::{Parser, Subcommand};
use importer::sources::moxfield::{self, MAX_FILE_SIZE_BYTES};
use importer::sources::scryfall::{self, DEFAULT_BATCH_SIZE, DEFAULT_DATA_TYPE};
use importer::{
    BulkDataSource, ImportContext, ImportOptions, ImportSource, ImportStats, MoxfieldImportStats,
    MoxfieldImporter, ScryfallClient, ScryfallConfig, ScryfallImporter,
};
use storage::{CatalogStore, Database, MemoryCatalogStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const ERROR_PREVIEW: usize = 10;

#[derive(Parser)]
#[command(name = "mtg-import")]
#[command(about = "MTG card catalog and collection importer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import Scryfall bulk data into the card catalog
    Scryfall {
        /// Bulk file URL or local path; the latest dataset of --type when omitted
        source: Option<String>,

        #[arg(long = "type", default_value = DEFAULT_DATA_TYPE)]
        data_type: String,

        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
        batch_size: usize,

        /// Comma-separated layouts to skip (replaces the defaults)
        #[arg(long, value_delimiter = ',')]
        skip_layouts: Option<Vec<String>>,

        /// Import into a throwaway in-memory catalog
        #[arg(long)]
        dry_run: bool,
    },
    /// List the bulk datasets Scryfall currently offers
    BulkData,
    /// Show card catalog statistics
    Stats,
    /// Import a Moxfield collection export
    Moxfield {
        file: PathBuf,

        #[arg(long)]
        collection: Uuid,

        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("import={},importer={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Scryfall {
            source,
            data_type,
            batch_size,
            skip_layouts,
            dry_run,
        } => {
            let source = match source {
                Some(source) => ImportSource::parse(&source),
                None => ImportSource::Latest { data_type },
            };
            let mut options = ImportOptions {
                batch_size,
                ..ImportOptions::default()
            };
            if let Some(skip_layouts) = skip_layouts {
                options.skip_layouts = skip_layouts;
            }
            handle_scryfall_import(source, options, cli.database_url.as_deref(), dry_run).await?;
        }
        Commands::BulkData => {
            handle_bulk_data().await?;
        }
        Commands::Stats => {
            handle_stats(required_database_url(cli.database_url.as_deref())?).await?;
        }
        Commands::Moxfield {
            file,
            collection,
            dry_run,
        } => {
            handle_moxfield_import(file, collection, cli.database_url.as_deref(), dry_run).await?;
        }
    }

    Ok(())
}

async fn handle_scryfall_import(
    source: ImportSource,
    options: ImportOptions,
    database_url: Option<&str>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = if dry_run {
        tracing::info!("Dry run: importing into an in-memory catalog");
        ImportContext::new(MemoryCatalogStore::new())
    } else {
        ImportContext::new(connect(required_database_url(database_url)?).await?)
    };

    tracing::info!(
        "Starting Scryfall import ({:?}, batch size {}, skipping layouts: {})",
        source,
        options.batch_size,
        options.skip_layouts.join(", ")
    );

    let importer = ScryfallImporter::new(ScryfallClient::new(ScryfallConfig::from_env()?)?);
    let stats = importer.import(source, &options, &context).await?;
    report_scryfall_import(&stats);

    if !dry_run {
        handle_catalog_summary(context.store.as_ref()).await?;
    }

    Ok(())
}

async fn handle_bulk_data() -> Result<(), Box<dyn std::error::Error>> {
    let client = ScryfallClient::new(ScryfallConfig::from_env()?)?;
    let entries = BulkDataSource::new(&client).list_available().await?;

    tracing::info!("Available Scryfall bulk data:");
    for entry in entries {
        tracing::info!(
            "  - {:<16} {:<24} {:>10.2} MB  updated {}",
            entry.data_type,
            entry.name,
            entry.size_mb(),
            entry.updated_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

async fn handle_stats(database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = connect(database_url).await?;
    handle_catalog_summary(&store).await
}

async fn handle_catalog_summary(store: &dyn CatalogStore) -> Result<(), Box<dyn std::error::Error>> {
    let stats = store.catalog_stats().await?;

    tracing::info!("Card catalog:");
    tracing::info!("  Total cards:    {}", stats.total_cards);
    tracing::info!("  Scryfall cards: {}", stats.scryfall_cards);
    tracing::info!("  Manual cards:   {}", stats.manual_cards);
    tracing::info!("  Unique sets:    {}", stats.sets_count);
    tracing::info!(
        "  Latest set:     {}",
        stats.latest_set.as_deref().unwrap_or("N/A")
    );
    if !stats.rarity_breakdown.is_empty() {
        tracing::info!("  Rarity breakdown:");
        for (rarity, count) in &stats.rarity_breakdown {
            tracing::info!("    {:<10} {}", rarity, count);
        }
    }

    Ok(())
}

async fn handle_moxfield_import(
    file: PathBuf,
    collection_id: Uuid,
    database_url: Option<&str>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(&file).await?;
    if content.len() > MAX_FILE_SIZE_BYTES {
        return Err(format!(
            "{} is larger than the {} byte upload limit",
            file.display(),
            MAX_FILE_SIZE_BYTES
        )
        .into());
    }
    moxfield::validate_header(&content)?;

    let context = if dry_run {
        tracing::info!("Dry run: importing into an in-memory catalog");
        let store = MemoryCatalogStore::new();
        store.add_collection(collection_id)?;
        ImportContext::new(store)
    } else {
        ImportContext::new(connect(required_database_url(database_url)?).await?)
    };

    let stats = MoxfieldImporter::new()
        .import(&content, collection_id, &context)
        .await?;
    report_moxfield_import(&stats);

    Ok(())
}

async fn connect(database_url: &str) -> Result<storage::PgCatalogStore, Box<dyn std::error::Error>> {
    tracing::info!("Connecting to database...");
    let database = Database::new(database_url).await?;
    Ok(database.catalog_store())
}

fn required_database_url(database_url: Option<&str>) -> Result<&str, String> {
    database_url.ok_or_else(|| "DATABASE_URL is required (or pass --dry-run)".to_string())
}

fn parse_batch_size(value: &str) -> Result<usize, String> {
    let batch_size = value
        .parse::<usize>()
        .map_err(|_| format!("'{}' is not a number", value))?;
    scryfall::validate_batch_size(batch_size).map_err(|e| e.to_string())
}

fn report_scryfall_import(stats: &ImportStats) {
    tracing::info!("✓ Import completed");
    tracing::info!("  Processed: {}", stats.processed);
    tracing::info!("  Created:   {}", stats.created);
    tracing::info!("  Updated:   {}", stats.updated);
    tracing::info!("  Skipped:   {}", stats.skipped);
    tracing::info!("  Errors:    {}", stats.errors);
    tracing::info!("  Success rate: {}%", stats.success_rate());

    if !stats.error_log.is_empty() {
        tracing::warn!("Errors:");
        for error in stats.error_log.iter().take(ERROR_PREVIEW) {
            tracing::warn!("  ✗ {} ({}): {}", error.card_name, error.card_id, error.error);
        }
        if stats.errors > ERROR_PREVIEW {
            tracing::warn!("  ... and {} more errors", stats.errors - ERROR_PREVIEW);
        }
    }
}

fn report_moxfield_import(stats: &MoxfieldImportStats) {
    tracing::info!("✓ Moxfield import finished");
    tracing::info!("  Rows processed:    {}", stats.processed);
    tracing::info!("  Cards created:     {}", stats.cards_created);
    tracing::info!("  Cards found:       {}", stats.cards_found);
    tracing::info!("  Instances created: {}", stats.instances_created);

    if !stats.errors.is_empty() {
        tracing::warn!("Errors:");
        for error in stats.errors.iter().take(ERROR_PREVIEW) {
            tracing::warn!("  ✗ row {}: {}", error.row, error.message);
        }
        if stats.errors.len() > ERROR_PREVIEW {
            tracing::warn!("  ... and {} more errors", stats.errors.len() - ERROR_PREVIEW);
        }
    }
}
