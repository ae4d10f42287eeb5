use std::sync::Arc;

use importer::{ImportContext, ScryfallImporter};
use storage::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub import_context: ImportContext,
    pub scryfall: Arc<ScryfallImporter>,
}

impl AppState {
    pub fn new(db: Database, scryfall: ScryfallImporter) -> Self {
        Self {
            import_context: ImportContext::new(db.catalog_store()),
            db,
            scryfall: Arc::new(scryfall),
        }
    }
}
