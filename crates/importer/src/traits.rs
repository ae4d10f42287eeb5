use std::sync::Arc;

use storage::CatalogStore;

/// Shared handles an import run works against.
#[derive(Clone)]
pub struct ImportContext {
    pub store: Arc<dyn CatalogStore>,
}

impl ImportContext {
    pub fn new(store: impl CatalogStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
