pub mod error;
pub mod sources;
pub mod stats;
pub mod traits;

pub use error::{ImporterError, Result};
pub use stats::{ImportStats, MoxfieldImportStats};
pub use traits::ImportContext;

pub use sources::moxfield::MoxfieldImporter;
pub use sources::scryfall::{
    BulkDataEntry, BulkDataSource, ImportOptions, ImportSource, RateLimiter, ScryfallClient,
    ScryfallConfig, ScryfallImporter,
};
