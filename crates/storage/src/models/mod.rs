mod card;
mod card_instance;
mod collection;
mod deck;

pub use card::{CardData, CatalogStats, PrintingKey};
pub use card_instance::{CardCondition, CardInstance, NewCardInstance};
pub use collection::Collection;
pub use deck::Deck;
