pub mod moxfield;
pub mod scryfall;
