pub mod card_instance;
