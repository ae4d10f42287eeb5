use std::collections::BTreeMap;

use serde::Deserialize;

/// A Scryfall card object as it appears in a bulk file. Every field is
/// optional here; the mapper decides which ones a catalog record requires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScryfallCard {
    pub object: Option<String>,
    pub id: Option<String>,
    pub oracle_id: Option<String>,
    pub multiverse_ids: Option<Vec<i64>>,
    pub mtgo_id: Option<i32>,
    pub mtgo_foil_id: Option<i32>,
    pub arena_id: Option<i32>,
    pub tcgplayer_id: Option<i32>,
    pub tcgplayer_etched_id: Option<i32>,
    pub cardmarket_id: Option<i32>,

    pub name: Option<String>,
    pub lang: Option<String>,
    pub released_at: Option<String>,
    pub uri: Option<String>,
    pub scryfall_uri: Option<String>,
    pub layout: Option<String>,
    pub highres_image: Option<bool>,
    pub image_status: Option<String>,
    pub image_uris: Option<BTreeMap<String, String>>,

    pub mana_cost: Option<String>,
    pub cmc: Option<f64>,
    pub type_line: Option<String>,
    pub oracle_text: Option<String>,
    pub flavor_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub loyalty: Option<String>,
    pub defense: Option<String>,
    pub hand_modifier: Option<String>,
    pub life_modifier: Option<String>,
    pub colors: Option<Vec<String>>,
    pub color_identity: Option<Vec<String>>,
    pub color_indicator: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub produced_mana: Option<Vec<String>>,
    pub legalities: Option<BTreeMap<String, String>>,
    pub card_faces: Option<Vec<CardFace>>,

    pub games: Option<Vec<String>>,
    pub reserved: Option<bool>,
    pub game_changer: Option<bool>,
    pub foil: Option<bool>,
    pub nonfoil: Option<bool>,
    pub finishes: Option<Vec<String>>,
    pub oversized: Option<bool>,
    pub promo: Option<bool>,
    pub reprint: Option<bool>,
    pub variation: Option<bool>,
    pub variation_of: Option<String>,
    pub set_id: Option<String>,
    pub set: Option<String>,
    pub set_name: Option<String>,
    pub set_type: Option<String>,
    pub rulings_uri: Option<String>,
    pub prints_search_uri: Option<String>,
    pub collector_number: Option<String>,
    pub digital: Option<bool>,
    pub rarity: Option<String>,
    pub card_back_id: Option<String>,
    pub artist: Option<String>,
    pub artist_ids: Option<Vec<String>>,
    pub illustration_id: Option<String>,
    pub border_color: Option<String>,
    pub frame: Option<String>,
    pub frame_effects: Option<Vec<String>>,
    pub security_stamp: Option<String>,
    pub full_art: Option<bool>,
    pub textless: Option<bool>,
    pub booster: Option<bool>,
    pub story_spotlight: Option<bool>,
    pub watermark: Option<String>,
    pub promo_types: Option<Vec<String>>,
    pub edhrec_rank: Option<i32>,
    pub penny_rank: Option<i32>,
    pub prices: Option<BTreeMap<String, Option<String>>>,
    pub related_uris: Option<BTreeMap<String, String>>,
    pub purchase_uris: Option<BTreeMap<String, String>>,
}

/// One face of a multi-faced card (transform, modal, split, flip, adventure).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardFace {
    pub name: Option<String>,
    pub mana_cost: Option<String>,
    pub type_line: Option<String>,
    pub oracle_text: Option<String>,
    pub flavor_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub image_uris: Option<BTreeMap<String, String>>,
}
