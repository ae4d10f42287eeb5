use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The flat field set of one card printing as stored in the `cards` table.
///
/// Every column except `title`, `card_type` and `lang` is optional. `power` and
/// `toughness` keep the integer legacy columns while `power_text` and
/// `toughness_text` hold the verbatim value (`*`, `X`, `1+*`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    pub title: String,
    pub image_url: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub cost: Option<String>,
    #[serde(rename = "type")]
    pub card_type: String,
    pub subtype: Option<String>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub power_text: Option<String>,
    pub toughness_text: Option<String>,
    pub edition: Option<String>,
    pub collector_number: Option<String>,

    pub scryfall_id: Option<String>,
    pub oracle_id: Option<String>,
    pub multiverse_ids: Option<Vec<i64>>,
    pub mtgo_id: Option<i32>,
    pub mtgo_foil_id: Option<i32>,
    pub arena_id: Option<i32>,
    pub tcgplayer_id: Option<i32>,
    pub tcgplayer_etched_id: Option<i32>,
    pub cardmarket_id: Option<i32>,

    pub mana_cost: Option<String>,
    pub cmc: Option<Decimal>,
    pub oracle_text: Option<String>,
    pub flavor_text: Option<String>,
    pub type_line: Option<String>,

    pub colors: Option<Vec<String>>,
    pub color_identity: Option<Vec<String>>,
    pub color_indicator: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub produced_mana: Option<Vec<String>>,

    pub loyalty: Option<String>,
    pub defense: Option<String>,
    pub hand_modifier: Option<String>,
    pub life_modifier: Option<String>,

    pub legalities: Option<BTreeMap<String, String>>,
    pub edhrec_rank: Option<i32>,
    pub penny_rank: Option<i32>,

    #[serde(rename = "set")]
    pub set_code: Option<String>,
    pub set_id: Option<String>,
    pub set_name: Option<String>,
    pub set_type: Option<String>,
    pub rarity: Option<String>,
    pub released_at: Option<NaiveDate>,
    pub lang: String,

    pub image_uris: Option<BTreeMap<String, String>>,
    pub layout: Option<String>,
    pub highres_image: bool,
    pub image_status: Option<String>,
    pub border_color: Option<String>,
    pub frame: Option<String>,
    pub frame_effects: Option<Vec<String>>,
    pub security_stamp: Option<String>,
    pub watermark: Option<String>,

    pub artist: Option<String>,
    pub artist_ids: Option<Vec<String>>,
    pub illustration_id: Option<String>,

    pub reserved: bool,
    pub foil: bool,
    pub nonfoil: bool,
    pub oversized: bool,
    pub promo: bool,
    pub reprint: bool,
    pub variation: bool,
    pub digital: bool,
    pub full_art: bool,
    pub textless: bool,
    pub booster: bool,
    pub story_spotlight: bool,
    pub game_changer: bool,

    pub finishes: Option<Vec<String>>,
    pub games: Option<Vec<String>>,
    pub promo_types: Option<Vec<String>>,
    pub prices: Option<BTreeMap<String, Option<String>>>,
    pub purchase_uris: Option<BTreeMap<String, String>>,
    pub related_uris: Option<BTreeMap<String, String>>,
    pub variation_of: Option<String>,
    pub card_back_id: Option<String>,

    pub scryfall_uri: Option<String>,
    pub uri: Option<String>,
    pub rulings_uri: Option<String>,
    pub prints_search_uri: Option<String>,
}

impl CardData {
    /// A bare printing known only by its natural key. The main type is a
    /// placeholder until a catalog import fills the record in.
    pub fn placeholder(
        title: impl Into<String>,
        edition: impl Into<String>,
        collector_number: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            edition: Some(edition.into()),
            collector_number: Some(collector_number.into()),
            card_type: "Unknown".to_string(),
            ..Self::default()
        }
    }

    pub fn printing_key(&self) -> PrintingKey {
        PrintingKey {
            title: self.title.clone(),
            edition: self.edition.clone(),
            collector_number: self.collector_number.clone(),
        }
    }
}

impl Default for CardData {
    fn default() -> Self {
        Self {
            title: String::new(),
            image_url: None,
            image: None,
            description: None,
            cost: None,
            card_type: String::new(),
            subtype: None,
            power: None,
            toughness: None,
            power_text: None,
            toughness_text: None,
            edition: None,
            collector_number: None,
            scryfall_id: None,
            oracle_id: None,
            multiverse_ids: None,
            mtgo_id: None,
            mtgo_foil_id: None,
            arena_id: None,
            tcgplayer_id: None,
            tcgplayer_etched_id: None,
            cardmarket_id: None,
            mana_cost: None,
            cmc: None,
            oracle_text: None,
            flavor_text: None,
            type_line: None,
            colors: None,
            color_identity: None,
            color_indicator: None,
            keywords: None,
            produced_mana: None,
            loyalty: None,
            defense: None,
            hand_modifier: None,
            life_modifier: None,
            legalities: None,
            edhrec_rank: None,
            penny_rank: None,
            set_code: None,
            set_id: None,
            set_name: None,
            set_type: None,
            rarity: None,
            released_at: None,
            lang: "en".to_string(),
            image_uris: None,
            layout: None,
            highres_image: false,
            image_status: None,
            border_color: None,
            frame: None,
            frame_effects: None,
            security_stamp: None,
            watermark: None,
            artist: None,
            artist_ids: None,
            illustration_id: None,
            reserved: false,
            foil: false,
            nonfoil: true,
            oversized: false,
            promo: false,
            reprint: false,
            variation: false,
            digital: false,
            full_art: false,
            textless: false,
            booster: true,
            story_spotlight: false,
            game_changer: false,
            finishes: None,
            games: None,
            promo_types: None,
            prices: None,
            purchase_uris: None,
            related_uris: None,
            variation_of: None,
            card_back_id: None,
            scryfall_uri: None,
            uri: None,
            rulings_uri: None,
            prints_search_uri: None,
        }
    }
}

/// Natural key of a printing: (title, edition, collector number).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrintingKey {
    pub title: String,
    pub edition: Option<String>,
    pub collector_number: Option<String>,
}

impl PrintingKey {
    pub fn new(
        title: impl Into<String>,
        edition: impl Into<String>,
        collector_number: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            edition: Some(edition.into()),
            collector_number: Some(collector_number.into()),
        }
    }
}

/// Aggregate view of the catalog, split between imported and hand-entered cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_cards: i64,
    pub scryfall_cards: i64,
    pub manual_cards: i64,
    pub sets_count: i64,
    pub latest_set: Option<String>,
    pub rarity_breakdown: BTreeMap<String, i64>,
}
