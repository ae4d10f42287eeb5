use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde_json::Value;
use storage::models::CardData;

use super::models::{CardFace, ScryfallCard};
use crate::error::{ImporterError, Result};

const TYPE_SEPARATOR: char = '—';

/// Maps one raw bulk record into a catalog record.
///
/// Any failure comes back as [`ImporterError::MappingError`] carrying the
/// record's id and name, or "unknown" when those cannot be read either.
pub fn map_record(raw: Value) -> Result<CardData> {
    let (card_id, card_name) = identify(&raw);
    let card: ScryfallCard = serde_json::from_value(raw)
        .map_err(|e| mapping_error(&card_id, &card_name, e.to_string()))?;
    map_card(card)
}

/// Best-effort (id, name) pair for error reporting.
pub fn identify(raw: &Value) -> (String, String) {
    let field = |key: &str| {
        raw.get(key)
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string()
    };
    (field("id"), field("name"))
}

pub fn map_card(card: ScryfallCard) -> Result<CardData> {
    let card_id = card.id.clone().unwrap_or_else(|| "unknown".to_string());
    let card_name = card.name.clone().unwrap_or_else(|| "unknown".to_string());
    let fail = |message: &str| mapping_error(&card_id, &card_name, message);

    let scryfall_id = non_empty(card.id.clone()).ok_or_else(|| fail("missing id"))?;
    let title = non_empty(card.name.clone()).ok_or_else(|| fail("missing name"))?;

    let front = card.card_faces.as_ref().and_then(|faces| faces.first());
    let with_face = |top: &Option<String>, face: fn(&CardFace) -> &Option<String>| {
        non_empty(top.clone()).or_else(|| front.and_then(|f| non_empty(face(f).clone())))
    };

    let mana_cost = with_face(&card.mana_cost, |f| &f.mana_cost);
    let oracle_text = with_face(&card.oracle_text, |f| &f.oracle_text);
    let type_line = with_face(&card.type_line, |f| &f.type_line);
    let power_text = with_face(&card.power, |f| &f.power);
    let toughness_text = with_face(&card.toughness, |f| &f.toughness);
    let flavor_text = with_face(&card.flavor_text, |f| &f.flavor_text);

    let type_line = type_line.ok_or_else(|| fail("missing type line"))?;
    let (card_type, subtype) = split_type_line(&type_line);
    if card_type.is_empty() {
        return Err(fail("type line has no main type"));
    }

    let released_at = card
        .released_at
        .as_deref()
        .map(parse_release_date)
        .transpose()
        .map_err(|message| fail(&message))?;

    let cmc = card
        .cmc
        .map(|cmc| {
            Decimal::try_from(cmc)
                .map(|d| d.round_dp(2))
                .map_err(|_| fail("cmc is not a finite number"))
        })
        .transpose()?;

    let image_uris = card
        .image_uris
        .clone()
        .or_else(|| front.and_then(|f| f.image_uris.clone()));
    let image_url = image_uris
        .as_ref()
        .and_then(|uris| uris.get("normal"))
        .cloned();

    Ok(CardData {
        title,
        image: image_url.clone(),
        image_url,
        description: oracle_text.clone(),
        cost: mana_cost.clone(),
        card_type,
        subtype,
        power: power_text.as_deref().and_then(parse_stat),
        toughness: toughness_text.as_deref().and_then(parse_stat),
        power_text,
        toughness_text,
        edition: card.set_name.clone(),
        collector_number: card.collector_number,

        scryfall_id: Some(scryfall_id),
        oracle_id: card.oracle_id,
        multiverse_ids: card.multiverse_ids,
        mtgo_id: card.mtgo_id,
        mtgo_foil_id: card.mtgo_foil_id,
        arena_id: card.arena_id,
        tcgplayer_id: card.tcgplayer_id,
        tcgplayer_etched_id: card.tcgplayer_etched_id,
        cardmarket_id: card.cardmarket_id,

        mana_cost,
        cmc,
        oracle_text,
        flavor_text,
        type_line: Some(type_line),

        colors: card.colors,
        color_identity: card.color_identity,
        color_indicator: card.color_indicator,
        keywords: card.keywords,
        produced_mana: card.produced_mana,

        loyalty: card.loyalty,
        defense: card.defense,
        hand_modifier: card.hand_modifier,
        life_modifier: card.life_modifier,

        legalities: card.legalities,
        edhrec_rank: card.edhrec_rank,
        penny_rank: card.penny_rank,

        set_code: card.set,
        set_id: card.set_id,
        set_name: card.set_name,
        set_type: card.set_type,
        rarity: card.rarity,
        released_at,
        lang: non_empty(card.lang).unwrap_or_else(|| "en".to_string()),

        image_uris,
        layout: card.layout,
        highres_image: card.highres_image.unwrap_or(false),
        image_status: card.image_status,
        border_color: card.border_color,
        frame: card.frame,
        frame_effects: card.frame_effects,
        security_stamp: card.security_stamp,
        watermark: card.watermark,

        artist: card.artist,
        artist_ids: card.artist_ids,
        illustration_id: card.illustration_id,

        reserved: card.reserved.unwrap_or(false),
        foil: card.foil.unwrap_or(false),
        nonfoil: card.nonfoil.unwrap_or(true),
        oversized: card.oversized.unwrap_or(false),
        promo: card.promo.unwrap_or(false),
        reprint: card.reprint.unwrap_or(false),
        variation: card.variation.unwrap_or(false),
        digital: card.digital.unwrap_or(false),
        full_art: card.full_art.unwrap_or(false),
        textless: card.textless.unwrap_or(false),
        booster: card.booster.unwrap_or(true),
        story_spotlight: card.story_spotlight.unwrap_or(false),
        game_changer: card.game_changer.unwrap_or(false),

        finishes: card.finishes,
        games: card.games,
        promo_types: card.promo_types,
        prices: card.prices,
        purchase_uris: card.purchase_uris,
        related_uris: card.related_uris,
        variation_of: card.variation_of,
        card_back_id: card.card_back_id,

        scryfall_uri: card.scryfall_uri,
        uri: card.uri,
        rulings_uri: card.rulings_uri,
        prints_search_uri: card.prints_search_uri,
    })
}

/// Splits "Creature — Human Wizard" into its main type and optional subtype.
pub fn split_type_line(type_line: &str) -> (String, Option<String>) {
    match type_line.split_once(TYPE_SEPARATOR) {
        Some((main, sub)) => {
            let sub = sub.trim();
            (
                main.trim().to_string(),
                (!sub.is_empty()).then(|| sub.to_string()),
            )
        }
        None => (type_line.trim().to_string(), None),
    }
}

/// Integer value of a power/toughness string; `*`, `X`, `1+*` and the like have none.
pub fn parse_stat(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}

fn parse_release_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| format!("invalid release date '{}'", value))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn mapping_error(card_id: &str, card_name: &str, message: impl Into<String>) -> ImporterError {
    ImporterError::MappingError {
        card_id: card_id.to_string(),
        card_name: card_name.to_string(),
        message: message.into(),
    }
}
