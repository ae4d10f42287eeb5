use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardCondition {
    Mint,
    #[default]
    NearMint,
    LightlyPlayed,
    ModeratelyPlayed,
    HeavilyPlayed,
    Damaged,
}

impl CardCondition {
    pub const ALL: [CardCondition; 6] = [
        CardCondition::Mint,
        CardCondition::NearMint,
        CardCondition::LightlyPlayed,
        CardCondition::ModeratelyPlayed,
        CardCondition::HeavilyPlayed,
        CardCondition::Damaged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardCondition::Mint => "mint",
            CardCondition::NearMint => "near_mint",
            CardCondition::LightlyPlayed => "lightly_played",
            CardCondition::ModeratelyPlayed => "moderately_played",
            CardCondition::HeavilyPlayed => "heavily_played",
            CardCondition::Damaged => "damaged",
        }
    }
}

impl fmt::Display for CardCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardCondition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown card condition: {}", s))
    }
}

impl TryFrom<String> for CardCondition {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One owned physical copy of a card. `deck_id` is `None` while the copy is
/// available in its collection.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CardInstance {
    pub card_instance_id: Uuid,
    pub card_id: Uuid,
    pub collection_id: Uuid,
    pub deck_id: Option<Uuid>,
    #[sqlx(try_from = "String")]
    pub condition: CardCondition,
    pub foil: bool,
    pub language: String,
    pub tags: Option<sqlx::types::Json<Vec<String>>>,
    pub purchase_price: Option<Decimal>,
    pub alter: bool,
    pub proxy: bool,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCardInstance {
    pub card_id: Uuid,
    pub collection_id: Uuid,
    pub condition: CardCondition,
    pub foil: bool,
    pub language: String,
    pub tags: Option<Vec<String>>,
    pub purchase_price: Option<Decimal>,
    pub alter: bool,
    pub proxy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_round_trips_through_text_column() {
        for condition in CardCondition::ALL {
            assert_eq!(condition.as_str().parse::<CardCondition>(), Ok(condition));
        }
        assert!("played".parse::<CardCondition>().is_err());
    }

    #[test]
    fn test_condition_defaults_to_near_mint() {
        assert_eq!(CardCondition::default(), CardCondition::NearMint);
    }
}
