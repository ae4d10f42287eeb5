use std::str::FromStr;

use rust_decimal::Decimal;
use storage::models::{CardCondition, PrintingKey};

use super::reader::CsvRow;
use crate::error::{ImporterError, Result};

/// One validated line of a Moxfield collection export.
#[derive(Debug, Clone, PartialEq)]
pub struct MoxfieldRow {
    pub count: u32,
    pub name: String,
    pub edition: String,
    pub collector_number: String,
    pub condition: CardCondition,
    pub language: String,
    pub foil: bool,
    pub tags: Option<Vec<String>>,
    pub alter: bool,
    pub proxy: bool,
    pub purchase_price: Option<Decimal>,
}

impl MoxfieldRow {
    pub fn from_csv(row: &CsvRow) -> Result<Self> {
        let field = |column: &str| row.get(column).map(|v| v.trim()).unwrap_or("");

        let name = field("Name");
        if name.is_empty() {
            return Err(ImporterError::ValidationError(
                "Card name is required".to_string(),
            ));
        }

        let count = field("Count").parse::<i64>().unwrap_or(0);
        if count <= 0 {
            return Err(ImporterError::ValidationError(
                "Count must be greater than 0".to_string(),
            ));
        }
        let count = u32::try_from(count).map_err(|_| {
            ImporterError::ValidationError(format!("Count {} is too large", count))
        })?;

        let language = match field("Language") {
            "" => "English",
            language => language,
        };

        Ok(Self {
            count,
            name: name.to_string(),
            edition: field("Edition").to_string(),
            collector_number: field("Collector Number").to_string(),
            condition: map_condition(field("Condition")),
            language: language.to_string(),
            foil: field("Foil").eq_ignore_ascii_case("foil"),
            tags: parse_tags(field("Tags")),
            alter: field("Alter").eq_ignore_ascii_case("true"),
            proxy: field("Proxy").eq_ignore_ascii_case("true"),
            purchase_price: parse_price(field("Purchase Price")),
        })
    }

    pub fn printing_key(&self) -> PrintingKey {
        PrintingKey::new(
            self.name.clone(),
            self.edition.clone(),
            self.collector_number.clone(),
        )
    }
}

/// Moxfield condition labels; anything unrecognised counts as near mint.
pub fn map_condition(label: &str) -> CardCondition {
    match label {
        "Mint" => CardCondition::Mint,
        "Near Mint" => CardCondition::NearMint,
        "Lightly Played" => CardCondition::LightlyPlayed,
        "Moderately Played" => CardCondition::ModeratelyPlayed,
        "Heavily Played" => CardCondition::HeavilyPlayed,
        "Damaged" => CardCondition::Damaged,
        _ => CardCondition::NearMint,
    }
}

/// Strips currency symbols and thousands separators; unparsable prices are dropped.
pub fn parse_price(value: &str) -> Option<Decimal> {
    let digits: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }
    Decimal::from_str(&digits).ok()
}

fn parse_tags(value: &str) -> Option<Vec<String>> {
    let tags: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    (!tags.is_empty()).then_some(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_row(pairs: &[(&str, &str)]) -> CsvRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sol_ring() -> CsvRow {
        csv_row(&[
            ("Count", "2"),
            ("Name", "Sol Ring"),
            ("Edition", "c21"),
            ("Collector Number", "263"),
            ("Condition", "Lightly Played"),
            ("Language", "English"),
            ("Foil", "foil"),
            ("Tags", "ramp, staples"),
            ("Alter", "False"),
            ("Proxy", "True"),
            ("Purchase Price", "$1,234.50"),
        ])
    }

    #[test]
    fn test_from_csv() {
        let row = MoxfieldRow::from_csv(&sol_ring()).unwrap();
        assert_eq!(row.count, 2);
        assert_eq!(row.condition, CardCondition::LightlyPlayed);
        assert!(row.foil);
        assert!(!row.alter);
        assert!(row.proxy);
        assert_eq!(
            row.tags,
            Some(vec!["ramp".to_string(), "staples".to_string()])
        );
        assert_eq!(row.purchase_price, Some(Decimal::new(123450, 2)));
        assert_eq!(row.printing_key(), PrintingKey::new("Sol Ring", "c21", "263"));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut row = sol_ring();
        row.insert("Name".to_string(), "  ".to_string());
        assert!(matches!(
            MoxfieldRow::from_csv(&row),
            Err(ImporterError::ValidationError(_))
        ));
    }

    #[test]
    fn test_non_positive_count_is_rejected() {
        for count in ["0", "-1", "many", ""] {
            let mut row = sol_ring();
            row.insert("Count".to_string(), count.to_string());
            assert!(MoxfieldRow::from_csv(&row).is_err(), "count {count:?}");
        }
    }

    #[test]
    fn test_condition_table() {
        assert_eq!(map_condition("Mint"), CardCondition::Mint);
        assert_eq!(map_condition("Near Mint"), CardCondition::NearMint);
        assert_eq!(map_condition("Moderately Played"), CardCondition::ModeratelyPlayed);
        assert_eq!(map_condition("Heavily Played"), CardCondition::HeavilyPlayed);
        assert_eq!(map_condition("Damaged"), CardCondition::Damaged);
        assert_eq!(map_condition("Good"), CardCondition::NearMint);
        assert_eq!(map_condition(""), CardCondition::NearMint);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$12.99"), Some(Decimal::new(1299, 2)));
        assert_eq!(parse_price("€ 3,50"), Some(Decimal::new(350, 0)));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_price("1.2.3"), None);
    }

    #[test]
    fn test_missing_optional_columns_take_defaults() {
        let row = MoxfieldRow::from_csv(&csv_row(&[("Count", "1"), ("Name", "Island")])).unwrap();
        assert_eq!(row.language, "English");
        assert_eq!(row.condition, CardCondition::NearMint);
        assert!(!row.foil);
        assert_eq!(row.tags, None);
        assert_eq!(row.purchase_price, None);
    }
}
