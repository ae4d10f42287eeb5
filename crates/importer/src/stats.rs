use serde::Serialize;
use serde::ser::SerializeStruct;

/// Entries kept in [`ImportStats::error_log`]; `errors` keeps counting past it.
pub const ERROR_LOG_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardError {
    pub card_id: String,
    pub card_name: String,
    pub error: String,
}

/// Per-run counters for a bulk catalog import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportStats {
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub batches: usize,
    pub error_log: Vec<CardError>,
}

impl ImportStats {
    pub fn record_error(
        &mut self,
        card_id: impl Into<String>,
        card_name: impl Into<String>,
        error: impl Into<String>,
    ) {
        self.errors += 1;
        if self.error_log.len() < ERROR_LOG_LIMIT {
            self.error_log.push(CardError {
                card_id: card_id.into(),
                card_name: card_name.into(),
                error: error.into(),
            });
        }
    }

    /// Percentage of processed records that were written, rounded to two decimals.
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        let rate = (self.created + self.updated) as f64 / self.processed as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }
}

impl Serialize for ImportStats {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ImportStats", 8)?;
        state.serialize_field("processed", &self.processed)?;
        state.serialize_field("created", &self.created)?;
        state.serialize_field("updated", &self.updated)?;
        state.serialize_field("skipped", &self.skipped)?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("batches", &self.batches)?;
        state.serialize_field("error_log", &self.error_log)?;
        state.serialize_field("success_rate", &self.success_rate())?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// Per-run counters for a collection CSV import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoxfieldImportStats {
    pub processed: usize,
    pub cards_created: usize,
    pub cards_found: usize,
    pub instances_created: usize,
    pub errors: Vec<RowError>,
}

impl MoxfieldImportStats {
    pub fn record_error(&mut self, row: usize, message: impl Into<String>) {
        self.errors.push(RowError {
            row,
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let stats = ImportStats {
            processed: 100,
            created: 90,
            updated: 5,
            errors: 5,
            ..ImportStats::default()
        };
        assert_eq!(stats.success_rate(), 95.0);
    }

    #[test]
    fn test_success_rate_rounds_to_two_decimals() {
        let stats = ImportStats {
            processed: 3,
            created: 1,
            ..ImportStats::default()
        };
        assert_eq!(stats.success_rate(), 33.33);
    }

    #[test]
    fn test_success_rate_of_empty_run_is_zero() {
        assert_eq!(ImportStats::default().success_rate(), 0.0);
    }

    #[test]
    fn test_error_log_is_capped_but_errors_keep_counting() {
        let mut stats = ImportStats::default();
        for i in 0..ERROR_LOG_LIMIT + 25 {
            stats.record_error(i.to_string(), "Card", "bad record");
        }
        assert_eq!(stats.errors, ERROR_LOG_LIMIT + 25);
        assert_eq!(stats.error_log.len(), ERROR_LOG_LIMIT);
        assert_eq!(stats.error_log[0].card_id, "0");
    }

    #[test]
    fn test_serialized_stats_carry_success_rate() {
        let stats = ImportStats {
            processed: 4,
            created: 3,
            errors: 1,
            ..ImportStats::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["success_rate"], 75.0);
        assert_eq!(json["processed"], 4);
    }
}
