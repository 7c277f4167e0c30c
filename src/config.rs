use crate::error::{Result, SalesHistoryError};
use crate::time_grid::slot_index;
use serde::{Deserialize, Serialize};

/// Tunables for comparisons, projections and insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Series shown for weekday record high/low.
    pub weekday_record_limit: usize,
    /// Series shown for overall record high/low when nothing is selected.
    pub overall_record_limit: usize,
    /// Most recent records offered for specific-date selection.
    pub recent_selection_pool: usize,
    /// Cap on manually selected series.
    pub max_selected_series: usize,
    /// Same-weekday history needed before the pattern projection is used.
    pub min_pattern_samples: usize,
    /// First afternoon slot for the morning/afternoon split.
    pub midday_slot: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            weekday_record_limit: 5,
            overall_record_limit: 10,
            recent_selection_pool: 100,
            max_selected_series: 10,
            min_pattern_samples: 3,
            midday_slot: "12:00".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("weekday_record_limit", self.weekday_record_limit),
            ("overall_record_limit", self.overall_record_limit),
            ("recent_selection_pool", self.recent_selection_pool),
            ("max_selected_series", self.max_selected_series),
            ("min_pattern_samples", self.min_pattern_samples),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(SalesHistoryError::InvalidConfig(format!(
                    "{} must be at least 1",
                    name
                )));
            }
        }

        self.midday_index()?;
        Ok(())
    }

    pub fn midday_index(&self) -> Result<usize> {
        slot_index(&self.midday_slot).ok_or_else(|| {
            SalesHistoryError::InvalidConfig(format!(
                "midday_slot '{}' is not a time slot",
                self.midday_slot
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.midday_index().unwrap(), 14);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json(r#"{ "weekday_record_limit": 3 }"#).unwrap();
        assert_eq!(config.weekday_record_limit, 3);
        assert_eq!(config.overall_record_limit, 10);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AnalysisConfig::from_json(r#"{ "min_pattern_samples": 0 }"#),
            Err(SalesHistoryError::InvalidConfig(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_json(r#"{ "midday_slot": "12:15" }"#),
            Err(SalesHistoryError::InvalidConfig(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_json("not json"),
            Err(SalesHistoryError::SerializationError(_))
        ));
    }
}
