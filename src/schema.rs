use crate::time_grid::{SalesVector, SLOT_COUNT};
use crate::utils::{date_id, parse_weekday, utc_midnight, weekday_name};
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One tokenized spreadsheet cell as delivered by the upload transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Cell {
    #[schemars(description = "A numeric cell; in the date column this is a 1900-system day serial")]
    Number(f64),

    #[schemars(description = "Free text, e.g. a DD/MM/YYYY date or a formatted amount")]
    Text(String),

    #[schemars(description = "A blank cell")]
    Empty,
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// A tokenized sheet: the header row (first label is the date column) and the
/// data rows (first cell is the date).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SalesTable {
    /// Splits the first row off as the header. Header cells are rendered as
    /// text and trimmed.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let header = rows
            .remove(0)
            .into_iter()
            .map(|cell| match cell {
                Cell::Text(text) => text.trim().to_string(),
                Cell::Number(value) => value.to_string(),
                Cell::Empty => String::new(),
            })
            .collect();
        Self { header, rows }
    }
}

/// Opaque identity of the data owner. Trusted, never validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One calendar day of half-hourly sales, as persisted per owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    #[schemars(description = "Calendar date in YYYY-MM-DD form; unique per owner")]
    pub id: String,

    #[schemars(description = "UTC midnight of the calendar date")]
    pub date: DateTime<Utc>,

    #[schemars(description = "English weekday name of the date in UTC, e.g. 'Friday'")]
    pub day_of_week: String,

    #[schemars(description = "28 non-negative half-hourly figures, 05:00 through 18:30")]
    pub sales: SalesVector,

    #[schemars(description = "Sum of all 28 figures")]
    pub total_sales: f64,
}

impl DailySales {
    /// Builds a record from a date and an aligned vector. Returns `None` when
    /// the day has no sales, since such days are never kept.
    pub fn new(date: NaiveDate, sales: SalesVector) -> Option<Self> {
        let total_sales: f64 = sales.iter().sum();
        if total_sales == 0.0 {
            return None;
        }

        Some(Self {
            id: date_id(date),
            date: utc_midnight(date),
            day_of_week: weekday_name(date.weekday()).to_string(),
            sales,
            total_sales,
        })
    }

    pub fn calendar_date(&self) -> NaiveDate {
        self.date.date_naive()
    }

    pub fn weekday(&self) -> Weekday {
        parse_weekday(&self.day_of_week).unwrap_or_else(|| self.calendar_date().weekday())
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DailySales)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::json_schema())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    Solid,
    Dashed,
}

/// A derived overlay series. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSeries {
    pub label: String,
    pub style: SeriesStyle,
    /// Running totals; `None` marks slots with no value to draw.
    pub cumulative: [Option<f64>; SLOT_COUNT],
    pub raw: SalesVector,
}
