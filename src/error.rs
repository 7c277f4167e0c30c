use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesHistoryError {
    #[error("Spreadsheet is empty or invalid: expected a header row and at least one data row")]
    EmptyTable,

    #[error("No valid data rows found ({skipped} rows skipped)")]
    NoValidRows { skipped: usize },

    #[error("No parseable sales data found in report")]
    NoSalesData,

    #[error("Report has no date line and no date was selected")]
    MissingDate,

    #[error("No data for {0}")]
    NoComparisonData(String),

    #[error("Today's sales have not been entered")]
    NoTodayData,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid sales record: {0}")]
    InvalidRecord(String),

    #[error("Sales store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SalesHistoryError>;
