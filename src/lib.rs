//! # Sales History Engine
//!
//! A library for normalizing half-hourly sales reports into daily vectors and
//! comparing a partially elapsed day against historical baselines.
//!
//! ## Core Concepts
//!
//! - **Time Grid**: 28 half-hour slots from 05:00 to 18:30 that every vector aligns to
//! - **DailySales**: One calendar day's slot figures, total and weekday, keyed by `YYYY-MM-DD`
//! - **Ingestion**: Spreadsheet rows and pasted text reports are normalized onto the grid;
//!   dateless and all-zero days are skipped, bad cells count as zero
//! - **Comparisons**: Weekday averages, record days, specific dates and offset lookups
//!   overlaid on today's running total
//! - **Projection**: Run-rate or weekday-pattern estimate of the full day
//!
//! ## Example
//!
//! ```rust,ignore
//! use sales_history_engine::*;
//! use chrono::{NaiveDate, Weekday};
//!
//! let store = InMemorySalesStore::new();
//! let mut dashboard = Dashboard::new(OwnerId::new("shop-1"), AnalysisConfig::default())?;
//!
//! let table = SalesTable {
//!     header: vec!["Date".into(), "05:00".into(), "05:30".into()],
//!     rows: vec![vec![Cell::from("04/03/2024"), Cell::from("10"), Cell::from("20")]],
//! };
//! dashboard.upload_table(&store, &table)?;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
//! dashboard.set_today_from_report("05:00 - 05:30 Net Sales 15.00", Some(today))?;
//! dashboard.set_mode(ComparisonMode::WeekdayAverage {
//!     weekday: Weekday::Mon,
//!     range: DateRangeFilter::All,
//! });
//!
//! let view = dashboard.analyze(today)?;
//! for insight in &view.summary.insights {
//!     println!("{}", insight);
//! }
//! ```

pub mod comparison;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod insights;
pub mod report;
pub mod schema;
pub mod seasonality;
pub mod store;
pub mod time_grid;
pub mod utils;

pub use comparison::{
    build_comparison, recent_candidates, record_candidates, ComparisonMode, DateRangeFilter,
    RecordOrder,
};
pub use config::AnalysisConfig;
pub use dashboard::{upload_table, Dashboard, DashboardView};
pub use engine::{
    cumulative_sum, cumulative_with_cutoff, cutoff_index, peak_slot, peak_window,
    project_day_sales, run_rate_projection, weekday_pattern_projection, PeakWindow, Projection,
    ProjectionMethod,
};
pub use error::{Result, SalesHistoryError};
pub use ingestion::{ingest_table, normalize_row, IngestionSummary};
pub use insights::{change_vs_comparison, summarize_kpis, Kpi, KpiKind, Summary, TodaySeries};
pub use report::{parse_free_text_report, ParsedReport};
pub use schema::*;
pub use seasonality::{average_profile, morning_share, weekday_heatmap, weekday_profile, WeekdayHeatmap};
pub use store::{InMemorySalesStore, SalesStore};
pub use time_grid::*;
pub use utils::{parse_date_serial, parse_date_text, parse_sales_date};
