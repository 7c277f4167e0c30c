//! Historical baselines to overlay on today's series.
//!
//! Every comparison is a [`ComparisonMode`] variant dispatched by
//! [`build_comparison`]. A query that matches nothing returns
//! [`SalesHistoryError::NoComparisonData`] with a readable reason; a zero
//! series is never made up.

use crate::config::AnalysisConfig;
use crate::engine::cumulative_sum;
use crate::error::{Result, SalesHistoryError};
use crate::schema::{ComparisonSeries, DailySales, SeriesStyle};
use crate::seasonality::average_profile;
use crate::utils::{date_id, month_bounds, same_date_last_year, same_weekday_last_year, weekday_name};
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use log::warn;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeFilter {
    #[default]
    All,
    ThisMonth,
    LastMonth,
    Last3Months,
    Last6Months,
    Last12Months,
    ThisYear,
    LastYear,
}

impl DateRangeFilter {
    /// Whether `date` falls in the range, relative to `reference`.
    pub fn contains(&self, date: NaiveDate, reference: NaiveDate) -> bool {
        match self {
            DateRangeFilter::All => true,
            DateRangeFilter::ThisMonth => {
                date.year() == reference.year() && date.month() == reference.month()
            }
            DateRangeFilter::LastMonth => reference
                .checked_sub_months(Months::new(1))
                .and_then(|prev| month_bounds(prev.year(), prev.month()))
                .is_some_and(|(first, last)| first <= date && date <= last),
            DateRangeFilter::Last3Months => within_months(date, reference, 3),
            DateRangeFilter::Last6Months => within_months(date, reference, 6),
            DateRangeFilter::Last12Months => within_months(date, reference, 12),
            DateRangeFilter::ThisYear => date.year() == reference.year(),
            DateRangeFilter::LastYear => date.year() == reference.year() - 1,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            DateRangeFilter::All => "all time",
            DateRangeFilter::ThisMonth => "this month",
            DateRangeFilter::LastMonth => "last month",
            DateRangeFilter::Last3Months => "the last 3 months",
            DateRangeFilter::Last6Months => "the last 6 months",
            DateRangeFilter::Last12Months => "the last 12 months",
            DateRangeFilter::ThisYear => "this year",
            DateRangeFilter::LastYear => "last year",
        }
    }
}

fn within_months(date: NaiveDate, reference: NaiveDate, months: u32) -> bool {
    reference
        .checked_sub_months(Months::new(months))
        .is_some_and(|start| start <= date && date <= reference)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrder {
    Highest,
    Lowest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ComparisonMode {
    WeekdayAverage {
        weekday: Weekday,
        #[serde(default)]
        range: DateRangeFilter,
    },
    WeekdayRecordHigh,
    WeekdayRecordLow,
    OverallRecordHigh {
        #[serde(default)]
        selected: Vec<String>,
    },
    OverallRecordLow {
        #[serde(default)]
        selected: Vec<String>,
    },
    SpecificDates {
        ids: Vec<String>,
    },
    SameDayLastWeek,
    SameDateLastYear,
    SameWeekdayLastYear,
}

impl ComparisonMode {
    pub fn title(&self) -> String {
        match self {
            ComparisonMode::WeekdayAverage { weekday, range } => {
                format!("Average {} ({})", weekday_name(*weekday), range.describe())
            }
            ComparisonMode::WeekdayRecordHigh => "Weekday record highs".to_string(),
            ComparisonMode::WeekdayRecordLow => "Weekday record lows".to_string(),
            ComparisonMode::OverallRecordHigh { .. } => "Record highs".to_string(),
            ComparisonMode::OverallRecordLow { .. } => "Record lows".to_string(),
            ComparisonMode::SpecificDates { .. } => "Specific dates".to_string(),
            ComparisonMode::SameDayLastWeek => "Same day last week".to_string(),
            ComparisonMode::SameDateLastYear => "Same date last year".to_string(),
            ComparisonMode::SameWeekdayLastYear => "Same weekday last year".to_string(),
        }
    }
}

/// Builds the baseline series for `mode`.
///
/// Record modes return at most the configured number of series. An empty
/// selection in the overall record modes means "the top N".
pub fn build_comparison(
    mode: &ComparisonMode,
    history: &[DailySales],
    reference_date: NaiveDate,
    config: &AnalysisConfig,
) -> Result<Vec<ComparisonSeries>> {
    let outcome = match mode {
        ComparisonMode::WeekdayAverage { weekday, range } => {
            weekday_average(history, *weekday, *range, reference_date)
        }
        ComparisonMode::WeekdayRecordHigh => {
            weekday_records(history, reference_date, RecordOrder::Highest, config)
        }
        ComparisonMode::WeekdayRecordLow => {
            weekday_records(history, reference_date, RecordOrder::Lowest, config)
        }
        ComparisonMode::OverallRecordHigh { selected } => {
            overall_records(history, RecordOrder::Highest, selected, config)
        }
        ComparisonMode::OverallRecordLow { selected } => {
            overall_records(history, RecordOrder::Lowest, selected, config)
        }
        ComparisonMode::SpecificDates { ids } => specific_dates(history, ids, config),
        ComparisonMode::SameDayLastWeek => {
            let target = reference_date.checked_sub_days(Days::new(7));
            offset_lookup(history, target, "Last Week", "the same day last week")
        }
        ComparisonMode::SameDateLastYear => offset_lookup(
            history,
            same_date_last_year(reference_date),
            "Same Date Last Year",
            "the same date last year",
        ),
        ComparisonMode::SameWeekdayLastYear => offset_lookup(
            history,
            same_weekday_last_year(reference_date),
            "Same Weekday Last Year",
            "the same weekday last year",
        ),
    };

    if let Err(e) = &outcome {
        warn!("Comparison '{}' produced no series: {}", mode.title(), e);
    }
    outcome
}

/// Every record ranked by total, for manual record selection. Ties keep the
/// history's order.
pub fn record_candidates(history: &[DailySales], order: RecordOrder) -> Vec<&DailySales> {
    ranked(history.iter().collect(), order)
}

/// The `pool` most recent records, newest first, for specific-date selection.
pub fn recent_candidates(history: &[DailySales], pool: usize) -> Vec<&DailySales> {
    let mut recent: Vec<&DailySales> = history.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(pool);
    recent
}

fn ranked(mut records: Vec<&DailySales>, order: RecordOrder) -> Vec<&DailySales> {
    records.sort_by(|a, b| {
        let cmp = a
            .total_sales
            .partial_cmp(&b.total_sales)
            .unwrap_or(Ordering::Equal);
        match order {
            RecordOrder::Highest => cmp.reverse(),
            RecordOrder::Lowest => cmp,
        }
    });
    records
}

fn record_series(record: &DailySales, label: String) -> ComparisonSeries {
    ComparisonSeries {
        label,
        style: SeriesStyle::Solid,
        cumulative: cumulative_sum(&record.sales),
        raw: record.sales,
    }
}

fn dated_label(record: &DailySales) -> String {
    format!("{} ({})", record.id, record.day_of_week)
}

fn weekday_average(
    history: &[DailySales],
    weekday: Weekday,
    range: DateRangeFilter,
    reference_date: NaiveDate,
) -> Result<Vec<ComparisonSeries>> {
    let profile = average_profile(
        history
            .iter()
            .filter(|r| r.weekday() == weekday)
            .filter(|r| range.contains(r.calendar_date(), reference_date)),
    )
    .ok_or_else(|| {
        SalesHistoryError::NoComparisonData(format!(
            "{} in {}",
            weekday_name(weekday),
            range.describe()
        ))
    })?;

    Ok(vec![ComparisonSeries {
        label: format!("Average {}", weekday_name(weekday)),
        style: SeriesStyle::Dashed,
        cumulative: cumulative_sum(&profile),
        raw: profile,
    }])
}

fn weekday_records(
    history: &[DailySales],
    reference_date: NaiveDate,
    order: RecordOrder,
    config: &AnalysisConfig,
) -> Result<Vec<ComparisonSeries>> {
    let weekday = reference_date.weekday();
    let matching: Vec<&DailySales> = history.iter().filter(|r| r.weekday() == weekday).collect();

    let series: Vec<ComparisonSeries> = ranked(matching, order)
        .into_iter()
        .take(config.weekday_record_limit)
        .map(|r| record_series(r, dated_label(r)))
        .collect();

    if series.is_empty() {
        return Err(SalesHistoryError::NoComparisonData(format!(
            "previous {}s",
            weekday_name(weekday)
        )));
    }
    Ok(series)
}

fn overall_records(
    history: &[DailySales],
    order: RecordOrder,
    selected: &[String],
    config: &AnalysisConfig,
) -> Result<Vec<ComparisonSeries>> {
    let candidates = record_candidates(history, order);

    let chosen: Vec<&DailySales> = if selected.is_empty() {
        candidates
            .into_iter()
            .take(config.overall_record_limit)
            .collect()
    } else {
        candidates
            .into_iter()
            .filter(|r| selected.contains(&r.id))
            .take(config.max_selected_series)
            .collect()
    };

    if chosen.is_empty() {
        let reason = if history.is_empty() {
            "record days: history is empty"
        } else {
            "record days: none of the selected dates are in the history"
        };
        return Err(SalesHistoryError::NoComparisonData(reason.to_string()));
    }

    Ok(chosen
        .into_iter()
        .map(|r| record_series(r, dated_label(r)))
        .collect())
}

fn specific_dates(
    history: &[DailySales],
    ids: &[String],
    config: &AnalysisConfig,
) -> Result<Vec<ComparisonSeries>> {
    if ids.is_empty() {
        return Err(SalesHistoryError::NoComparisonData(
            "specific dates: no dates selected".to_string(),
        ));
    }

    let series: Vec<ComparisonSeries> = ids
        .iter()
        .filter_map(|id| history.iter().find(|r| &r.id == id))
        .take(config.max_selected_series)
        .map(|r| record_series(r, dated_label(r)))
        .collect();

    if series.is_empty() {
        return Err(SalesHistoryError::NoComparisonData(format!(
            "the selected dates ({})",
            ids.join(", ")
        )));
    }
    Ok(series)
}

fn offset_lookup(
    history: &[DailySales],
    target: Option<NaiveDate>,
    label: &str,
    description: &str,
) -> Result<Vec<ComparisonSeries>> {
    let Some(target) = target else {
        return Err(SalesHistoryError::NoComparisonData(description.to_string()));
    };

    let id = date_id(target);
    history
        .iter()
        .find(|r| r.id == id)
        .map(|r| vec![record_series(r, format!("{} ({})", label, id))])
        .ok_or_else(|| SalesHistoryError::NoComparisonData(format!("{} ({})", description, id)))
}
