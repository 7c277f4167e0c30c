//! Parser for pasted point-of-sale reports.
//!
//! A report is line oriented. Sales lines look like
//! `05:00 - 05:30 Net Sales £1,234.50`: a start time, an end time, free text,
//! and a trailing amount. A negative amount (a refund) counts as 0. One line may carry the report date, optionally
//! labelled (`Date: 02/03/2024`). Everything else is ignored.

use crate::error::{Result, SalesHistoryError};
use crate::schema::DailySales;
use crate::time_grid::{slot_index_for_time, SalesVector, SLOT_COUNT};
use crate::utils::{expand_year, parse_amount};
use chrono::NaiveDate;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static DATE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[A-Za-z][A-Za-z ]*:?\s*)?(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{2}|\d{4})\s*$")
        .expect("valid date line regex")
});

static SALES_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2}:\d{2})\s*-\s*\d{1,2}:\d{2}.*?(-?[£$€]?\d[\d,]*(?:\.\d+)?)\s*$")
        .expect("valid sales line regex")
});

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReport {
    /// `None` when no sales line produced a figure.
    pub sales: Option<SalesVector>,
    /// `None` when the report has no valid date line.
    pub date: Option<NaiveDate>,
}

impl ParsedReport {
    /// Turns the report into a record, preferring the report's own date over
    /// `fallback_date`.
    pub fn into_daily_sales(self, fallback_date: Option<NaiveDate>) -> Result<DailySales> {
        let sales = self.sales.ok_or(SalesHistoryError::NoSalesData)?;
        let date = self
            .date
            .or(fallback_date)
            .ok_or(SalesHistoryError::MissingDate)?;
        DailySales::new(date, sales).ok_or(SalesHistoryError::NoSalesData)
    }
}

pub fn parse_free_text_report(text: &str) -> ParsedReport {
    let mut sales = [0.0; SLOT_COUNT];
    let mut date = None;

    for line in text.lines() {
        if let Some(caps) = DATE_LINE_RE.captures(line) {
            if date.is_none() {
                date = report_date(&caps[1], &caps[2], &caps[3]);
                if date.is_none() {
                    debug!("Discarding invalid report date line '{}'", line.trim());
                }
            }
            continue;
        }

        let Some(caps) = SALES_LINE_RE.captures(line) else {
            continue;
        };
        match slot_index_for_time(&caps[1]) {
            Some(slot) => sales[slot] = parse_amount(&caps[2]),
            None => debug!("Ignoring report line outside the time grid: '{}'", line.trim()),
        }
    }

    let total: f64 = sales.iter().sum();
    ParsedReport {
        sales: (total > 0.0).then_some(sales),
        date,
    }
}

fn report_date(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let year: u32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(expand_year(year), month, day)
}
