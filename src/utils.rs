use crate::schema::Cell;
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};

/// Serials below this count from 1899-12-31; from here on they count from
/// 1899-12-30 because spreadsheets treat 1900 as a leap year.
const LEAP_BUG_SERIAL: u64 = 60;

/// Resolves a date cell to a calendar date. `None` means "skip this record".
pub fn parse_sales_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Number(serial) => parse_date_serial(*serial),
        Cell::Text(text) => parse_date_text(text),
        Cell::Empty => None,
    }
}

/// Converts a spreadsheet day serial (1900 date system) to a calendar date.
///
/// Serial 0 is 1899-12-31 and serial 1 is 1900-01-01. Serial 60 is the
/// phantom 29 February 1900 and is rejected. Any time-of-day fraction is
/// dropped.
pub fn parse_date_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let days = serial.trunc() as u64;
    let base = match days.cmp(&LEAP_BUG_SERIAL) {
        std::cmp::Ordering::Less => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        std::cmp::Ordering::Equal => return None,
        std::cmp::Ordering::Greater => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };

    base.checked_add_days(Days::new(days))
        .filter(|date| date.year() <= 9999)
}

/// Parses textual dates: `DD/MM/YYYY` (also `.` or `-` delimited, 2-digit
/// years), `YYYY-MM-DD`, and RFC 3339 timestamps. An optional leading label
/// such as `Date:` and anything after the first whitespace are ignored.
///
/// Day-first is tried before month-first; a combination that does not form
/// a real calendar date is rejected rather than rolled over.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let token = strip_date_label(text).split_whitespace().next()?;

    let parts: Vec<&str> = token.split(|c| matches!(c, '/' | '.' | '-')).collect();
    if parts.len() == 3 {
        if let Some(numbers) = parse_numeric_parts(&parts) {
            return resolve_numeric_date(parts[0].len(), numbers);
        }
    }

    parse_generic_date(token)
}

fn strip_date_label(text: &str) -> &str {
    let text = text.trim();
    match text.split_once(':') {
        Some((label, rest))
            if !label.is_empty() && label.chars().all(|c| c.is_alphabetic() || c == ' ') =>
        {
            rest.trim()
        }
        _ => text,
    }
}

fn parse_numeric_parts(parts: &[&str]) -> Option<[u32; 3]> {
    let mut numbers = [0u32; 3];
    for (slot, part) in numbers.iter_mut().zip(parts) {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    Some(numbers)
}

fn resolve_numeric_date(first_width: usize, [a, b, c]: [u32; 3]) -> Option<NaiveDate> {
    if first_width == 4 {
        return NaiveDate::from_ymd_opt(a as i32, b, c);
    }

    let year = expand_year(c);
    NaiveDate::from_ymd_opt(year, b, a).or_else(|| NaiveDate::from_ymd_opt(year, a, b))
}

/// Two-digit years belong to the 2000s.
pub fn expand_year(year: u32) -> i32 {
    if year < 100 {
        2000 + year as i32
    } else {
        year as i32
    }
}

fn parse_generic_date(token: &str) -> Option<NaiveDate> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(token) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    NaiveDate::parse_from_str(token, "%Y-%m-%d").ok()
}

/// Degrade-to-zero amount parsing: blanks, junk, non-finite and negative
/// values all become 0. Comma thousands separators and a leading currency
/// symbol are accepted.
pub fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text
        .trim()
        .trim_start_matches(['£', '$', '€'])
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().map(sanitize_amount).unwrap_or(0.0)
}

pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

pub fn cell_amount(cell: Option<&Cell>) -> f64 {
    match cell {
        Some(Cell::Number(value)) => sanitize_amount(*value),
        Some(Cell::Text(text)) => parse_amount(text),
        Some(Cell::Empty) | None => 0.0,
    }
}

pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Canonical `YYYY-MM-DD` record id.
pub fn date_id(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Accepts full or abbreviated English names, case-insensitive.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    name.trim().parse::<Weekday>().ok()
}

/// Same month and day one year earlier; 29 February falls back to the 28th.
pub fn same_date_last_year(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(12))
}

/// The year-earlier date moved within its Monday-starting week onto the
/// same weekday as `date`.
pub fn same_weekday_last_year(date: NaiveDate) -> Option<NaiveDate> {
    let base = same_date_last_year(date)?;
    let target = date.weekday().num_days_from_monday();
    let current = base.weekday().num_days_from_monday();

    if target >= current {
        base.checked_add_days(Days::new(u64::from(target - current)))
    } else {
        base.checked_sub_days(Days::new(u64::from(current - target)))
    }
}

/// First and last calendar day of a month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first
        .checked_add_months(Months::new(1))?
        .checked_sub_days(Days::new(1))?;
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_first_dates() {
        assert_eq!(parse_date_text("01/03/2024"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date_text("1.3.2024"), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date_text("01-03-24"), Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn test_month_first_fallback() {
        // 13 cannot be a month, so the second reading is used
        assert_eq!(parse_date_text("03/13/2024"), Some(ymd(2024, 3, 13)));
    }

    #[test]
    fn test_rollover_rejected() {
        assert_eq!(parse_date_text("31/02/2024"), None);
        assert_eq!(parse_date_text("32/13/2024"), None);
        assert_eq!(parse_date_text("29/02/2023"), None);
    }

    #[test]
    fn test_non_integer_parts_rejected() {
        assert_eq!(parse_date_text("aa/bb/cccc"), None);
        assert_eq!(parse_date_text("not a date"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn test_iso_and_canonical_ids_round_trip() {
        let parsed = parse_date_text("2024-03-01").unwrap();
        assert_eq!(parsed, ymd(2024, 3, 1));
        assert_eq!(parse_date_text(&date_id(parsed)), Some(parsed));

        assert_eq!(
            parse_date_text("2024-03-01T00:00:00.000Z"),
            Some(ymd(2024, 3, 1))
        );
    }

    #[test]
    fn test_label_and_trailing_time_are_ignored() {
        assert_eq!(parse_date_text("Date: 02/03/2024"), Some(ymd(2024, 3, 2)));
        assert_eq!(parse_date_text("02/03/2024 00:00:00"), Some(ymd(2024, 3, 2)));
    }

    #[test]
    fn test_date_serials() {
        assert_eq!(parse_date_serial(0.0), Some(ymd(1899, 12, 31)));
        assert_eq!(parse_date_serial(1.0), Some(ymd(1900, 1, 1)));
        assert_eq!(parse_date_serial(59.0), Some(ymd(1900, 2, 28)));
        assert_eq!(parse_date_serial(60.0), None);
        assert_eq!(parse_date_serial(61.0), Some(ymd(1900, 3, 1)));
        assert_eq!(parse_date_serial(45292.0), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_date_serial(45352.75), Some(ymd(2024, 3, 1)));
        assert_eq!(parse_date_serial(-1.0), None);
        assert_eq!(parse_date_serial(f64::NAN), None);
        assert_eq!(parse_date_serial(1e12), None);
    }

    #[test]
    fn test_parse_sales_date_dispatches_on_cell() {
        assert_eq!(
            parse_sales_date(&Cell::Number(45352.0)),
            Some(ymd(2024, 3, 1))
        );
        assert_eq!(
            parse_sales_date(&Cell::Text("01/03/2024".to_string())),
            Some(ymd(2024, 3, 1))
        );
        assert_eq!(parse_sales_date(&Cell::Empty), None);
    }

    #[test]
    fn test_parse_amount_degrades_to_zero() {
        assert_eq!(parse_amount("12.5"), 12.5);
        assert_eq!(parse_amount(" 1,234.50 "), 1234.5);
        assert_eq!(parse_amount("£20"), 20.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("n/a"), 0.0);
        assert_eq!(parse_amount("-5"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
        assert_eq!(cell_amount(Some(&Cell::Number(f64::NAN))), 0.0);
        assert_eq!(cell_amount(None), 0.0);
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(weekday_name(ymd(2024, 3, 1).weekday()), "Friday");
        assert_eq!(parse_weekday("monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("Sun"), Some(Weekday::Sun));
        assert_eq!(parse_weekday("Someday"), None);
    }

    #[test]
    fn test_same_date_last_year() {
        assert_eq!(same_date_last_year(ymd(2024, 3, 1)), Some(ymd(2023, 3, 1)));
        assert_eq!(same_date_last_year(ymd(2024, 2, 29)), Some(ymd(2023, 2, 28)));
    }

    #[test]
    fn test_same_weekday_last_year() {
        // Friday 2024-03-01 -> Wednesday 2023-03-01 -> Friday 2023-03-03
        let shifted = same_weekday_last_year(ymd(2024, 3, 1)).unwrap();
        assert_eq!(shifted, ymd(2023, 3, 3));
        assert_eq!(shifted.weekday(), Weekday::Fri);

        // Monday 2024-03-04 -> Saturday 2023-03-04 -> Monday 2023-02-27
        let shifted = same_weekday_last_year(ymd(2024, 3, 4)).unwrap();
        assert_eq!(shifted, ymd(2023, 2, 27));
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(2024, 2),
            Some((ymd(2024, 2, 1), ymd(2024, 2, 29)))
        );
        assert_eq!(
            month_bounds(2023, 12),
            Some((ymd(2023, 12, 1), ymd(2023, 12, 31)))
        );
        assert_eq!(month_bounds(2023, 13), None);
    }
}
