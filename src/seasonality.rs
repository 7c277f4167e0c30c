use crate::schema::DailySales;
use crate::time_grid::{SalesVector, SLOT_COUNT};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Per-slot mean of the given records, each slot averaged independently.
pub fn average_profile<'a, I>(records: I) -> Option<SalesVector>
where
    I: IntoIterator<Item = &'a DailySales>,
{
    let mut sums = [0.0; SLOT_COUNT];
    let mut count = 0usize;

    for record in records {
        for (sum, value) in sums.iter_mut().zip(record.sales.iter()) {
            *sum += value;
        }
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(sums.map(|sum| sum / count as f64))
}

/// Average intraday shape for one weekday, with the number of days it was
/// built from. `exclude_id` keeps a day out of its own baseline.
pub fn weekday_profile(
    history: &[DailySales],
    weekday: Weekday,
    exclude_id: Option<&str>,
) -> Option<(SalesVector, usize)> {
    let matching: Vec<&DailySales> = history
        .iter()
        .filter(|r| r.weekday() == weekday)
        .filter(|r| exclude_id != Some(r.id.as_str()))
        .collect();

    average_profile(matching.iter().copied()).map(|profile| (profile, matching.len()))
}

/// Weekday × slot averages for the heatmap view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayHeatmap {
    /// Monday first. Weekdays without history are all zero.
    pub rows: [SalesVector; 7],
    pub sample_counts: [usize; 7],
}

impl WeekdayHeatmap {
    pub fn row(&self, weekday: Weekday) -> &SalesVector {
        &self.rows[weekday.num_days_from_monday() as usize]
    }

    /// Largest cell, for scaling the colour ramp.
    pub fn max_value(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .fold(0.0, |acc: f64, v| acc.max(*v))
    }
}

pub fn weekday_heatmap(history: &[DailySales]) -> WeekdayHeatmap {
    let mut rows = [[0.0; SLOT_COUNT]; 7];
    let mut sample_counts = [0usize; 7];

    for (idx, weekday) in WEEKDAYS.iter().enumerate() {
        if let Some((profile, samples)) = weekday_profile(history, *weekday, None) {
            rows[idx] = profile;
            sample_counts[idx] = samples;
        }
    }

    WeekdayHeatmap {
        rows,
        sample_counts,
    }
}

/// Fraction of the day's revenue taken before `midday_index`.
pub fn morning_share(sales: &[f64], midday_index: usize) -> Option<f64> {
    let total: f64 = sales.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let split = midday_index.min(sales.len());
    let morning: f64 = sales[..split].iter().sum();
    Some(morning / total)
}
