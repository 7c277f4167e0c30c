use crate::config::AnalysisConfig;
use crate::schema::DailySales;
use crate::seasonality::weekday_profile;
use crate::time_grid::{slot_end_label, slot_label, SalesVector, SLOT_COUNT};
use crate::utils::date_id;
use chrono::{Datelike, NaiveDate};
use log::info;
use serde::{Deserialize, Serialize};

/// Slots in the peak window (two hours).
pub const PEAK_WINDOW_SLOTS: usize = 4;

/// Index of the last slot with a nonzero figure, `None` if nothing sold yet.
pub fn cutoff_index(sales: &[f64]) -> Option<usize> {
    sales.iter().rposition(|v| *v != 0.0)
}

pub fn cumulative_sum(sales: &SalesVector) -> [Option<f64>; SLOT_COUNT] {
    cumulative_with_cutoff(sales, Some(SLOT_COUNT - 1))
}

/// Running totals through `cutoff`, `None` afterwards so charts stop at the
/// last observed slot. A `None` cutoff means nothing was observed.
pub fn cumulative_with_cutoff(
    sales: &SalesVector,
    cutoff: Option<usize>,
) -> [Option<f64>; SLOT_COUNT] {
    let mut out = [None; SLOT_COUNT];
    let Some(cutoff) = cutoff else {
        return out;
    };

    let mut running = 0.0;
    for (i, value) in sales.iter().enumerate().take(cutoff.min(SLOT_COUNT - 1) + 1) {
        running += value;
        out[i] = Some(running);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakWindow {
    pub start: usize,
    pub total: f64,
    /// e.g. `"10:00 - 12:00"`
    pub label: String,
}

/// The two-hour window with the highest takings. Windows start at slots 0
/// through 23, so the last slot of the day never opens or closes one. Ties go
/// to the earliest window. `None` for an empty day or fewer than four slots.
pub fn peak_window(sales: &[f64]) -> Option<PeakWindow> {
    if sales.len() < PEAK_WINDOW_SLOTS {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (start, window) in sales
        .windows(PEAK_WINDOW_SLOTS)
        .take(SLOT_COUNT - PEAK_WINDOW_SLOTS)
        .enumerate()
    {
        let total: f64 = window.iter().sum();
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((start, total)),
        }
    }

    let (start, total) = best.filter(|(_, total)| *total > 0.0)?;
    let label = format!(
        "{} - {}",
        slot_label(start)?,
        slot_end_label(start + PEAK_WINDOW_SLOTS - 1)?
    );
    Some(PeakWindow { start, total, label })
}

/// The single best slot and its value.
pub fn peak_slot(sales: &[f64]) -> Option<(usize, f64)> {
    sales
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
            Some((_, best_value)) if best_value >= v => best,
            _ => Some((i, v)),
        })
        .filter(|(_, v)| *v > 0.0)
}

/// Flat extrapolation of the observed average slot to the whole day.
pub fn run_rate_projection(sales: &SalesVector) -> f64 {
    let Some(cutoff) = cutoff_index(sales) else {
        return 0.0;
    };
    let sum_so_far: f64 = sales[..=cutoff].iter().sum();
    (sum_so_far / (cutoff + 1) as f64) * SLOT_COUNT as f64
}

/// Projects the unobserved slots from the weekday's historical shape, scaled
/// by how today compares with history over the slots seen so far.
pub fn weekday_pattern_projection(sales: &SalesVector, profile: &SalesVector) -> f64 {
    let Some(cutoff) = cutoff_index(sales) else {
        return 0.0;
    };
    let sum_so_far: f64 = sales[..=cutoff].iter().sum();
    let historical_so_far: f64 = profile[..=cutoff].iter().sum();

    let performance = if historical_so_far == 0.0 {
        1.0
    } else {
        sum_so_far / historical_so_far
    };

    let remaining: f64 = profile[cutoff + 1..].iter().map(|v| v * performance).sum();
    sum_so_far + remaining
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ProjectionMethod {
    WeekdayPattern { samples: usize },
    RunRate,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub total: f64,
    pub method: ProjectionMethod,
}

/// Estimates the full-day total for a partially elapsed day.
///
/// Uses the weekday pattern when at least `min_pattern_samples` earlier
/// records share the reference date's weekday, and the run-rate otherwise.
/// The reference date's own record never counts towards its baseline.
pub fn project_day_sales(
    sales: &SalesVector,
    history: &[DailySales],
    reference_date: NaiveDate,
    config: &AnalysisConfig,
) -> Projection {
    if cutoff_index(sales).is_none() {
        return Projection {
            total: 0.0,
            method: ProjectionMethod::NoData,
        };
    }

    let reference_id = date_id(reference_date);
    let profile = weekday_profile(history, reference_date.weekday(), Some(&reference_id))
        .filter(|(_, samples)| *samples >= config.min_pattern_samples);

    let projection = match profile {
        Some((profile, samples)) => Projection {
            total: weekday_pattern_projection(sales, &profile),
            method: ProjectionMethod::WeekdayPattern { samples },
        },
        None => Projection {
            total: run_rate_projection(sales),
            method: ProjectionMethod::RunRate,
        },
    };

    info!(
        "Projected {:.2} for {} using {:?}",
        projection.total, reference_id, projection.method
    );
    projection
}
