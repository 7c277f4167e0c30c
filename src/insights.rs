use crate::config::AnalysisConfig;
use crate::engine::{cumulative_with_cutoff, cutoff_index, peak_slot, peak_window};
use crate::schema::{ComparisonSeries, DailySales};
use crate::seasonality::morning_share;
use crate::time_grid::{slot_label, SalesVector, SLOT_COUNT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Today's figures as charted: raw per slot plus running totals that stop at
/// the last observed slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodaySeries {
    pub date: Option<NaiveDate>,
    pub raw: SalesVector,
    pub cumulative: [Option<f64>; SLOT_COUNT],
    pub cutoff: Option<usize>,
}

impl TodaySeries {
    pub fn new(raw: SalesVector, date: Option<NaiveDate>) -> Self {
        let cutoff = cutoff_index(&raw);
        Self {
            date,
            cumulative: cumulative_with_cutoff(&raw, cutoff),
            raw,
            cutoff,
        }
    }

    pub fn total_to_date(&self) -> f64 {
        self.raw.iter().sum()
    }
}

impl From<&DailySales> for TodaySeries {
    fn from(record: &DailySales) -> Self {
        Self::new(record.sales, Some(record.calendar_date()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKind {
    TotalToDate,
    /// Percent change against the comparison at the same slot.
    ChangeVsComparison,
    AveragePerActiveSlot,
    PeakSlot,
    PeakWindow,
    HistoricalDailyAverage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub kind: KpiKind,
    /// `None` renders as "not available".
    pub value: Option<f64>,
    pub detail: Option<String>,
}

impl Kpi {
    fn new(kind: KpiKind, value: Option<f64>, detail: Option<String>) -> Self {
        Self {
            kind,
            value,
            detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub kpis: Vec<Kpi>,
    pub insights: Vec<String>,
}

impl Summary {
    pub fn kpi(&self, kind: KpiKind) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.kind == kind)
    }
}

/// Percent change of today's running total against the comparison's running
/// total at today's cutoff. `None` when there is nothing to compare with.
pub fn change_vs_comparison(today: &TodaySeries, comparison: &ComparisonSeries) -> Option<f64> {
    let cutoff = today.cutoff?;
    let baseline = comparison.cumulative.get(cutoff).copied().flatten()?;
    if baseline == 0.0 {
        return None;
    }
    Some((today.total_to_date() - baseline) / baseline * 100.0)
}

pub fn summarize_kpis(
    today: &TodaySeries,
    comparison: Option<&ComparisonSeries>,
    history: &[DailySales],
    config: &AnalysisConfig,
) -> Summary {
    let total = today.total_to_date();
    let active_slots = today.raw.iter().filter(|v| **v != 0.0).count();
    let average_active = (active_slots > 0).then(|| total / active_slots as f64);
    let peak = peak_slot(&today.raw);
    let window = peak_window(&today.raw);
    let change = comparison.and_then(|c| change_vs_comparison(today, c));
    let historical_average = (!history.is_empty())
        .then(|| history.iter().map(|r| r.total_sales).sum::<f64>() / history.len() as f64);

    let kpis = vec![
        Kpi::new(KpiKind::TotalToDate, Some(total), None),
        Kpi::new(
            KpiKind::ChangeVsComparison,
            change,
            comparison.map(|c| c.label.clone()),
        ),
        Kpi::new(KpiKind::AveragePerActiveSlot, average_active, None),
        Kpi::new(
            KpiKind::PeakSlot,
            peak.map(|(_, v)| v),
            peak.and_then(|(i, _)| slot_label(i)).map(str::to_string),
        ),
        Kpi::new(
            KpiKind::PeakWindow,
            window.as_ref().map(|w| w.total),
            window.as_ref().map(|w| w.label.clone()),
        ),
        Kpi::new(
            KpiKind::HistoricalDailyAverage,
            historical_average,
            Some(format!("{} days", history.len())),
        ),
    ];

    let mut insights = Vec::new();

    if today.cutoff.is_none() {
        insights.push("No sales recorded yet today.".to_string());
    }

    if let Some((label, value)) = peak.and_then(|(i, v)| slot_label(i).map(|l| (l, v))) {
        insights.push(format!("Peak sales were at {} with {:.2}.", label, value));
    }

    if let Some(w) = &window {
        insights.push(format!(
            "The busiest two hours were {}, taking {:.2}.",
            w.label, w.total
        ));
    }

    if let (Some(pct), Some(c)) = (change, comparison) {
        let direction = if pct > 0.0 {
            "above"
        } else if pct < 0.0 {
            "below"
        } else {
            "in line with"
        };
        if pct == 0.0 {
            insights.push(format!(
                "Sales are {} {} at this point in the day.",
                direction, c.label
            ));
        } else {
            insights.push(format!(
                "Sales are {:.1}% {} {} at this point in the day.",
                pct.abs(),
                direction,
                c.label
            ));
        }
    }

    if let Ok(midday) = config.midday_index() {
        if let Some(share) = morning_share(&today.raw, midday) {
            insights.push(format!(
                "Morning (before {}) brought in {:.1}% of revenue, afternoon {:.1}%.",
                config.midday_slot,
                share * 100.0,
                (1.0 - share) * 100.0
            ));
        }
    }

    if let Some(avg) = historical_average {
        let days = if history.len() == 1 { "day" } else { "days" };
        insights.push(format!(
            "The historical daily average is {:.2} across {} {}.",
            avg,
            history.len(),
            days
        ));
    }

    Summary { kpis, insights }
}
