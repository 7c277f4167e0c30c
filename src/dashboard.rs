//! Application state for one owner's sales dashboard.
//!
//! The dashboard owns what the user has loaded and selected; every analysis
//! call passes that state explicitly to the pure functions in the other
//! modules.

use crate::comparison::{
    build_comparison, recent_candidates, record_candidates, ComparisonMode, RecordOrder,
};
use crate::config::AnalysisConfig;
use crate::engine::{project_day_sales, Projection};
use crate::error::{Result, SalesHistoryError};
use crate::ingestion::{ingest_table, normalize_row, IngestionSummary};
use crate::insights::{summarize_kpis, Summary, TodaySeries};
use crate::report::parse_free_text_report;
use crate::schema::{Cell, ComparisonSeries, DailySales, OwnerId, SalesTable};
use crate::seasonality::{weekday_heatmap, WeekdayHeatmap};
use crate::store::SalesStore;
use crate::utils::parse_sales_date;
use chrono::NaiveDate;
use log::{debug, info};

/// Everything a renderer needs for one refresh.
#[derive(Debug)]
pub struct DashboardView {
    pub reference_date: NaiveDate,
    pub today: TodaySeries,
    /// `Err` carries the reason the chart should show an empty state.
    pub comparison: Result<Vec<ComparisonSeries>>,
    pub projection: Projection,
    pub summary: Summary,
    pub heatmap: WeekdayHeatmap,
}

impl DashboardView {
    /// The series KPIs are measured against.
    pub fn primary_comparison(&self) -> Option<&ComparisonSeries> {
        self.comparison.as_ref().ok().and_then(|series| series.first())
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    owner: OwnerId,
    config: AnalysisConfig,
    history: Vec<DailySales>,
    today: Option<DailySales>,
    mode: Option<ComparisonMode>,
}

impl Dashboard {
    pub fn new(owner: OwnerId, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            owner,
            config,
            history: Vec::new(),
            today: None,
            mode: None,
        })
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn history(&self) -> &[DailySales] {
        &self.history
    }

    pub fn today(&self) -> Option<&DailySales> {
        self.today.as_ref()
    }

    pub fn mode(&self) -> Option<&ComparisonMode> {
        self.mode.as_ref()
    }

    pub fn load_history(&mut self, store: &dyn SalesStore) -> Result<usize> {
        self.history = store.load_all(&self.owner)?;
        info!(
            "Loaded {} historical records for owner {}",
            self.history.len(),
            self.owner
        );
        Ok(self.history.len())
    }

    /// Normalizes and persists an uploaded sheet as one batch, then reloads
    /// the history so the new days are visible.
    pub fn upload_table(
        &mut self,
        store: &dyn SalesStore,
        table: &SalesTable,
    ) -> Result<IngestionSummary> {
        let summary = upload_table(store, &self.owner, table)?;
        self.load_history(store)?;
        Ok(summary)
    }

    /// Sets today's figures from a pasted report. The report's own date line
    /// wins over `selected_date`.
    pub fn set_today_from_report(
        &mut self,
        text: &str,
        selected_date: Option<NaiveDate>,
    ) -> Result<&DailySales> {
        let record = parse_free_text_report(text).into_daily_sales(selected_date)?;
        debug!("Today's sales set from report for {}", record.id);
        Ok(self.today.insert(record))
    }

    /// Sets today's figures from one spreadsheet row. A row without a usable
    /// date is `MissingDate`; a dated row with no sales is `NoSalesData`.
    pub fn set_today_from_row(&mut self, header: &[String], row: &[Cell]) -> Result<&DailySales> {
        if row.first().and_then(parse_sales_date).is_none() {
            return Err(SalesHistoryError::MissingDate);
        }
        let record = normalize_row(header, row).ok_or(SalesHistoryError::NoSalesData)?;
        Ok(self.today.insert(record))
    }

    /// Ranked days offered when picking records by hand.
    pub fn record_choices(&self, order: RecordOrder) -> Vec<&DailySales> {
        record_candidates(&self.history, order)
    }

    /// The most recent days offered when picking specific dates.
    pub fn recent_choices(&self) -> Vec<&DailySales> {
        recent_candidates(&self.history, self.config.recent_selection_pool)
    }

    pub fn set_mode(&mut self, mode: ComparisonMode) {
        self.mode = Some(mode);
    }

    pub fn clear_mode(&mut self) {
        self.mode = None;
    }

    /// Computes the full view for `reference_date`.
    ///
    /// Fails only when today's figures are missing; an empty comparison is
    /// reported inside the view.
    pub fn analyze(&self, reference_date: NaiveDate) -> Result<DashboardView> {
        let today_record = self.today.as_ref().ok_or(SalesHistoryError::NoTodayData)?;
        let today = TodaySeries::new(today_record.sales, Some(reference_date));

        let comparison = match &self.mode {
            Some(mode) => build_comparison(mode, &self.history, reference_date, &self.config),
            None => Ok(Vec::new()),
        };

        let projection =
            project_day_sales(&today.raw, &self.history, reference_date, &self.config);
        let primary = comparison.as_ref().ok().and_then(|series| series.first());
        let summary = summarize_kpis(&today, primary, &self.history, &self.config);

        Ok(DashboardView {
            reference_date,
            today,
            comparison,
            projection,
            summary,
            heatmap: weekday_heatmap(&self.history),
        })
    }

    /// Forgets loaded history, today's figures and the selected mode.
    pub fn reset(&mut self) {
        self.history.clear();
        self.today = None;
        self.mode = None;
    }
}

/// Normalizes a sheet and writes every resulting record in one atomic batch.
pub fn upload_table(
    store: &dyn SalesStore,
    owner: &OwnerId,
    table: &SalesTable,
) -> Result<IngestionSummary> {
    let summary = ingest_table(table)?;
    let saved = store.upsert_batch(owner, &summary.records)?;
    info!("Successfully processed and saved {} records", saved);
    Ok(summary)
}
