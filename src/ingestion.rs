use crate::error::{Result, SalesHistoryError};
use crate::schema::{Cell, DailySales, SalesTable};
use crate::time_grid::{slot_index, SLOT_COUNT};
use crate::utils::{cell_amount, parse_sales_date};
use log::{debug, info};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct IngestionSummary {
    /// Normalized records, one per distinct date, ordered by id.
    pub records: Vec<DailySales>,
    /// Rows dropped as dateless, unparsable or all-zero.
    pub skipped_rows: usize,
}

/// Aligns one data row onto the time grid.
///
/// The first header label and the first cell are the date column; the rest of
/// the header names the slot each cell belongs to. Returns `None` for rows
/// without a usable date and for rows whose figures sum to zero. Cells that
/// do not parse as numbers count as 0.
pub fn normalize_row(header: &[String], row: &[Cell]) -> Option<DailySales> {
    let date_cell = row.first().filter(|cell| !cell.is_blank())?;
    let Some(date) = parse_sales_date(date_cell) else {
        debug!("Skipping row with unparsable date {:?}", date_cell);
        return None;
    };

    let mut sales = [0.0; SLOT_COUNT];
    for (column, label) in header.iter().enumerate().skip(1) {
        match slot_index(label.trim()) {
            Some(slot) => sales[slot] = cell_amount(row.get(column)),
            None => debug!("Ignoring column '{}': not a time slot", label),
        }
    }

    let record = DailySales::new(date, sales);
    if record.is_none() {
        debug!("Skipping {}: no sales recorded", date);
    }
    record
}

/// Normalizes every data row of a table.
///
/// Fails with [`SalesHistoryError::EmptyTable`] when there is no data row and
/// with [`SalesHistoryError::NoValidRows`] when every row was skipped. When two
/// rows carry the same date the later row wins.
pub fn ingest_table(table: &SalesTable) -> Result<IngestionSummary> {
    if table.header.is_empty() || table.rows.is_empty() {
        return Err(SalesHistoryError::EmptyTable);
    }

    let mut by_id: BTreeMap<String, DailySales> = BTreeMap::new();
    let mut skipped_rows = 0;

    for row in &table.rows {
        match normalize_row(&table.header, row) {
            Some(record) => {
                by_id.insert(record.id.clone(), record);
            }
            None => skipped_rows += 1,
        }
    }

    if by_id.is_empty() {
        return Err(SalesHistoryError::NoValidRows { skipped: skipped_rows });
    }

    info!(
        "Processed {} records, skipped {} rows",
        by_id.len(),
        skipped_rows
    );

    Ok(IngestionSummary {
        records: by_id.into_values().collect(),
        skipped_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    #[test]
    fn test_normalize_row_aligns_slots() {
        let header = header(&["Date", "05:00", "05:30", "06:00"]);
        let record = normalize_row(&header, &row(&["01/03/2024", "10", "20", "5"])).unwrap();

        assert_eq!(record.id, "2024-03-01");
        assert_eq!(record.day_of_week, "Friday");
        assert_eq!(record.sales[0], 10.0);
        assert_eq!(record.sales[1], 20.0);
        assert_eq!(record.sales[2], 5.0);
        assert!(record.sales[3..].iter().all(|v| *v == 0.0));
        assert!((record.total_sales - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_order_and_unknown_columns() {
        let header = header(&["Date", "18:30", "Total", " 12:00 ", "04:30"]);
        let record =
            normalize_row(&header, &row(&["02/03/2024", "7", "999", "3", "50"])).unwrap();

        assert_eq!(record.sales[27], 7.0);
        assert_eq!(record.sales[14], 3.0);
        assert!((record.total_sales - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_bad_cells_degrade_to_zero() {
        let header = header(&["Date", "05:00", "05:30", "06:00"]);
        let record = normalize_row(&header, &row(&["01/03/2024", "abc", "", "4"])).unwrap();

        assert_eq!(record.sales[0], 0.0);
        assert_eq!(record.sales[1], 0.0);
        assert_eq!(record.sales[2], 4.0);
    }

    #[test]
    fn test_short_rows_are_padded_with_zero() {
        let header = header(&["Date", "05:00", "05:30"]);
        let record = normalize_row(&header, &row(&["01/03/2024", "8"])).unwrap();
        assert_eq!(record.total_sales, 8.0);
    }

    #[test]
    fn test_invalid_rows_are_discarded() {
        let header = header(&["Date", "05:00"]);
        assert!(normalize_row(&header, &row(&["31/02/2024", "10"])).is_none());
        assert!(normalize_row(&header, &row(&["", "10"])).is_none());
        assert!(normalize_row(&header, &row(&["01/03/2024", "0"])).is_none());
        assert!(normalize_row(&header, &[]).is_none());
    }

    #[test]
    fn test_serial_date_cells() {
        let header = header(&["Date", "05:00"]);
        let record = normalize_row(&header, &[Cell::Number(45352.0), Cell::Number(12.0)]).unwrap();
        assert_eq!(record.id, "2024-03-01");
    }

    #[test]
    fn test_ingest_table_counts_skips() {
        let table = SalesTable {
            header: header(&["Date", "05:00", "05:30"]),
            rows: vec![
                row(&["01/03/2024", "10", "20"]),
                row(&["", "1", "1"]),
                row(&["02/03/2024", "0", "0"]),
                row(&["03/03/2024", "5", ""]),
            ],
        };

        let summary = ingest_table(&table).unwrap();
        assert_eq!(summary.records.len(), 2);
        assert_eq!(summary.skipped_rows, 2);
        assert_eq!(summary.records[0].id, "2024-03-01");
        assert_eq!(summary.records[1].id, "2024-03-03");
    }

    #[test]
    fn test_ingest_table_later_duplicate_wins() {
        let table = SalesTable {
            header: header(&["Date", "05:00"]),
            rows: vec![row(&["01/03/2024", "10"]), row(&["01/03/2024", "30"])],
        };

        let summary = ingest_table(&table).unwrap();
        assert_eq!(summary.records.len(), 1);
        assert_eq!(summary.records[0].total_sales, 30.0);
    }

    #[test]
    fn test_ingest_table_failures() {
        let empty = SalesTable {
            header: header(&["Date", "05:00"]),
            rows: vec![],
        };
        assert!(matches!(
            ingest_table(&empty),
            Err(SalesHistoryError::EmptyTable)
        ));

        let all_blank = SalesTable {
            header: header(&["Date", "05:00"]),
            rows: vec![row(&["01/03/2024", "0"]), row(&["junk", "5"])],
        };
        assert!(matches!(
            ingest_table(&all_blank),
            Err(SalesHistoryError::NoValidRows { skipped: 2 })
        ));
    }
}
