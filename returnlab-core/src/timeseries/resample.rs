//! Calendar resampling: sparse rows onto a dense daily grid.
//!
//! The output covers every calendar day from the earliest to the latest
//! dated input row, inclusive — weekends and holidays included. Days
//! without an exact observation inherit the most recent prior row's values
//! (forward-fill). The fill cursor only moves forward, so the whole sweep
//! is O(rows + days).

use std::collections::HashMap;

use chrono::NaiveDate;

use super::TableError;
use crate::domain::{DailyPriceTable, RawRow, RawTable};

/// Align a sparse table onto a dense daily grid.
///
/// Rows with a missing date are discarded before processing; remaining rows
/// are stably sorted by date, so duplicate dates resolve to the latest of
/// the tied rows in input order. An empty input (or one whose every row
/// lacks a date) yields the empty table.
///
/// # Errors
/// [`TableError::MissingColumn`] if the input declares no `Date` column.
pub fn resample(table: &RawTable) -> Result<DailyPriceTable, TableError> {
    if table.rows.is_empty() {
        return Ok(DailyPriceTable::empty());
    }
    if !table.has_date_column() {
        return Err(TableError::MissingColumn);
    }

    let mut dated: Vec<(NaiveDate, &RawRow)> = table
        .rows
        .iter()
        .filter_map(|row| row.date.map(|date| (date, row)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let (start, end) = match (dated.first(), dated.last()) {
        (Some((start, _)), Some((end, _))) => (*start, *end),
        _ => return Ok(DailyPriceTable::empty()),
    };

    let symbols: Vec<String> = table.symbols().cloned().collect();
    let n_days = (end - start).num_days() as usize + 1;

    let mut dates = Vec::with_capacity(n_days);
    let mut prices: HashMap<String, Vec<f64>> = symbols
        .iter()
        .map(|s| (s.clone(), Vec::with_capacity(n_days)))
        .collect();

    // Monotonic fill cursor: always the last row dated <= the current day.
    let mut cursor = 0;
    for offset in 0..n_days {
        let day = start + chrono::Duration::days(offset as i64);
        while cursor + 1 < dated.len() && dated[cursor + 1].0 <= day {
            cursor += 1;
        }
        dates.push(day);
        let row = dated[cursor].1;
        for symbol in &symbols {
            let value = row.values.get(symbol).copied().unwrap_or(f64::NAN);
            if let Some(column) = prices.get_mut(symbol) {
                column.push(value);
            }
        }
    }

    Ok(DailyPriceTable::new(dates, symbols, prices))
}
