//! Tabular price data: sparse input rows and the dense daily grid.

use std::collections::HashMap;

use chrono::NaiveDate;

use super::observation::Observation;

/// Name of the mandatory date column in tabular input.
pub const DATE_COLUMN: &str = "Date";

/// A sparse input row: a calendar date (possibly absent) and the prices
/// recorded on it, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub date: Option<NaiveDate>,
    pub values: HashMap<String, f64>,
}

/// Unaligned tabular input for the resampler: a declared column list
/// (`Date` plus symbol names) and sparse rows.
///
/// Produced by the CSV loader and by the acquisition merge; the resampler is
/// the only consumer.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Column names excluding the date column, in declared order.
    pub fn symbols(&self) -> impl Iterator<Item = &String> {
        self.columns.iter().filter(|c| c.as_str() != DATE_COLUMN)
    }

    pub fn has_date_column(&self) -> bool {
        self.columns.iter().any(|c| c == DATE_COLUMN)
    }
}

/// Dense daily price grid.
///
/// Invariants:
/// - `dates` strictly increase by exactly one calendar day;
/// - every symbol column holds exactly `dates.len()` values, inherited via
///   forward-fill, never interpolated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyPriceTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    prices: HashMap<String, Vec<f64>>,
}

impl DailyPriceTable {
    pub(crate) fn new(
        dates: Vec<NaiveDate>,
        symbols: Vec<String>,
        prices: HashMap<String, Vec<f64>>,
    ) -> Self {
        debug_assert!(dates.windows(2).all(|w| (w[1] - w[0]).num_days() == 1));
        debug_assert!(symbols.iter().all(|s| {
            prices.get(s).map(Vec::len) == Some(dates.len())
        }));
        Self {
            dates,
            symbols,
            prices,
        }
    }

    /// The empty table of size 0.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows (calendar days).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The daily date axis, strictly ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Symbol columns in table order (`Date` is implicit and first).
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// One symbol's price column, parallel to [`Self::dates`].
    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.prices.get(symbol).map(Vec::as_slice)
    }

    /// Flatten into long format, row-major: for each day, one observation
    /// per symbol in column order. Per-symbol chronological order is
    /// preserved, as is first-appearance order across symbols.
    pub fn observations(&self) -> Vec<Observation> {
        let mut out = Vec::with_capacity(self.dates.len() * self.symbols.len());
        for (i, date) in self.dates.iter().enumerate() {
            for symbol in &self.symbols {
                let price = self.prices[symbol][i];
                out.push(Observation {
                    date: *date,
                    symbol: symbol.clone(),
                    price,
                });
            }
        }
        out
    }
}
