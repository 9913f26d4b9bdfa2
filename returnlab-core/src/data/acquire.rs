//! Multi-ticker acquisition: cache-aware fetch, validation, and the
//! cross-ticker merge onto a dense daily table.
//!
//! Tickers are processed sequentially — one in flight at a time keeps
//! provider rate limits and cache-write ordering simple. One ticker's
//! failure never aborts its siblings; every failure is reported through the
//! injected sink.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};

use crate::data::cache::{CacheEntry, ResponseStore};
use crate::data::chart::{parse_chart, QuoteHistory};
use crate::data::transport::QuoteTransport;
use crate::domain::{DailyPriceTable, RawRow, RawTable, DATE_COLUMN};
use crate::timeseries::{resample, TableError};

/// Receives per-ticker failure reports during acquisition.
///
/// `warn` signals non-fatal fallbacks (stale cache served, cache write
/// failed); `error` signals tickers that contribute nothing to the run.
pub trait AcquisitionSink: Send + Sync {
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default sink: prints to stderr.
pub struct StderrSink;

impl AcquisitionSink for StderrSink {
    fn warn(&self, message: &str) {
        eprintln!("WARNING: {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("ERROR: {message}");
    }
}

/// Outcome of a single ticker's acquisition. `Invalid` and `Unreachable`
/// tickers contribute no column and no rows — never zero-valued prices.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Ok(QuoteHistory),
    Invalid,
    Unreachable,
}

/// Normalize a ticker for use as a cache and request key.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Acquire quote histories for `tickers` and merge them into a dense daily
/// table.
///
/// Per ticker: serve the cached response while it is fresh; otherwise fetch,
/// persist, and fall back to a stale entry if the fetch fails. The merged
/// table keeps only dates on which every successfully-acquired symbol has a
/// finite price, then runs through the calendar resampler. Its column list
/// is `Date` followed by the acquired symbols in ticker order.
///
/// # Errors
/// Only structural resampler failures propagate; per-ticker failures are
/// reported to `sink` and skipped.
pub fn acquire(
    tickers: &[String],
    transport: &dyn QuoteTransport,
    store: &dyn ResponseStore,
    sink: &dyn AcquisitionSink,
) -> Result<DailyPriceTable, TableError> {
    let mut dataset: BTreeMap<NaiveDate, HashMap<String, Option<f64>>> = BTreeMap::new();
    let mut symbols: Vec<String> = Vec::new();

    for ticker in tickers {
        match acquire_ticker(ticker, transport, store, sink, Utc::now()) {
            TickerOutcome::Ok(history) => {
                for (date, price) in &history.points {
                    dataset
                        .entry(*date)
                        .or_default()
                        .insert(history.symbol.clone(), *price);
                }
                if !symbols.contains(&history.symbol) {
                    symbols.push(history.symbol.clone());
                }
            }
            TickerOutcome::Invalid | TickerOutcome::Unreachable => {}
        }
    }

    // Keep only dates where every acquired symbol has a finite price and no
    // extraneous symbol appears. Dropping incomplete dates is deliberate:
    // fabricating a price for a market that was closed would skew every
    // downstream return.
    let rows: Vec<RawRow> = dataset
        .into_iter()
        .filter(|(_, values)| {
            symbols.iter().all(|s| {
                values
                    .get(s)
                    .copied()
                    .flatten()
                    .is_some_and(f64::is_finite)
            }) && values.keys().all(|s| symbols.contains(s))
        })
        .map(|(date, values)| RawRow {
            date: Some(date),
            values: values
                .into_iter()
                .filter_map(|(symbol, price)| price.map(|p| (symbol, p)))
                .collect(),
        })
        .collect();

    let mut columns = Vec::with_capacity(symbols.len() + 1);
    columns.push(DATE_COLUMN.to_string());
    columns.extend(symbols);

    resample(&RawTable { columns, rows })
}

/// Run one ticker through the lookup → freshness → fetch → validate state
/// machine.
fn acquire_ticker(
    ticker: &str,
    transport: &dyn QuoteTransport,
    store: &dyn ResponseStore,
    sink: &dyn AcquisitionSink,
    now: DateTime<Utc>,
) -> TickerOutcome {
    let key = normalize_ticker(ticker);

    let body = match store.get(&key) {
        Some(entry) if entry.is_fresh_at(now) => entry.body,
        cached => match transport.fetch_raw(&key) {
            Ok(body) => {
                let entry = CacheEntry::new(body.clone(), now);
                if let Err(e) = store.put(&key, &entry) {
                    sink.warn(&format!("cache write failed for ticker \"{key}\": {e}"));
                    store.repair(&key, &entry);
                }
                body
            }
            Err(fetch_err) => match cached {
                // Outdated data beats no data at all.
                Some(entry) => {
                    tracing::warn!(ticker = %key, error = %fetch_err, "serving stale cache");
                    sink.warn(&format!(
                        "refresh failed for ticker \"{key}\", serving cached data from {}: {fetch_err}",
                        entry.stored_at.format("%Y-%m-%d")
                    ));
                    entry.body
                }
                None => {
                    sink.error(&format!(
                        "failed to fetch data for ticker \"{key}\": {fetch_err}"
                    ));
                    return TickerOutcome::Unreachable;
                }
            },
        },
    };

    match parse_chart(&key, &body) {
        Ok(history) => TickerOutcome::Ok(history),
        Err(parse_err) => {
            sink.error(&format!("unexpected response for ticker \"{key}\": {parse_err}"));
            TickerOutcome::Invalid
        }
    }
}
