//! Fixed-horizon rolling returns over a dense daily series.
//!
//! The i-th return represents buying `period` days before the i-th day and
//! selling on it:
//!
//! ```text
//! ret[i] = price[i] / price[i - period] - 1
//! ```
//!
//! No smoothing, no interpolation — the input is expected to be the dense,
//! gap-free output of the resampler.

use std::collections::HashMap;

use super::TableError;
use crate::domain::{Observation, ReturnObservation};

/// Compute trailing `period`-day returns, grouped by symbol.
///
/// Symbols are partitioned preserving per-symbol chronological order; the
/// output concatenates per-symbol sequences in first-appearance order. A
/// symbol with `N` observations contributes exactly `N - period` returns,
/// dated at the window end.
///
/// # Errors
/// [`TableError::InvalidArgument`] if `period` is zero;
/// [`TableError::WindowTooLarge`] if any symbol has `period` or fewer
/// observations. Callers are expected to catch the latter and render a
/// placeholder rather than crash.
pub fn rolling_returns(
    prices: &[Observation],
    period: usize,
) -> Result<Vec<ReturnObservation>, TableError> {
    if period == 0 {
        return Err(TableError::InvalidArgument { period });
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Observation>> = HashMap::new();
    for obs in prices {
        groups
            .entry(obs.symbol.as_str())
            .or_insert_with(|| {
                order.push(obs.symbol.as_str());
                Vec::new()
            })
            .push(obs);
    }

    let mut out = Vec::new();
    for symbol in order {
        let series = &groups[symbol];
        if series.len() <= period {
            return Err(TableError::WindowTooLarge {
                symbol: symbol.to_string(),
                period,
                len: series.len(),
            });
        }
        out.reserve(series.len() - period);
        for i in 0..series.len() - period {
            let bought = series[i];
            let sold = series[i + period];
            out.push(ReturnObservation {
                date: sold.date,
                symbol: symbol.to_string(),
                ret: sold.price / bought.price - 1.0,
            });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(symbol: &str, prices: &[f64]) -> Vec<Observation> {
        let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| Observation {
                date: base + chrono::Duration::days(i as i64),
                symbol: symbol.to_string(),
                price,
            })
            .collect()
    }

    #[test]
    fn zero_period_is_invalid() {
        let prices = series("A", &[100.0, 110.0]);
        assert!(matches!(
            rolling_returns(&prices, 0),
            Err(TableError::InvalidArgument { period: 0 })
        ));
    }

    #[test]
    fn window_must_be_smaller_than_the_series() {
        let prices = series("A", &[100.0, 110.0]);
        match rolling_returns(&prices, 2) {
            Err(TableError::WindowTooLarge {
                symbol,
                period,
                len,
            }) => {
                assert_eq!(symbol, "A");
                assert_eq!(period, 2);
                assert_eq!(len, 2);
            }
            other => panic!("expected WindowTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn series_of_n_yields_n_minus_period_returns() {
        let prices = series("A", &[100.0, 110.0, 121.0, 133.1]);
        let returns = rolling_returns(&prices, 1).unwrap();
        assert_eq!(returns.len(), 3);
        for r in &returns {
            assert!((r.ret - 0.10).abs() < 1e-12);
        }
    }

    #[test]
    fn returns_are_dated_at_the_window_end() {
        let prices = series("A", &[100.0, 105.0, 110.0]);
        let returns = rolling_returns(&prices, 2).unwrap();
        assert_eq!(returns.len(), 1);
        assert_eq!(
            returns[0].date,
            NaiveDate::from_ymd_opt(2020, 1, 3).unwrap()
        );
        assert!((returns[0].ret - 0.10).abs() < 1e-12);
    }

    #[test]
    fn symbols_keep_first_appearance_order() {
        let mut prices = series("B", &[100.0, 110.0]);
        prices.extend(series("A", &[200.0, 210.0]));
        let returns = rolling_returns(&prices, 1).unwrap();
        assert_eq!(returns[0].symbol, "B");
        assert_eq!(returns[1].symbol, "A");
    }

    #[test]
    fn interleaved_symbols_keep_chronological_order() {
        let a = series("A", &[100.0, 110.0, 121.0]);
        let b = series("B", &[50.0, 55.0, 60.5]);
        let mut interleaved = Vec::new();
        for (x, y) in a.into_iter().zip(b) {
            interleaved.push(x);
            interleaved.push(y);
        }
        let returns = rolling_returns(&interleaved, 1).unwrap();
        assert_eq!(returns.len(), 4);
        let a_rets: Vec<f64> = returns
            .iter()
            .filter(|r| r.symbol == "A")
            .map(|r| r.ret)
            .collect();
        for ret in a_rets {
            assert!((ret - 0.10).abs() < 1e-12);
        }
    }

    #[test]
    fn one_short_symbol_fails_the_call() {
        let mut prices = series("A", &[100.0, 110.0, 121.0]);
        prices.extend(series("B", &[50.0]));
        assert!(matches!(
            rolling_returns(&prices, 2),
            Err(TableError::WindowTooLarge { .. })
        ));
    }

    #[test]
    fn nan_prices_propagate_as_nan_returns() {
        let prices = series("A", &[100.0, f64::NAN, 121.0]);
        let returns = rolling_returns(&prices, 1).unwrap();
        assert!(returns[0].ret.is_nan());
        assert!(returns[1].ret.is_nan());
    }
}
