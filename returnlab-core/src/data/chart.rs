//! Provider chart document: serde model, validation, per-point extraction.
//!
//! The upstream endpoint answers one ticker per request with
//! `{ chart: { error, result: [ { meta: { symbol }, timestamp: [..],
//! indicators: { adjclose: [ { adjclose: [..] } ] } } ] } }`. The loose
//! shape is validated here, at the boundary, so everything downstream works
//! on typed [`QuoteHistory`] values.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::data::DataError;
use crate::domain::DATE_COLUMN;

#[derive(Debug, Deserialize)]
struct ChartDocument {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// A validated per-ticker quote history: the resolved instrument symbol and
/// one point per provider timestamp — the UTC calendar date and the
/// adjusted close, `None` where the provider had no quote.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteHistory {
    pub symbol: String,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

/// Decode and validate a raw chart response body.
///
/// The document must carry a null error field, exactly one result block, a
/// non-empty timestamp array, and a resolvable symbol distinct from the
/// literal `"Date"` (which would collide with the table's date column).
/// Any violation rejects the whole response — malformed data is never
/// partially incorporated.
///
/// # Errors
/// [`DataError::TickerInvalid`] describing the first violation found.
pub fn parse_chart(ticker: &str, body: &str) -> Result<QuoteHistory, DataError> {
    let invalid = |reason: String| DataError::TickerInvalid {
        ticker: ticker.to_string(),
        reason,
    };

    let doc: ChartDocument = serde_json::from_str(body)
        .map_err(|e| invalid(format!("not a chart document: {e}")))?;

    if doc.chart.error.is_some() {
        return Err(invalid("provider reported an error".to_string()));
    }

    let results = doc.chart.result.unwrap_or_default();
    if results.len() != 1 {
        return Err(invalid(format!(
            "expected exactly one result block, got {}",
            results.len()
        )));
    }
    let Some(result) = results.into_iter().next() else {
        return Err(invalid("empty result array".to_string()));
    };

    let timestamps = result.timestamp.unwrap_or_default();
    if timestamps.is_empty() {
        return Err(invalid("empty timestamp array".to_string()));
    }

    let symbol = match result.meta.symbol {
        Some(s) if !s.is_empty() && s != DATE_COLUMN => s,
        Some(_) => return Err(invalid("unusable instrument symbol".to_string())),
        None => return Err(invalid("missing instrument symbol".to_string())),
    };

    let closes: &[Option<f64>] = result
        .indicators
        .adjclose
        .first()
        .map(|a| a.adjclose.as_slice())
        .unwrap_or(&[]);

    let mut points = Vec::with_capacity(timestamps.len());
    for (k, &ts) in timestamps.iter().enumerate() {
        let Some(dt) = chrono::DateTime::from_timestamp(ts, 0) else {
            return Err(invalid(format!("invalid timestamp: {ts}")));
        };
        let price = closes.get(k).copied().flatten();
        points.push((dt.naive_utc().date(), price));
    }

    Ok(QuoteHistory { symbol, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(symbol: &str, timestamps: &[i64], closes: &[Option<f64>]) -> String {
        json!({
            "chart": {
                "error": null,
                "result": [{
                    "meta": { "symbol": symbol },
                    "timestamp": timestamps,
                    "indicators": { "adjclose": [{ "adjclose": closes }] }
                }]
            }
        })
        .to_string()
    }

    #[test]
    fn valid_document_parses() {
        // 2020-01-01 14:30 and 2020-01-02 14:30 UTC.
        let history = parse_chart(
            "VWCE.MI",
            &body("VWCE.MI", &[1_577_889_000, 1_577_975_400], &[Some(100.0), Some(101.5)]),
        )
        .unwrap();

        assert_eq!(history.symbol, "VWCE.MI");
        assert_eq!(history.points.len(), 2);
        assert_eq!(
            history.points[0],
            (NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), Some(100.0))
        );
        assert_eq!(
            history.points[1],
            (NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(), Some(101.5))
        );
    }

    #[test]
    fn null_closes_become_missing_points() {
        let history = parse_chart(
            "X",
            &body("X", &[1_577_889_000, 1_577_975_400], &[None, Some(1.0)]),
        )
        .unwrap();
        assert_eq!(history.points[0].1, None);
        assert_eq!(history.points[1].1, Some(1.0));
    }

    #[test]
    fn missing_adjclose_block_yields_all_missing_points() {
        let raw = json!({
            "chart": {
                "error": null,
                "result": [{
                    "meta": { "symbol": "X" },
                    "timestamp": [1_577_889_000],
                    "indicators": {}
                }]
            }
        })
        .to_string();
        let history = parse_chart("X", &raw).unwrap();
        assert_eq!(history.points, [(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), None)]);
    }

    #[test]
    fn non_null_error_is_rejected() {
        let raw = json!({
            "chart": {
                "error": { "code": "Not Found", "description": "No data" },
                "result": null
            }
        })
        .to_string();
        assert!(matches!(
            parse_chart("X", &raw),
            Err(DataError::TickerInvalid { .. })
        ));
    }

    #[test]
    fn exactly_one_result_block_is_required() {
        let raw = json!({
            "chart": { "error": null, "result": [] }
        })
        .to_string();
        assert!(parse_chart("X", &raw).is_err());

        let one = serde_json::from_str::<serde_json::Value>(&body("X", &[1], &[Some(1.0)]))
            .unwrap()["chart"]["result"][0]
            .clone();
        let raw = json!({ "chart": { "error": null, "result": [one.clone(), one] } }).to_string();
        assert!(parse_chart("X", &raw).is_err());
    }

    #[test]
    fn empty_timestamps_are_rejected() {
        assert!(parse_chart("X", &body("X", &[], &[])).is_err());
    }

    #[test]
    fn date_literal_symbol_is_rejected() {
        assert!(parse_chart("X", &body("Date", &[1_577_889_000], &[Some(1.0)])).is_err());
        assert!(parse_chart("X", &body("", &[1_577_889_000], &[Some(1.0)])).is_err());
    }

    #[test]
    fn garbage_body_is_rejected() {
        assert!(matches!(
            parse_chart("X", "<html>rate limited</html>"),
            Err(DataError::TickerInvalid { .. })
        ));
    }
}
