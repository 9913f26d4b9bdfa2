//! Long-format price and return observations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single instrument's closing price on a calendar day.
///
/// `price` is NaN when the source had no quote for that day. Tables produced
/// by the acquisition layer only carry finite prices (the merge filter drops
/// incomplete dates); tables resampled from partial CSV input may not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub symbol: String,
    pub price: f64,
}

/// A trailing-window percentage change: buying `period` days before `date`
/// and selling on `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnObservation {
    pub date: NaiveDate,
    pub symbol: String,
    #[serde(rename = "return")]
    pub ret: f64,
}
