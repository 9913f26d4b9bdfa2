//! Pure transforms over price tables: calendar resampling, rolling returns,
//! and return distributions.
//!
//! Everything here is synchronous, allocation-only, and side-effect free;
//! callers may fan transforms out across symbols as they see fit.

pub mod distribution;
pub mod resample;
pub mod returns;

pub use distribution::{distribution, Bin, DistributionOptions, FacetDistribution};
pub use resample::resample;
pub use returns::rolling_returns;

use thiserror::Error;

/// Structural failures of the table transforms.
///
/// These are fatal to the single call that raised them and surface
/// synchronously; per-ticker acquisition failures live in
/// [`crate::data::DataError`] and never abort sibling tickers.
#[derive(Debug, Error)]
pub enum TableError {
    /// The input table declares no `Date` column.
    #[error("missing 'Date' column")]
    MissingColumn,

    /// The rolling-return horizon is not a positive number of days.
    #[error("period must be a positive number of days (got {period})")]
    InvalidArgument { period: usize },

    /// A symbol's series is too short for the requested horizon.
    #[error(
        "rolling window of {period} days is too large for symbol '{symbol}' \
         ({len} observations)"
    )]
    WindowTooLarge {
        symbol: String,
        period: usize,
        len: usize,
    },
}
