//! Quote acquisition: transport seam, response cache, chart-document
//! validation, CSV ingestion, and the multi-ticker merge.

pub mod acquire;
pub mod cache;
pub mod chart;
pub mod csv;
pub mod transport;

pub use acquire::{acquire, normalize_ticker, AcquisitionSink, StderrSink, TickerOutcome};
pub use cache::{CacheEntry, DiskStore, MemoryStore, ResponseStore, CACHE_TTL_MS};
pub use chart::{parse_chart, QuoteHistory};
pub use self::csv::{load_csv, write_returns_csv, write_table_csv};
pub use transport::{HttpTransport, QuoteTransport};

use thiserror::Error;

/// Failures of the acquisition layer.
///
/// Per-ticker variants are isolated and reported through the injected sink;
/// they never abort sibling tickers.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network fetch failed and no cached entry could stand in.
    #[error("network fetch failed for ticker '{ticker}': {reason}")]
    TickerUnreachable { ticker: String, reason: String },

    /// The provider response did not validate as a usable chart document.
    #[error("invalid provider response for ticker '{ticker}': {reason}")]
    TickerInvalid { ticker: String, reason: String },

    /// A cache write failed. Non-fatal: the fetched data is still served
    /// and a background repair is attempted.
    #[error("cache write failed: {0}")]
    CacheWriteFailed(String),

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("csv error: {0}")]
    Csv(String),
}
