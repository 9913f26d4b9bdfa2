//! Transport seam for the upstream quote endpoint.
//!
//! The core never fetches on its own authority: callers inject a
//! [`QuoteTransport`]. The shipped implementation speaks HTTP to the quote
//! proxy (`{base}?ticker=SYMBOL`); tests inject canned bodies instead.

use std::time::Duration;

use crate::data::DataError;

/// Fetches one ticker's raw chart document.
///
/// Implementations own their timeout policy — a long-hung fetch is bounded
/// by the transport, not by the acquisition layer.
pub trait QuoteTransport: Send + Sync {
    /// Fetch the raw response body for a normalized ticker.
    fn fetch_raw(&self, ticker: &str) -> Result<String, DataError>;
}

/// HTTP transport against a chart-endpoint base URL.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl QuoteTransport for HttpTransport {
    fn fetch_raw(&self, ticker: &str) -> Result<String, DataError> {
        let unreachable = |reason: String| DataError::TickerUnreachable {
            ticker: ticker.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("ticker", ticker)])
            .send()
            .map_err(|e| unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unreachable(format!("HTTP {status}")));
        }

        response.text().map_err(|e| unreachable(e.to_string()))
    }
}
