//! Provider abstraction for the dashboard's data sources.
//!
//! Each trait covers one kind of upstream call so a concrete client only
//! implements what its API offers:
//!
//! - [`QuoteProvider`]: latest price of one symbol.
//! - [`HistoryProvider`]: bar series over a period at a sampling interval.
//! - [`ReferenceProvider`]: company display name and session opening price.
//! - [`WeatherProvider`] and [`HeadlineProvider`]: auxiliary widgets.
//!
//! The traits are designed for async usage and support dynamic dispatch
//! (`Arc<dyn QuoteProvider>`) for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_feed::errors::FetchError;
//! use market_feed::models::quote::Quote;
//! use market_feed::providers::QuoteProvider;
//!
//! struct FixedQuotes;
//!
//! #[async_trait]
//! impl QuoteProvider for FixedQuotes {
//!     async fn latest_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
//!         Ok(Quote {
//!             symbol: symbol.to_string(),
//!             timestamp: chrono::Utc::now(),
//!             price: 100.0,
//!         })
//!     }
//! }
//! ```

pub mod openweather;
pub mod tool_service;
pub mod yahoo_chart;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{
    errors::FetchError,
    models::{
        bar::BarSeries,
        quote::Quote,
        request_params::HistoryRequest,
        widgets::{Headline, Weather},
    },
};

/// Fetches the latest price for a symbol.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn latest_quote(&self, symbol: &str) -> Result<Quote, FetchError>;
}

/// Fetches time-series bar data.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Returns the bars for `request`, oldest first.
    ///
    /// An empty series is reported as [`FetchError::Empty`], never as `Ok`
    /// with no bars.
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<BarSeries, FetchError>;
}

/// Fetches per-symbol reference data that is stable within a session.
#[async_trait]
pub trait ReferenceProvider: Send + Sync {
    async fn company_name(&self, symbol: &str) -> Result<String, FetchError>;

    async fn opening_price(&self, symbol: &str) -> Result<f64, FetchError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, city: &str) -> Result<Weather, FetchError>;
}

#[async_trait]
pub trait HeadlineProvider: Send + Sync {
    async fn headlines(&self, symbol: &str) -> Result<Vec<Headline>, FetchError>;
}

/// HTTP settings shared by every REST provider.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout. Upstream calls are awaited in sequence, so a hung
    /// endpoint would otherwise stall the whole refresh pass.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

/// Reads the error body of a non-success response.
pub(crate) async fn status_error(response: reqwest::Response) -> FetchError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown API error".to_string());
    FetchError::Status { status, body }
}

/// Reads a success body and decodes it as JSON.
///
/// A body that cannot be read is a transport failure; one that reads but
/// does not match `T` is [`FetchError::Decode`].
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, FetchError> {
    let body = response.bytes().await?;
    decode_json(&body)
}

pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, FetchError> {
    serde_json::from_slice(body).map_err(|err| FetchError::Decode(format!("malformed response body: {err}")))
}

/// Rejects prices no chart can show.
pub(crate) fn check_price(price: f64, what: &str) -> Result<f64, FetchError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(FetchError::Decode(format!("invalid {what}: {price}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::models::timeframe::{Period, TimeFrame};

    struct ToolQuotes;
    struct EmptyHistory;

    #[async_trait]
    impl QuoteProvider for ToolQuotes {
        async fn latest_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
            Ok(Quote {
                symbol: symbol.to_string(),
                timestamp: Utc::now(),
                price: 12.5,
            })
        }
    }

    #[async_trait]
    impl HistoryProvider for EmptyHistory {
        async fn fetch_history(&self, request: &HistoryRequest) -> Result<BarSeries, FetchError> {
            Err(FetchError::empty(&request.symbol, "bars"))
        }
    }

    #[tokio::test]
    async fn providers_are_object_safe() {
        let quotes: Arc<dyn QuoteProvider> = Arc::new(ToolQuotes);
        let history: Arc<dyn HistoryProvider> = Arc::new(EmptyHistory);

        let quote = quotes.latest_quote("RIVN").await.unwrap();
        assert_eq!(quote.symbol, "RIVN");

        let req = HistoryRequest::new("RIVN", Period::days(1), TimeFrame::minutes(5));
        let err = history.fetch_history(&req).await.unwrap_err();
        assert!(err.is_data_absent());
    }

    #[derive(Debug, serde::Deserialize)]
    struct Price {
        price: f64,
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let ok: Price = decode_json(br#"{"price": 12.5}"#).unwrap();
        assert_eq!(ok.price, 12.5);

        let err = decode_json::<Price>(b"<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
        let err = decode_json::<Price>(br#"{"price": "n/a"}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
    }

    #[test]
    fn price_check() {
        assert_eq!(check_price(0.0, "price").unwrap(), 0.0);
        assert!(check_price(-1.0, "price").is_err());
        assert!(check_price(f64::NAN, "price").is_err());
        assert!(check_price(f64::INFINITY, "price").is_err());
    }
}
