//! Error types for the engine and the classified result shown per panel.

use chrono::{DateTime, Utc};
use market_feed::errors::FetchError;
use thiserror::Error;

/// Errors raised while assembling a sample series.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    /// A price that is negative, NaN or infinite.
    #[error("invalid sample price: {price}")]
    InvalidPrice {
        /// The rejected price.
        price: f64,
    },

    /// A sample older than the newest one already stored for the symbol.
    #[error("sample for {symbol} at {incoming} is older than the latest stored sample at {latest}")]
    OutOfOrder {
        /// Symbol the sample was recorded for.
        symbol: String,
        /// Timestamp of the newest stored sample.
        latest: DateTime<Utc>,
        /// Timestamp of the rejected sample.
        incoming: DateTime<Utc>,
    },

    /// Every sample fell outside the exchange's regular session.
    #[error("no data in {exchange} session window")]
    NoSessionData {
        /// Exchange whose session mask was applied.
        exchange: String,
    },
}

/// Errors raised by the metrics engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    /// The input series was empty.
    #[error("no samples to compute metrics from")]
    NoData,
}

/// The classified outcome a panel reports instead of aborting the pass.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The endpoint was unreachable or answered with a failure.
    #[error("{symbol}: network failure: {source}")]
    NetworkFailure {
        /// Symbol the failed call was made for.
        symbol: String,
        /// Underlying client error.
        #[source]
        source: FetchError,
    },

    /// The endpoint answered but there was nothing to show.
    #[error("{symbol}: no {what} available")]
    DataAbsent {
        /// Symbol the data was requested for.
        symbol: String,
        /// What was missing, e.g. "historical bars".
        what: String,
    },

    /// A metric was left out because its inputs were unavailable.
    #[error("{symbol}: {metric} skipped")]
    ComputationSkipped {
        /// Symbol the metric belongs to.
        symbol: String,
        /// Name of the omitted metric.
        metric: &'static str,
    },
}

impl DashboardError {
    /// Classifies a client error: an empty answer is [`DashboardError::DataAbsent`],
    /// anything else a [`DashboardError::NetworkFailure`].
    pub fn from_fetch(symbol: &str, err: FetchError) -> Self {
        match err {
            FetchError::Empty { what, .. } => DashboardError::DataAbsent {
                symbol: symbol.to_string(),
                what,
            },
            other => DashboardError::NetworkFailure {
                symbol: symbol.to_string(),
                source: other,
            },
        }
    }

    /// Classifies a series error. Every variant means "nothing to chart".
    pub fn from_series(symbol: &str, err: &SeriesError) -> Self {
        DashboardError::DataAbsent {
            symbol: symbol.to_string(),
            what: match err {
                SeriesError::NoSessionData { exchange } => {
                    format!("samples in the {exchange} session window")
                }
                other => other.to_string(),
            },
        }
    }

    /// `true` for [`DashboardError::DataAbsent`].
    pub fn is_data_absent(&self) -> bool {
        matches!(self, DashboardError::DataAbsent { .. })
    }
}
