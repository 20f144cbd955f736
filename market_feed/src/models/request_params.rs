use serde::{Deserialize, Serialize};

use crate::models::timeframe::{Period, TimeFrame};

/// Parameters for requesting a bar series from a
/// [`HistoryProvider`](crate::providers::HistoryProvider).
///
/// **Validation of allowed interval values is performed by each provider
/// implementation, according to its own API rules.**
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Symbol to request (e.g., `"AAPL"`).
    pub symbol: String,

    /// Look-back window ending now (e.g., 1 day, 3 months).
    pub period: Period,

    /// The time interval for each bar (e.g., 5 minutes, 1 day).
    pub interval: TimeFrame,
}

impl HistoryRequest {
    pub fn new(symbol: impl Into<String>, period: Period, interval: TimeFrame) -> Self {
        Self {
            symbol: symbol.into(),
            period,
            interval,
        }
    }

    /// Two daily bars: yesterday's close is the second-to-last one.
    pub fn previous_close(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Period::days(2), TimeFrame::day())
    }
}
