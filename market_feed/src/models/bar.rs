//! Canonical in-memory representation of a historical bar.
//!
//! This struct is the standard output of every
//! [`HistoryProvider`](crate::providers::HistoryProvider) implementation.
//! Only the close and volume are kept; the dashboard never charts the
//! other OHLC fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::timeframe::TimeFrame;

/// A single time-series bar for a given timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// The timestamp for this bar (UTC).
    pub timestamp: DateTime<Utc>,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval. Not all providers supply this.
    pub volume: Option<u64>,
}

/// Represents a complete set of time-series data for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their corresponding symbol
/// and [`TimeFrame`], making the data set self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL", "RIVN").
    pub symbol: String,
    /// The time interval for each bar in the series.
    pub interval: TimeFrame,
    /// The collection of bars, oldest first.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    /// Close of the second-to-last bar, i.e. the previous session close when
    /// the series holds daily bars ending today.
    pub fn previous_close(&self) -> Option<f64> {
        let n = self.bars.len();
        if n >= 2 { Some(self.bars[n - 2].close) } else { None }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
