//! Latest-price snapshot returned by a [`QuoteProvider`](crate::providers::QuoteProvider).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single live quote for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// The symbol this quote belongs to (e.g., "AAPL").
    pub symbol: String,
    /// When the upstream service observed the price (UTC).
    pub timestamp: DateTime<Utc>,
    /// Last traded price.
    pub price: f64,
}
