//! A single timestamped price observation.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use market_feed::models::{bar::Bar, quote::Quote};

use crate::errors::SeriesError;

/// One price at one instant.
///
/// The timestamp carries the zone it is expressed in; equality compares the
/// instant and the price only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    timestamp: DateTime<Tz>,
    price: f64,
}

impl Sample {
    /// Creates a sample, rejecting negative or non-finite prices.
    pub fn new(timestamp: DateTime<Tz>, price: f64) -> Result<Self, SeriesError> {
        if !price.is_finite() || price < 0.0 {
            return Err(SeriesError::InvalidPrice { price });
        }
        Ok(Self { timestamp, price })
    }

    /// A sample from a live quote, expressed in UTC.
    pub fn from_quote(quote: &Quote) -> Result<Self, SeriesError> {
        Self::new(quote.timestamp.with_timezone(&Tz::UTC), quote.price)
    }

    /// A sample from a historical bar's close, expressed in UTC.
    pub fn from_bar(bar: &Bar) -> Result<Self, SeriesError> {
        Self::new(bar.timestamp.with_timezone(&Tz::UTC), bar.close)
    }

    /// When the price was observed.
    pub fn timestamp(&self) -> DateTime<Tz> {
        self.timestamp
    }

    /// The observed price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// The timestamp as a UTC instant.
    pub fn utc(&self) -> DateTime<Utc> {
        self.timestamp.with_timezone(&Utc)
    }

    /// The same sample with its timestamp re-expressed in `tz`.
    pub fn in_tz(&self, tz: Tz) -> Self {
        Self {
            timestamp: self.timestamp.with_timezone(&tz),
            price: self.price,
        }
    }
}
