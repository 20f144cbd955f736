//! Time-series assembly and presentation metrics for the tickerboard dashboard.
//!
//! The crate turns raw answers from the [`market_feed`] clients into
//! display-ready panels: it accumulates live quotes per session, resolves a
//! timeframe label to a history request, masks samples to an exchange's
//! regular session and derives moving averages and price changes.
//!
//! [`pipeline::Dashboard`] ties the pieces together; everything else can be
//! used on its own.

#![deny(missing_docs)]

pub mod cache;
pub mod config;
pub mod display;
pub mod errors;
pub mod market_hours;
pub mod metrics;
pub mod pipeline;
pub mod reference;
pub mod retry;
pub mod sample;
pub mod series_store;
pub mod session;
pub mod tz;
pub mod window;
