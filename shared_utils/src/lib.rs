//! Small helpers shared by the tickerboard crates.

pub mod env;
