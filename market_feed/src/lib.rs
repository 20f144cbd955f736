//! Leaf clients for the tickerboard dashboard.
//!
//! - [`providers::tool_service`]: live quotes, company names, opening prices
//!   and headlines from the tool-invocation service.
//! - [`providers::yahoo_chart`]: historical bars.
//! - [`providers::openweather`]: the weather widget.
//!
//! None of the clients cache or retry; that policy lives with the caller.

pub mod errors;
pub mod models;
pub mod providers;
