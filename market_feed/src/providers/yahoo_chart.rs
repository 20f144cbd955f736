//! History provider backed by the public chart API
//! (`/v8/finance/chart/{symbol}?range=..&interval=..`).

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{DEFAULT_BASE_URL, YahooChartProvider};
