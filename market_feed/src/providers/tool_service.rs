//! Client for the intermediary tool-invocation service.
//!
//! Every call is `POST {base}/tools/{tool}/invoke` with a small JSON argument
//! object; the service answers with the tool's JSON result.

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{BASE_URL_ENV, DEFAULT_BASE_URL, ToolServiceProvider};
