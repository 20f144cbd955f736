//! Current-weather widget backed by OpenWeatherMap.

pub mod provider;
pub mod response;

pub use provider::{API_KEY_ENV, DEFAULT_BASE_URL, OpenWeatherProvider};
