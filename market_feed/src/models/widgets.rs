//! Payloads for the auxiliary dashboard widgets.

use serde::{Deserialize, Serialize};

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub city: String,
    pub temperature_f: f64,
    pub description: String,
    /// Provider icon code, e.g. `"01d"`.
    pub icon: String,
}

impl Weather {
    pub fn icon_url(&self) -> String {
        format!("http://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

/// A news headline linked to a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
}
