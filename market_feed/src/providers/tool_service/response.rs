use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::{errors::FetchError, models::widgets::Headline};

#[derive(Deserialize, Debug)]
pub struct PriceResponse {
    pub timestamp: String,
    pub price: f64,
}

#[derive(Deserialize, Debug)]
pub struct CompanyNameResponse {
    #[serde(rename = "companyName", alias = "company_name", alias = "name")]
    pub company_name: String,
}

#[derive(Deserialize, Debug)]
pub struct OpeningPriceResponse {
    #[serde(rename = "openingPrice", alias = "opening_price", alias = "open")]
    pub opening_price: f64,
}

/// News comes back either as a bare list or wrapped in `{"articles": [...]}`.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum NewsResponse {
    List(Vec<Headline>),
    Wrapped { articles: Vec<Headline> },
}

impl NewsResponse {
    pub fn into_headlines(self) -> Vec<Headline> {
        match self {
            NewsResponse::List(items) | NewsResponse::Wrapped { articles: items } => items,
        }
    }
}

/// Health-check payload of the service's demo tool.
#[derive(Deserialize, Debug)]
pub struct LiveDataResponse {
    pub timestamp: String,
    pub value: i64,
}

/// Parses an ISO-8601 timestamp.
///
/// RFC-3339 strings keep their offset; a naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// is taken to be UTC.
pub fn parse_iso_timestamp(s: &str) -> Result<DateTime<Utc>, FetchError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| FetchError::Decode(format!("bad timestamp {s:?}: {e}")))
}
