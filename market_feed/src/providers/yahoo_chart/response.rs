use chrono::DateTime;
use serde::Deserialize;

use crate::{errors::FetchError, models::bar::Bar};

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Deserialize, Debug)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(rename = "exchangeTimezoneName")]
    pub exchange_timezone_name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteIndicator>,
}

#[derive(Deserialize, Debug, Default)]
pub struct QuoteIndicator {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

impl ChartEnvelope {
    /// Unwraps the first result, turning an API-level error into [`FetchError::Status`].
    pub fn into_result(self) -> Result<Option<ChartResult>, FetchError> {
        if let Some(err) = self.chart.error {
            let body = match err.description {
                Some(d) => format!("{}: {d}", err.code),
                None => err.code,
            };
            return Err(FetchError::Status { status: 200, body });
        }
        Ok(self.chart.result.and_then(|r| r.into_iter().next()))
    }
}

impl ChartResult {
    /// Zips the parallel timestamp/close/volume arrays into bars.
    ///
    /// Rows without a close (halted or not-yet-printed intervals), with an
    /// invalid price, or with an out-of-range timestamp are dropped.
    pub fn into_bars(self) -> Vec<Bar> {
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        self.timestamp
            .into_iter()
            .enumerate()
            .filter_map(|(i, secs)| {
                let close = quote.close.get(i).copied().flatten()?;
                if !close.is_finite() || close < 0.0 {
                    return None;
                }
                let timestamp = DateTime::from_timestamp(secs, 0)?;
                let volume = quote.volume.get(i).copied().flatten();
                Some(Bar { timestamp, close, volume })
            })
            .collect()
    }
}
