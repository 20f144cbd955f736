use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::debug;

use crate::{
    errors::{FetchError, ProviderInitError, normalize_base_url},
    models::{bar::BarSeries, request_params::HistoryRequest},
    providers::{
        ClientOptions, HistoryProvider, read_json, status_error,
        yahoo_chart::{
            params::{construct_params, validate_interval},
            response::ChartEnvelope,
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

// The chart API rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new(base_url: &str, options: &ClientOptions) -> Result<Self, ProviderInitError> {
        let base_url = normalize_base_url(base_url)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl HistoryProvider for YahooChartProvider {
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<BarSeries, FetchError> {
        // Validate the interval before proceeding.
        validate_interval(&request.interval)?;

        let url = format!("{}/v8/finance/chart/{}", self.base_url, request.symbol);
        debug!(%url, period = %request.period, interval = %request.interval, "fetching chart");

        let response = self
            .client
            .get(&url)
            .query(&construct_params(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let envelope: ChartEnvelope = read_json(response).await?;
        let bars = envelope
            .into_result()?
            .map(|result| result.into_bars())
            .unwrap_or_default();

        if bars.is_empty() {
            return Err(FetchError::empty(&request.symbol, "historical bars"));
        }

        Ok(BarSeries {
            symbol: request.symbol.clone(),
            interval: request.interval,
            bars,
        })
    }
}
