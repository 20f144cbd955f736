use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use shared_utils::env::get_env_var_or;
use tracing::debug;

use crate::{
    errors::{FetchError, ProviderInitError, normalize_base_url},
    models::{quote::Quote, widgets::Headline},
    providers::{
        ClientOptions, HeadlineProvider, QuoteProvider, ReferenceProvider, check_price,
        read_json, status_error,
        tool_service::{
            params::{NoArgs, SymbolArgs, invoke_url, tools},
            response::{
                CompanyNameResponse, LiveDataResponse, NewsResponse, OpeningPriceResponse,
                PriceResponse, parse_iso_timestamp,
            },
        },
    },
};

/// Environment variable holding the service base URL.
pub const BASE_URL_ENV: &str = "MCP_SERVER_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub struct ToolServiceProvider {
    client: Client,
    base_url: String,
}

impl ToolServiceProvider {
    /// Creates a provider talking to the service at `base_url`.
    pub fn new(base_url: &str, options: &ClientOptions) -> Result<Self, ProviderInitError> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Creates a provider from the `MCP_SERVER_URL` environment variable,
    /// falling back to `http://localhost:8000`.
    pub fn from_env(options: &ClientOptions) -> Result<Self, ProviderInitError> {
        Self::new(&get_env_var_or(BASE_URL_ENV, DEFAULT_BASE_URL), options)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn invoke<A, T>(&self, tool: &str, args: &A) -> Result<T, FetchError>
    where
        A: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = invoke_url(&self.base_url, tool);
        debug!(%url, "invoking tool");

        let response = self.client.post(&url).json(args).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        read_json(response).await
    }

    /// Calls the service's demo tool; useful as a reachability check.
    pub async fn live_data(&self) -> Result<LiveDataResponse, FetchError> {
        self.invoke(tools::LIVE_DATA, &NoArgs::default()).await
    }
}

#[async_trait]
impl QuoteProvider for ToolServiceProvider {
    async fn latest_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        let raw: PriceResponse = self.invoke(tools::STOCK_PRICE, &SymbolArgs { symbol }).await?;
        Ok(Quote {
            symbol: symbol.to_string(),
            timestamp: parse_iso_timestamp(&raw.timestamp)?,
            price: check_price(raw.price, "price")?,
        })
    }
}

#[async_trait]
impl ReferenceProvider for ToolServiceProvider {
    async fn company_name(&self, symbol: &str) -> Result<String, FetchError> {
        let raw: CompanyNameResponse =
            self.invoke(tools::COMPANY_NAME, &SymbolArgs { symbol }).await?;
        let name = raw.company_name.trim();
        if name.is_empty() {
            return Err(FetchError::empty(symbol, "company name"));
        }
        Ok(name.to_string())
    }

    async fn opening_price(&self, symbol: &str) -> Result<f64, FetchError> {
        let raw: OpeningPriceResponse =
            self.invoke(tools::OPENING_PRICE, &SymbolArgs { symbol }).await?;
        check_price(raw.opening_price, "opening price")
    }
}

#[async_trait]
impl HeadlineProvider for ToolServiceProvider {
    async fn headlines(&self, symbol: &str) -> Result<Vec<Headline>, FetchError> {
        let raw: NewsResponse = self.invoke(tools::STOCK_NEWS, &SymbolArgs { symbol }).await?;
        Ok(raw.into_headlines())
    }
}
