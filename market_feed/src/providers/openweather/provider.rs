use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use tracing::debug;

use crate::{
    errors::{FetchError, ProviderInitError, normalize_base_url},
    models::widgets::Weather,
    providers::{
        ClientOptions, WeatherProvider, openweather::response::WeatherResponse, read_json,
        status_error,
    },
};

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

pub struct OpenWeatherProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl OpenWeatherProvider {
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        options: &ClientOptions,
    ) -> Result<Self, ProviderInitError> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Creates a provider reading the API key from `OPENWEATHER_API_KEY`.
    pub fn from_env(base_url: &str, options: &ClientOptions) -> Result<Self, ProviderInitError> {
        let api_key = SecretString::new(get_env_var(API_KEY_ENV)?.into());
        Self::new(base_url, api_key, options)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> Result<Weather, FetchError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        debug!(%url, city, "fetching weather");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.expose_secret()),
                ("units", "imperial"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let raw: WeatherResponse = read_json(response).await?;
        Weather::try_from(raw)
    }
}
