//! Dashboard configuration: TOML file, then environment overrides.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Precedence, lowest first:
//! 1. built-in defaults
//! 2. the TOML file passed to [`DashboardConfig::load_path`]
//! 3. environment variables applied by [`DashboardConfig::apply_env`]
//!
//! [`DashboardConfig::validate`] must pass before the values are turned into
//! [`Settings`] and client options.

use std::{fmt, num::NonZeroU32, num::NonZeroUsize, path::Path, time::Duration};

use chrono_tz::Tz;
use market_feed::providers::{ClientOptions, openweather, tool_service, yahoo_chart};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use shared_utils::env::get_optional_env_var;
use thiserror::Error;

use crate::{
    market_hours::ExchangeCalendar,
    metrics::DEFAULT_MA_WINDOW,
    pipeline::Settings,
    retry::RetryPolicy,
    series_store::{DEFAULT_RETENTION, ResetPolicy},
    tz::parse_tz,
};

/// Overrides the display zone.
pub const DISPLAY_TZ_ENV: &str = "TICKERBOARD_DISPLAY_TZ";
/// Overrides the exchange calendar.
pub const EXCHANGE_ENV: &str = "TICKERBOARD_EXCHANGE";
/// Refresh intervals the dashboard offers, in seconds.
pub const REFRESH_INTERVALS: [u64; 3] = [10, 15, 30];

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `display_tz` is not an IANA zone name.
    #[error("unknown display time zone: {0}")]
    InvalidTimezone(String),

    /// `exchange` names no built-in calendar.
    #[error("unknown exchange: {0} (expected nyse, nasdaq, lse or xetra)")]
    UnknownExchange(String),

    /// A numeric field is out of range.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Field name as written in the file.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Configuration of the dashboard and its clients.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct DashboardConfig {
    /// Tool service base URL (quotes, reference data, headlines).
    pub tool_service_url: String,
    /// History service base URL.
    pub history_base_url: String,
    /// Weather service base URL.
    pub weather_base_url: String,
    /// Weather API key; the weather widget is disabled without one.
    pub weather_api_key: Option<String>,
    /// Live samples kept per symbol.
    pub retention: usize,
    /// Moving-average window.
    pub moving_average_window: usize,
    /// Time-to-live of cached history, in seconds.
    pub cache_ttl_secs: u64,
    /// Attempts per history fetch.
    pub history_attempts: u32,
    /// Pause between history attempts, in milliseconds.
    pub retry_pause_ms: u64,
    /// HTTP timeout, in seconds.
    pub http_timeout_secs: u64,
    /// IANA zone chart timestamps are shown in.
    pub display_tz: String,
    /// Exchange calendar code.
    pub exchange: String,
    /// When a new symbol list counts as a change.
    pub reset_policy: ResetPolicy,
    /// Seconds between refresh passes; one of [`REFRESH_INTERVALS`].
    pub refresh_interval_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tool_service_url: tool_service::DEFAULT_BASE_URL.to_string(),
            history_base_url: yahoo_chart::DEFAULT_BASE_URL.to_string(),
            weather_base_url: openweather::DEFAULT_BASE_URL.to_string(),
            weather_api_key: None,
            retention: DEFAULT_RETENTION.get(),
            moving_average_window: DEFAULT_MA_WINDOW.get(),
            cache_ttl_secs: 600,
            history_attempts: 2,
            retry_pause_ms: 1000,
            http_timeout_secs: 10,
            display_tz: "UTC".to_string(),
            exchange: "nyse".to_string(),
            reset_policy: ResetPolicy::default(),
            refresh_interval_secs: 15,
        }
    }
}

// Hand-written so the API key never reaches a log line.
impl fmt::Debug for DashboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardConfig")
            .field("tool_service_url", &self.tool_service_url)
            .field("history_base_url", &self.history_base_url)
            .field("weather_base_url", &self.weather_base_url)
            .field("weather_api_key", &self.weather_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("retention", &self.retention)
            .field("moving_average_window", &self.moving_average_window)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("history_attempts", &self.history_attempts)
            .field("retry_pause_ms", &self.retry_pause_ms)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("display_tz", &self.display_tz)
            .field("exchange", &self.exchange)
            .field("reset_policy", &self.reset_policy)
            .field("refresh_interval_secs", &self.refresh_interval_secs)
            .finish()
    }
}

impl DashboardConfig {
    /// Parses a TOML document.
    pub fn load_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML file.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_str(&s)
    }

    /// Defaults overlaid with the environment.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    /// Overrides fields from set, non-blank environment variables.
    pub fn apply_env(&mut self) {
        if let Some(url) = get_optional_env_var(tool_service::BASE_URL_ENV) {
            self.tool_service_url = url;
        }
        if let Some(key) = get_optional_env_var(openweather::API_KEY_ENV) {
            self.weather_api_key = Some(key);
        }
        if let Some(tz) = get_optional_env_var(DISPLAY_TZ_ENV) {
            self.display_tz = tz;
        }
        if let Some(exchange) = get_optional_env_var(EXCHANGE_ENV) {
            self.exchange = exchange;
        }
    }

    /// Checks every field that can be out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.display_tz()?;
        self.calendar()?;
        self.positive("retention", self.retention)?;
        self.positive("moving_average_window", self.moving_average_window)?;
        self.positive("history_attempts", self.history_attempts as usize)?;
        self.positive("http_timeout_secs", self.http_timeout_secs as usize)?;
        if !REFRESH_INTERVALS.contains(&self.refresh_interval_secs) {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval_secs",
                message: format!("{} is not one of {REFRESH_INTERVALS:?}", self.refresh_interval_secs),
            });
        }
        Ok(())
    }

    fn positive(&self, field: &'static str, value: usize) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(value).ok_or_else(|| ConfigError::InvalidValue {
            field,
            message: "must be greater than zero".to_string(),
        })
    }

    /// The display zone.
    pub fn display_tz(&self) -> Result<Tz, ConfigError> {
        parse_tz(&self.display_tz).map_err(|_| ConfigError::InvalidTimezone(self.display_tz.clone()))
    }

    /// The exchange calendar.
    pub fn calendar(&self) -> Result<ExchangeCalendar, ConfigError> {
        ExchangeCalendar::by_code(&self.exchange).ok_or_else(|| ConfigError::UnknownExchange(self.exchange.clone()))
    }

    /// Options for every HTTP client.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }

    /// Retry rule for history fetches. Zero attempts is treated as one.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: NonZeroU32::new(self.history_attempts).unwrap_or(NonZeroU32::MIN),
            pause: Duration::from_millis(self.retry_pause_ms),
        }
    }

    /// Time-to-live of cached history.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Time between refresh passes.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// The weather API key as a secret, if configured.
    pub fn weather_api_key(&self) -> Option<SecretString> {
        self.weather_api_key.clone().map(SecretString::from)
    }

    /// Validates and converts into pass settings.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        self.validate()?;
        Ok(Settings {
            retention: self.positive("retention", self.retention)?,
            reset_policy: self.reset_policy,
            ma_window: self.positive("moving_average_window", self.moving_average_window)?,
            display_tz: self.display_tz()?,
            calendar: self.calendar()?,
            retry: self.retry_policy(),
            history_ttl: self.cache_ttl(),
        })
    }
}
