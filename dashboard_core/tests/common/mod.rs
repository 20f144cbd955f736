#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dashboard_core::{
    cache::{Clock, ManualClock},
    pipeline::{Dashboard, Providers, Settings},
    retry::RetryPolicy,
};
use market_feed::{
    errors::FetchError,
    models::{
        bar::{Bar, BarSeries},
        quote::Quote,
        request_params::HistoryRequest,
    },
    providers::{HistoryProvider, QuoteProvider, ReferenceProvider},
};
use nonzero_ext::nonzero;

/// Tuesday 2025-03-04 10:00 in New York, inside the NYSE session.
pub fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 4, 15, 0, 0).unwrap()
}

/// Bars one day apart, ending the day before `session_start`.
pub fn daily_bars(prices: &[f64]) -> Vec<Bar> {
    let last = session_start() - chrono::Duration::days(1);
    let n = prices.len() as i64;
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| Bar {
            timestamp: last - chrono::Duration::days(n - 1 - i as i64),
            close: *p,
            volume: Some(1_000),
        })
        .collect()
}

fn empty(symbol: &str, what: &str) -> FetchError {
    FetchError::Empty {
        symbol: symbol.to_string(),
        what: what.to_string(),
    }
}

fn down() -> FetchError {
    FetchError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

/// In-memory market answering every provider trait, with call logs.
#[derive(Default)]
pub struct FakeMarket {
    clock: Option<Arc<ManualClock>>,
    prices: Mutex<HashMap<String, f64>>,
    names: Mutex<HashMap<String, String>>,
    opens: Mutex<HashMap<String, f64>>,
    previous_closes: Mutex<HashMap<String, f64>>,
    bars: Mutex<HashMap<String, Vec<Bar>>>,
    broken: Mutex<HashSet<String>>,
    history_failures_left: Mutex<usize>,
    history_log: Mutex<Vec<HistoryRequest>>,
    quote_log: Mutex<Vec<String>>,
}

impl FakeMarket {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock: Some(clock),
            ..Self::default()
        }
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
    }

    pub fn set_reference(&self, symbol: &str, name: &str, open: f64, previous_close: f64) {
        self.names.lock().unwrap().insert(symbol.to_string(), name.to_string());
        self.opens.lock().unwrap().insert(symbol.to_string(), open);
        self.previous_closes
            .lock()
            .unwrap()
            .insert(symbol.to_string(), previous_close);
    }

    pub fn set_bars(&self, symbol: &str, bars: Vec<Bar>) {
        self.bars.lock().unwrap().insert(symbol.to_string(), bars);
    }

    /// Every call for `symbol` fails with a 503.
    pub fn break_symbol(&self, symbol: &str) {
        self.broken.lock().unwrap().insert(symbol.to_string());
    }

    /// The next `n` history calls fail with a 503.
    pub fn fail_history(&self, n: usize) {
        *self.history_failures_left.lock().unwrap() = n;
    }

    pub fn history_calls(&self, request: &HistoryRequest) -> usize {
        self.history_log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| *r == request)
            .count()
    }

    pub fn quote_calls(&self, symbol: &str) -> usize {
        self.quote_log
            .lock()
            .unwrap()
            .iter()
            .filter(|s| *s == symbol)
            .count()
    }

    fn is_broken(&self, symbol: &str) -> bool {
        self.broken.lock().unwrap().contains(symbol)
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.as_ref().map_or_else(session_start, |c| c.now())
    }
}

#[async_trait]
impl QuoteProvider for FakeMarket {
    async fn latest_quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        self.quote_log.lock().unwrap().push(symbol.to_string());
        if self.is_broken(symbol) {
            return Err(down());
        }
        let price = self.prices.lock().unwrap().get(symbol).copied();
        price
            .map(|price| Quote {
                symbol: symbol.to_string(),
                timestamp: self.now(),
                price,
            })
            .ok_or_else(|| empty(symbol, "quote"))
    }
}

#[async_trait]
impl HistoryProvider for FakeMarket {
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<BarSeries, FetchError> {
        self.history_log.lock().unwrap().push(request.clone());
        {
            let mut left = self.history_failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(down());
            }
        }
        let symbol = request.symbol.as_str();
        if self.is_broken(symbol) {
            return Err(down());
        }

        let bars = if *request == HistoryRequest::previous_close(symbol) {
            let close = self.previous_closes.lock().unwrap().get(symbol).copied();
            let today = self.prices.lock().unwrap().get(symbol).copied();
            match (close, today) {
                (Some(c), Some(t)) => daily_bars(&[c, t]),
                _ => Vec::new(),
            }
        } else {
            self.bars.lock().unwrap().get(symbol).cloned().unwrap_or_default()
        };

        if bars.is_empty() {
            return Err(empty(symbol, "historical bars"));
        }
        Ok(BarSeries {
            symbol: symbol.to_string(),
            interval: request.interval,
            bars,
        })
    }
}

#[async_trait]
impl ReferenceProvider for FakeMarket {
    async fn company_name(&self, symbol: &str) -> Result<String, FetchError> {
        if self.is_broken(symbol) {
            return Err(down());
        }
        let name = self.names.lock().unwrap().get(symbol).cloned();
        name.ok_or_else(|| empty(symbol, "company name"))
    }

    async fn opening_price(&self, symbol: &str) -> Result<f64, FetchError> {
        if self.is_broken(symbol) {
            return Err(down());
        }
        let open = self.opens.lock().unwrap().get(symbol).copied();
        open.ok_or_else(|| empty(symbol, "opening price"))
    }
}

/// Default settings with a retry pause short enough for tests.
pub fn quick_settings() -> Settings {
    Settings {
        retry: RetryPolicy {
            attempts: nonzero!(2u32),
            pause: Duration::from_millis(1),
        },
        ..Settings::default()
    }
}

pub fn dashboard(market: &Arc<FakeMarket>, clock: &Arc<ManualClock>, settings: Settings) -> Dashboard {
    let providers = Providers {
        quotes: market.clone(),
        history: market.clone(),
        reference: market.clone(),
    };
    Dashboard::new(providers, settings).with_clock(clock.clone())
}

pub fn setup() -> (Arc<ManualClock>, Arc<FakeMarket>) {
    let clock = Arc::new(ManualClock::new(session_start()));
    let market = Arc::new(FakeMarket::new(clock.clone()));
    (clock, market)
}
