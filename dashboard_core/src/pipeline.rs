//! The refresh pass: one sequential walk over the tracked symbols that turns
//! provider answers into display-ready panels.
//!
//! Per symbol the pass
//! 1. fetches a live quote and appends it to the session's series,
//! 2. fills any missing reference data (name, session open, previous close),
//! 3. obtains the window's samples from the live series or the history client,
//! 4. applies the session mask or re-expresses the samples in the display zone,
//! 5. computes the derived metrics.
//!
//! A failure at any step is recorded on that symbol's [`SymbolPanel`]; it
//! never aborts the pass or affects another symbol.

use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use indexmap::IndexSet;
use market_feed::{
    errors::FetchError,
    models::{bar::BarSeries, request_params::HistoryRequest},
    providers::{HistoryProvider, QuoteProvider, ReferenceProvider},
};
use tracing::{debug, warn};

use crate::{
    cache::{Clock, DEFAULT_TTL, SystemClock, TtlCache},
    errors::DashboardError,
    market_hours::{self, ExchangeCalendar},
    metrics::{self, DEFAULT_MA_WINDOW, DerivedMetrics},
    retry::{RetryPolicy, retry_fixed},
    sample::Sample,
    series_store::{DEFAULT_RETENTION, ResetPolicy},
    session::SessionContext,
    window::{self, WindowLabel, WindowSource, WindowSpec},
};

/// The upstream clients a dashboard reads from.
#[derive(Clone)]
pub struct Providers {
    /// Live quotes.
    pub quotes: Arc<dyn QuoteProvider>,
    /// Historical bars and previous closes.
    pub history: Arc<dyn HistoryProvider>,
    /// Company names and opening prices.
    pub reference: Arc<dyn ReferenceProvider>,
}

/// Tunables of the refresh pass.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Live samples kept per symbol.
    pub retention: NonZeroUsize,
    /// When a new symbol list counts as a change.
    pub reset_policy: ResetPolicy,
    /// Moving-average window.
    pub ma_window: NonZeroUsize,
    /// Zone chart timestamps are shown in.
    pub display_tz: Tz,
    /// Session used by market-hours-only windows.
    pub calendar: ExchangeCalendar,
    /// Retry rule for history fetches.
    pub retry: RetryPolicy,
    /// How long fetched history stays fresh.
    pub history_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            reset_policy: ResetPolicy::default(),
            ma_window: DEFAULT_MA_WINDOW,
            display_tz: Tz::UTC,
            calendar: ExchangeCalendar::nyse(),
            retry: RetryPolicy::default(),
            history_ttl: DEFAULT_TTL,
        }
    }
}

/// One charted point.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Observation time in the display zone.
    pub timestamp: DateTime<Tz>,
    /// Time-axis label.
    pub label: String,
    /// Observed price.
    pub price: f64,
    /// Trailing moving average at this point.
    pub moving_average: f64,
}

/// Chart and metrics for a symbol that had data.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelData {
    /// Points in time order.
    pub points: Vec<ChartPoint>,
    /// Derived figures for the points.
    pub metrics: DerivedMetrics,
}

/// What a panel can show.
#[derive(Debug)]
pub enum PanelState {
    /// A chart and metrics.
    Ready(PanelData),
    /// The upstream answered but there was nothing to show for the window.
    NoData(DashboardError),
    /// The upstream could not be reached or failed.
    Failed(DashboardError),
}

impl PanelState {
    fn from_error(err: DashboardError) -> Self {
        if err.is_data_absent() {
            PanelState::NoData(err)
        } else {
            PanelState::Failed(err)
        }
    }
}

/// Display-ready result for one symbol.
#[derive(Debug)]
pub struct SymbolPanel {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name, or the symbol when the name is not known yet.
    pub company_name: String,
    /// Window the panel was built for.
    pub window: WindowLabel,
    /// Chart and metrics, or why there are none.
    pub state: PanelState,
    /// Non-fatal problems met while building the panel.
    pub warnings: Vec<DashboardError>,
    /// Instant of the pass that built the panel.
    pub updated_at: DateTime<Utc>,
}

impl SymbolPanel {
    /// The chart and metrics, if the panel has any.
    pub fn data(&self) -> Option<&PanelData> {
        match &self.state {
            PanelState::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// The error that kept the panel from showing data.
    pub fn error(&self) -> Option<&DashboardError> {
        match &self.state {
            PanelState::Ready(_) => None,
            PanelState::NoData(err) | PanelState::Failed(err) => Some(err),
        }
    }
}

/// Splits comma-separated entries, trims and uppercases them, and drops
/// empties and repeats while keeping first-seen order.
pub fn normalize_symbols<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .flat_map(|entry| entry.as_ref().split(','))
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// A live dashboard session.
pub struct Dashboard {
    providers: Providers,
    clock: Arc<dyn Clock>,
    settings: Settings,
    session: Option<SessionContext>,
}

impl Dashboard {
    /// A dashboard on wall-clock time. The session starts with the first refresh.
    pub fn new(providers: Providers, settings: Settings) -> Self {
        Self {
            providers,
            clock: Arc::new(SystemClock),
            settings,
            session: None,
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The pass tunables.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The session state, once the first refresh has run.
    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    /// Runs one refresh pass for `symbols` over the window named `timeframe`.
    ///
    /// Unknown window labels fall back to [`WindowLabel::FALLBACK`]. Returns
    /// one panel per normalized symbol, in request order.
    pub async fn refresh<S: AsRef<str>>(&mut self, symbols: &[S], timeframe: &str) -> Vec<SymbolPanel> {
        let symbols = normalize_symbols(symbols);
        let spec = window::resolve(timeframe);
        let now = self.clock.now();

        let settings = &self.settings;
        let session = self.session.get_or_insert_with(|| {
            SessionContext::new(settings.retention, settings.reset_policy, settings.history_ttl)
        });
        session.track(&symbols);
        session.history_mut().purge_expired(now);

        let pass = Pass {
            providers: &self.providers,
            settings,
            spec,
            now,
        };
        let mut panels = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            panels.push(pass.panel(session, symbol).await);
        }
        debug!(
            symbols = symbols.len(),
            window = %spec.label,
            ready = panels.iter().filter(|p| p.data().is_some()).count(),
            "refresh pass complete"
        );
        panels
    }
}

struct Pass<'a> {
    providers: &'a Providers,
    settings: &'a Settings,
    spec: WindowSpec,
    now: DateTime<Utc>,
}

impl Pass<'_> {
    async fn panel(&self, session: &mut SessionContext, symbol: &str) -> SymbolPanel {
        let mut warnings = Vec::new();

        self.record_quote(session, symbol, &mut warnings).await;
        self.load_reference(session, symbol, &mut warnings).await;

        let state = match self.build(session, symbol, &mut warnings).await {
            Ok(data) => PanelState::Ready(data),
            Err(err) => {
                warn!(symbol, error = %err, "panel has no chart");
                PanelState::from_error(err)
            }
        };

        SymbolPanel {
            symbol: symbol.to_string(),
            company_name: session.references().display_name(symbol),
            window: self.spec.label,
            state,
            warnings,
            updated_at: self.now,
        }
    }

    async fn record_quote(&self, session: &mut SessionContext, symbol: &str, warnings: &mut Vec<DashboardError>) {
        let quote = match self.providers.quotes.latest_quote(symbol).await {
            Ok(q) => q,
            Err(err) => {
                warn!(symbol, error = %err, "live quote unavailable");
                warnings.push(DashboardError::from_fetch(symbol, err));
                return;
            }
        };
        let recorded = Sample::from_quote(&quote).and_then(|s| session.store_mut().record(symbol, s));
        if let Err(err) = recorded {
            warn!(symbol, error = %err, "live quote not recorded");
            warnings.push(DashboardError::from_series(symbol, &err));
        }
    }

    /// Fetches whichever reference fields are still missing. Only successes
    /// are cached, so a failed field is tried again next pass.
    async fn load_reference(&self, session: &mut SessionContext, symbol: &str, warnings: &mut Vec<DashboardError>) {
        let cached = session.references().get(symbol).cloned().unwrap_or_default();
        let reference = self.providers.reference.as_ref();

        if cached.company_name.is_none() {
            match reference.company_name(symbol).await {
                Ok(name) => {
                    session.references_mut().set_company_name(symbol, name);
                }
                Err(err) => warnings.push(DashboardError::from_fetch(symbol, err)),
            }
        }

        if cached.opening_price.is_none() {
            match reference.opening_price(symbol).await {
                Ok(open) => {
                    session.references_mut().set_opening_price(symbol, open);
                }
                Err(err) => warnings.push(DashboardError::from_fetch(symbol, err)),
            }
        }

        if cached.previous_close.is_none() {
            let request = HistoryRequest::previous_close(symbol);
            let fetched = cached_history(
                session.history_mut(),
                self.providers.history.as_ref(),
                &self.settings.retry,
                request,
                self.now,
            )
            .await;
            match fetched.map(|series| series.previous_close()) {
                Ok(Some(close)) => {
                    session.references_mut().set_previous_close(symbol, close);
                }
                Ok(None) => warnings.push(DashboardError::DataAbsent {
                    symbol: symbol.to_string(),
                    what: "previous close".to_string(),
                }),
                Err(err) => warnings.push(DashboardError::from_fetch(symbol, err)),
            }
        }
    }

    async fn build(
        &self,
        session: &mut SessionContext,
        symbol: &str,
        warnings: &mut Vec<DashboardError>,
    ) -> Result<PanelData, DashboardError> {
        let raw = self.window_samples(session, symbol).await?;

        let samples = if self.spec.market_hours_only {
            market_hours::filter(&raw, &self.settings.calendar, self.settings.display_tz)
                .map_err(|e| DashboardError::from_series(symbol, &e))?
        } else {
            market_hours::to_display_tz(&raw, self.settings.display_tz)
        };

        let reference = session.references().get(symbol).cloned().unwrap_or_default();
        if reference.opening_price.is_none() {
            warnings.push(DashboardError::ComputationSkipped {
                symbol: symbol.to_string(),
                metric: "change since open",
            });
        }
        if reference.previous_close.is_none() {
            warnings.push(DashboardError::ComputationSkipped {
                symbol: symbol.to_string(),
                metric: "change since previous close",
            });
        }

        let metrics = metrics::compute(
            &samples,
            reference.opening_price,
            reference.previous_close,
            self.settings.ma_window,
        )
        .map_err(|_| DashboardError::DataAbsent {
            symbol: symbol.to_string(),
            what: "samples".to_string(),
        })?;

        let points = samples
            .iter()
            .zip(&metrics.moving_average)
            .map(|(s, ma)| ChartPoint {
                timestamp: s.timestamp(),
                label: self.spec.label_format.format(&s.timestamp()),
                price: s.price(),
                moving_average: *ma,
            })
            .collect();

        Ok(PanelData { points, metrics })
    }

    async fn window_samples(&self, session: &mut SessionContext, symbol: &str) -> Result<Vec<Sample>, DashboardError> {
        match self.spec.source {
            WindowSource::LiveSeries { lookback_minutes } => {
                let cutoff = self.now - TimeDelta::minutes(lookback_minutes);
                let samples = session.store().since(symbol, cutoff);
                if samples.is_empty() {
                    return Err(DashboardError::DataAbsent {
                        symbol: symbol.to_string(),
                        what: format!("live samples in the last {lookback_minutes} minutes"),
                    });
                }
                Ok(samples)
            }
            WindowSource::Historical => {
                let request = HistoryRequest::new(symbol, self.spec.period, self.spec.interval);
                let series = cached_history(
                    session.history_mut(),
                    self.providers.history.as_ref(),
                    &self.settings.retry,
                    request,
                    self.now,
                )
                .await
                .map_err(|e| DashboardError::from_fetch(symbol, e))?;
                Ok(series.bars.iter().filter_map(|b| Sample::from_bar(b).ok()).collect())
            }
        }
    }
}

/// Validation and empty answers will not change on a second try.
fn is_retryable(err: &FetchError) -> bool {
    !matches!(err, FetchError::Validation(_) | FetchError::Empty { .. })
}

async fn cached_history(
    cache: &mut TtlCache<HistoryRequest, BarSeries>,
    provider: &dyn HistoryProvider,
    retry: &RetryPolicy,
    request: HistoryRequest,
    now: DateTime<Utc>,
) -> Result<BarSeries, FetchError> {
    let what = format!("history {} {}/{}", request.symbol, request.period, request.interval);
    cache
        .get_or_try_insert_with(request.clone(), now, || {
            retry_fixed(retry, &what, is_retryable, || provider.fetch_history(&request))
        })
        .await
}
