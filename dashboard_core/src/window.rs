//! Timeframe labels and the source/resolution each one maps to.
//!
//! | label         | source             | period | interval | session mask |
//! |---------------|--------------------|--------|----------|--------------|
//! | Last Hour     | live series, 60 min | 1d    | 1m       | yes          |
//! | Today         | history            | 1d     | 5m       | yes          |
//! | Last Week     | history            | 7d     | 15m      | yes          |
//! | Last Month    | history            | 1mo    | 1d       | no           |
//! | Last 3 Months | history            | 3mo    | 1d       | no           |
//! | Last Year     | history            | 1y     | 1wk      | no           |
//!
//! [`resolve`] is fail-soft: an unknown label logs a warning and yields the
//! `Today` window. [`WindowLabel::from_str`] is the strict variant.

use std::{fmt, str::FromStr};

use chrono::DateTime;
use chrono_tz::Tz;
use market_feed::models::{
    request_params::HistoryRequest,
    timeframe::{Period, TimeFrame},
};
use thiserror::Error;
use tracing::warn;

/// Timeframes a viewer can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowLabel {
    /// Live samples of the last 60 minutes.
    LastHour,
    /// Today's session at 5-minute resolution.
    Today,
    /// Seven days at 15-minute resolution.
    LastWeek,
    /// One month of daily closes.
    LastMonth,
    /// Three months of daily closes.
    LastThreeMonths,
    /// One year of weekly closes.
    LastYear,
}

/// A label string that names no known window.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown timeframe: {0:?}")]
pub struct UnknownWindow(pub String);

impl WindowLabel {
    /// Every label, shortest window first.
    pub const ALL: [WindowLabel; 6] = [
        WindowLabel::LastHour,
        WindowLabel::Today,
        WindowLabel::LastWeek,
        WindowLabel::LastMonth,
        WindowLabel::LastThreeMonths,
        WindowLabel::LastYear,
    ];

    /// Label used when a request names no known window.
    pub const FALLBACK: WindowLabel = WindowLabel::Today;

    /// Human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            WindowLabel::LastHour => "Last Hour",
            WindowLabel::Today => "Today",
            WindowLabel::LastWeek => "Last Week",
            WindowLabel::LastMonth => "Last Month",
            WindowLabel::LastThreeMonths => "Last 3 Months",
            WindowLabel::LastYear => "Last Year",
        }
    }

    /// The concrete window for this label.
    pub fn spec(self) -> WindowSpec {
        use WindowLabel::*;
        let (source, period, interval, market_hours_only) = match self {
            LastHour => (
                WindowSource::LiveSeries { lookback_minutes: 60 },
                Period::days(1),
                TimeFrame::minutes(1),
                true,
            ),
            Today => (WindowSource::Historical, Period::days(1), TimeFrame::minutes(5), true),
            LastWeek => (WindowSource::Historical, Period::days(7), TimeFrame::minutes(15), true),
            LastMonth => (WindowSource::Historical, Period::months(1), TimeFrame::day(), false),
            LastThreeMonths => (WindowSource::Historical, Period::months(3), TimeFrame::day(), false),
            LastYear => (WindowSource::Historical, Period::years(1), TimeFrame::week(), false),
        };
        let label_format = if interval.is_intraday() {
            LabelFormat::Intraday
        } else {
            LabelFormat::Daily
        };
        WindowSpec {
            label: self,
            source,
            period,
            interval,
            market_hours_only,
            label_format,
        }
    }
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowLabel {
    type Err = UnknownWindow;

    /// Case-insensitive; runs of whitespace count as one space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.split_whitespace().collect::<Vec<_>>().join(" ");
        WindowLabel::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownWindow(s.to_string()))
    }
}

/// Where a window's samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowSource {
    /// The session's accumulated live quotes, limited to a look-back.
    LiveSeries {
        /// Minutes of live samples to keep, counted back from now.
        lookback_minutes: i64,
    },
    /// A bar series from the history provider.
    Historical,
}

/// How chart points are labeled on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelFormat {
    /// `Mar 04 14:30`
    Intraday,
    /// `Mar 04`
    Daily,
}

impl LabelFormat {
    /// The strftime pattern for this format.
    pub fn pattern(self) -> &'static str {
        match self {
            LabelFormat::Intraday => "%b %d %H:%M",
            LabelFormat::Daily => "%b %d",
        }
    }

    /// Formats `ts` in its own zone.
    pub fn format(self, ts: &DateTime<Tz>) -> String {
        ts.format(self.pattern()).to_string()
    }
}

/// A resolved window: source, look-back, resolution and display rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowSpec {
    /// The label this window was resolved from.
    pub label: WindowLabel,
    /// Live series or history provider.
    pub source: WindowSource,
    /// Look-back of the history request.
    pub period: Period,
    /// Bar interval of the history request.
    pub interval: TimeFrame,
    /// Whether to apply the exchange session mask.
    pub market_hours_only: bool,
    /// Time-axis label format.
    pub label_format: LabelFormat,
}

impl WindowSpec {
    /// The history request for `symbol`, or `None` for live windows.
    pub fn history_request(&self, symbol: &str) -> Option<HistoryRequest> {
        match self.source {
            WindowSource::Historical => Some(HistoryRequest::new(symbol, self.period, self.interval)),
            WindowSource::LiveSeries { .. } => None,
        }
    }
}

/// Maps a timeframe label to its window, falling back to
/// [`WindowLabel::FALLBACK`] for unknown labels.
pub fn resolve(label: &str) -> WindowSpec {
    match label.parse::<WindowLabel>() {
        Ok(l) => l.spec(),
        Err(err) => {
            warn!(%err, fallback = %WindowLabel::FALLBACK, "using fallback window");
            WindowLabel::FALLBACK.spec()
        }
    }
}
