//! Regular-session mask in exchange-local civil time.
//!
//! A sample is kept when its exchange-local time of day falls in
//! `[open, close)`. There is no holiday calendar and no extended session;
//! closed days simply have no bars upstream. Kept samples are re-expressed in
//! the caller's display zone, and because the mask only looks at the instant,
//! filtering an already-filtered series changes nothing.

use chrono::{DateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::{errors::SeriesError, sample::Sample};

const fn hm(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(t) => t,
        None => panic!("invalid session time"),
    }
}

const US_OPEN: NaiveTime = hm(9, 30);
const US_CLOSE: NaiveTime = hm(16, 0);

/// An exchange's regular trading session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeCalendar {
    /// Display name, e.g. "NYSE".
    pub name: String,
    /// Exchange-local zone.
    pub tz: Tz,
    /// Session open, inclusive.
    pub open: NaiveTime,
    /// Session close, exclusive.
    pub close: NaiveTime,
}

impl ExchangeCalendar {
    /// A calendar with the given session; `None` unless `open < close`.
    pub fn new(name: impl Into<String>, tz: Tz, open: NaiveTime, close: NaiveTime) -> Option<Self> {
        (open < close).then(|| Self {
            name: name.into(),
            tz,
            open,
            close,
        })
    }

    /// New York Stock Exchange, 09:30–16:00 America/New_York.
    pub fn nyse() -> Self {
        Self {
            name: "NYSE".to_string(),
            tz: chrono_tz::America::New_York,
            open: US_OPEN,
            close: US_CLOSE,
        }
    }

    /// Nasdaq, same hours as the NYSE.
    pub fn nasdaq() -> Self {
        Self {
            name: "NASDAQ".to_string(),
            ..Self::nyse()
        }
    }

    /// London Stock Exchange, 08:00–16:30 Europe/London.
    pub fn lse() -> Self {
        Self {
            name: "LSE".to_string(),
            tz: chrono_tz::Europe::London,
            open: hm(8, 0),
            close: hm(16, 30),
        }
    }

    /// Xetra, 09:00–17:30 Europe/Berlin.
    pub fn xetra() -> Self {
        Self {
            name: "XETRA".to_string(),
            tz: chrono_tz::Europe::Berlin,
            open: hm(9, 0),
            close: hm(17, 30),
        }
    }

    /// Looks up a built-in calendar by case-insensitive code.
    pub fn by_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "nyse" => Some(Self::nyse()),
            "nasdaq" => Some(Self::nasdaq()),
            "lse" => Some(Self::lse()),
            "xetra" => Some(Self::xetra()),
            _ => None,
        }
    }

    /// `true` if `ts` falls inside the regular session, judged in exchange-local time.
    pub fn is_open_at<Z: TimeZone>(&self, ts: &DateTime<Z>) -> bool {
        let local = ts.with_timezone(&self.tz).time();
        local >= self.open && local < self.close
    }
}

/// Keeps the samples inside `calendar`'s session and re-expresses them in `display_tz`.
///
/// An empty result is reported as [`SeriesError::NoSessionData`] so callers
/// can show an explicit "no data" state.
pub fn filter(
    samples: &[Sample],
    calendar: &ExchangeCalendar,
    display_tz: Tz,
) -> Result<Vec<Sample>, SeriesError> {
    let kept: Vec<Sample> = samples
        .iter()
        .filter(|s| calendar.is_open_at(&s.timestamp()))
        .map(|s| s.in_tz(display_tz))
        .collect();

    if kept.is_empty() {
        return Err(SeriesError::NoSessionData {
            exchange: calendar.name.clone(),
        });
    }
    Ok(kept)
}

/// Re-expresses every sample in `display_tz` without masking.
pub fn to_display_tz(samples: &[Sample], display_tz: Tz) -> Vec<Sample> {
    samples.iter().map(|s| s.in_tz(display_tz)).collect()
}
