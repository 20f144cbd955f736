//! Derived figures for one filtered, time-ordered series.
//!
//! All arithmetic keeps full `f64` precision; rounding to cents happens in
//! [`crate::display`] only.

use std::num::NonZeroUsize;

use nonzero_ext::nonzero;

use crate::{errors::MetricsError, sample::Sample};

/// Trailing moving-average window unless configured otherwise.
pub const DEFAULT_MA_WINDOW: NonZeroUsize = nonzero!(5usize);

/// Absolute and relative move of the latest price against a reference price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    /// `latest - reference`.
    pub delta: f64,
    /// `delta / reference * 100`, or 0 when the reference is 0.
    pub percent: f64,
}

impl Change {
    /// The move from `reference` to `latest`.
    pub fn between(latest: f64, reference: f64) -> Self {
        let delta = latest - reference;
        let percent = if reference != 0.0 {
            delta / reference * 100.0
        } else {
            0.0
        };
        Self { delta, percent }
    }

    /// `true` for a flat or upward move.
    pub fn is_gain(&self) -> bool {
        self.delta >= 0.0
    }
}

/// Everything the presentation layer shows for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    /// Trailing mean aligned index-for-index with the input samples.
    pub moving_average: Vec<f64>,
    /// Price of the newest sample.
    pub latest_price: f64,
    /// Newest minus second-newest price, 0 with a single sample.
    pub instant_delta: f64,
    /// Move since the session open; `None` when the open is unknown.
    pub session: Option<Change>,
    /// Move since the previous session close; `None` when that close is unknown.
    pub previous_close: Option<Change>,
    /// Move since the first sample of the window.
    pub window: Change,
}

/// Simple trailing mean. Leading points average the samples available so
/// far, so position `i` uses `min(window, i + 1)` prices.
pub fn moving_average(prices: &[f64], window: NonZeroUsize) -> Vec<f64> {
    (0..prices.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window.get());
            let slice = &prices[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Computes [`DerivedMetrics`] for `samples`.
///
/// * `session_open` - today's opening price; when absent the
///   corresponding field is `None`.
/// * `previous_close` - the prior session's close; when absent the
///   corresponding field is `None`.
///
/// Returns [`MetricsError::NoData`] for an empty series.
pub fn compute(
    samples: &[Sample],
    session_open: Option<f64>,
    previous_close: Option<f64>,
    window: NonZeroUsize,
) -> Result<DerivedMetrics, MetricsError> {
    let prices: Vec<f64> = samples.iter().map(Sample::price).collect();
    let (&latest_price, &first_price) = match (prices.last(), prices.first()) {
        (Some(last), Some(first)) => (last, first),
        _ => return Err(MetricsError::NoData),
    };

    let instant_delta = match prices.len() {
        n if n >= 2 => latest_price - prices[n - 2],
        _ => 0.0,
    };

    Ok(DerivedMetrics {
        moving_average: moving_average(&prices, window),
        latest_price,
        instant_delta,
        session: session_open.map(|open| Change::between(latest_price, open)),
        previous_close: previous_close.map(|close| Change::between(latest_price, close)),
        window: Change::between(latest_price, first_price),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use chrono_tz::Tz;

    use super::*;

    fn series(prices: &[f64]) -> Vec<Sample> {
        let base = Tz::UTC.with_ymd_and_hms(2025, 3, 4, 15, 0, 0).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| Sample::new(base + Duration::minutes(i as i64), *p).unwrap())
            .collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn partial_leading_windows() {
        assert_eq!(moving_average(&[1.0, 2.0, 3.0], nonzero!(5usize)), vec![1.0, 1.5, 2.0]);
        assert_eq!(
            moving_average(&[1.0, 2.0, 3.0, 4.0], nonzero!(2usize)),
            vec![1.0, 1.5, 2.5, 3.5]
        );
        assert!(moving_average(&[], DEFAULT_MA_WINDOW).is_empty());
    }

    #[test]
    fn reference_scenario() {
        let samples = series(&[100.0, 100.0, 102.0]);
        let m = compute(&samples, Some(99.0), Some(98.0), DEFAULT_MA_WINDOW).unwrap();

        assert!(close(m.latest_price, 102.0));
        assert!(close(m.instant_delta, 2.0));
        let session = m.session.unwrap();
        assert!(close(session.delta, 3.0));
        assert!(close(session.percent, 300.0 / 99.0));
        let prev = m.previous_close.unwrap();
        assert!(close(prev.delta, 4.0));
        assert!(close(prev.percent, 400.0 / 98.0));
        assert!(close(m.window.delta, 2.0));
        assert!(close(m.window.percent, 2.0));
    }

    #[test]
    fn zero_open_gives_zero_percent_and_missing_open_is_omitted() {
        let samples = series(&[10.0, 11.0]);

        let zero = compute(&samples, Some(0.0), None, DEFAULT_MA_WINDOW).unwrap();
        let session = zero.session.unwrap();
        assert_eq!(session.percent, 0.0);
        assert!(close(session.delta, 11.0));

        let missing = compute(&samples, None, None, DEFAULT_MA_WINDOW).unwrap();
        assert!(missing.session.is_none());
    }

    #[test]
    fn missing_previous_close_is_observable() {
        let m = compute(&series(&[10.0]), Some(9.0), None, DEFAULT_MA_WINDOW).unwrap();
        assert!(m.previous_close.is_none());

        let zero = compute(&series(&[10.0]), Some(9.0), Some(0.0), DEFAULT_MA_WINDOW).unwrap();
        assert_eq!(zero.previous_close.unwrap().percent, 0.0);
    }

    #[test]
    fn single_sample_has_flat_instant_delta() {
        let m = compute(&series(&[42.0]), None, None, DEFAULT_MA_WINDOW).unwrap();
        assert_eq!(m.instant_delta, 0.0);
        assert_eq!(m.moving_average, vec![42.0]);
    }

    #[test]
    fn empty_series_is_no_data() {
        assert_eq!(
            compute(&[], Some(1.0), Some(1.0), DEFAULT_MA_WINDOW),
            Err(MetricsError::NoData)
        );
    }

    #[test]
    fn change_direction() {
        assert!(Change::between(10.0, 10.0).is_gain());
        assert!(!Change::between(9.0, 10.0).is_gain());
    }
}
