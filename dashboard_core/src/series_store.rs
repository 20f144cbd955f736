//! Session-scoped, size-bounded live sample series per symbol.
//!
//! Samples arrive one per refresh pass from the quote service. Each symbol
//! keeps at most `retention` samples; the oldest are dropped first. The
//! whole store is cleared when the tracked symbol set changes.

use std::{collections::VecDeque, num::NonZeroUsize};

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{errors::SeriesError, sample::Sample};

/// Samples kept per symbol unless configured otherwise.
pub const DEFAULT_RETENTION: NonZeroUsize = nonzero!(50usize);

/// How a new tracked-symbol request is compared against the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Same symbols in any order is no change.
    #[default]
    SetEquality,
    /// Any difference in the ordered list, including a pure reorder, resets.
    OrderSensitive,
}

/// Bounded FIFO sample series keyed by symbol.
#[derive(Debug)]
pub struct SeriesStore {
    retention: NonZeroUsize,
    policy: ResetPolicy,
    tracked: Option<Vec<String>>,
    series: IndexMap<String, VecDeque<Sample>>,
}

impl Default for SeriesStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION, ResetPolicy::default())
    }
}

impl SeriesStore {
    /// Creates an empty store tracking nothing yet.
    pub fn new(retention: NonZeroUsize, policy: ResetPolicy) -> Self {
        Self {
            retention,
            policy,
            tracked: None,
            series: IndexMap::new(),
        }
    }

    /// Maximum samples kept per symbol.
    pub fn retention(&self) -> NonZeroUsize {
        self.retention
    }

    /// The symbol list of the last accepted reset, in request order.
    pub fn tracked(&self) -> &[String] {
        self.tracked.as_deref().unwrap_or_default()
    }

    /// `true` if `requested` would trigger a reset under the store's policy.
    pub fn is_change(&self, requested: &[String]) -> bool {
        let Some(previous) = &self.tracked else {
            return true;
        };
        match self.policy {
            ResetPolicy::OrderSensitive => previous.as_slice() != requested,
            ResetPolicy::SetEquality => {
                let a: IndexSet<&str> = previous.iter().map(String::as_str).collect();
                let b: IndexSet<&str> = requested.iter().map(String::as_str).collect();
                // IndexSet equality ignores order.
                a != b
            }
        }
    }

    /// Starts a new tracking period if `requested` differs from the last one.
    ///
    /// On a change every stored series is discarded and an empty series is
    /// created for each requested symbol. Returns whether a reset happened.
    pub fn reset(&mut self, requested: &[String]) -> bool {
        if !self.is_change(requested) {
            return false;
        }
        info!(
            previous = ?self.tracked(),
            requested = ?requested,
            "tracked symbols changed, clearing live series"
        );
        self.series = requested
            .iter()
            .map(|s| (s.clone(), VecDeque::with_capacity(self.retention.get())))
            .collect();
        self.tracked = Some(requested.to_vec());
        true
    }

    /// Appends `sample` to `symbol`'s series and trims it to the retention bound.
    ///
    /// A sample older than the newest stored one is rejected so the series
    /// stays time-ordered; equal timestamps are accepted.
    pub fn record(&mut self, symbol: &str, sample: Sample) -> Result<(), SeriesError> {
        let series = self.series.entry(symbol.to_string()).or_default();
        if let Some(last) = series.back() {
            if sample.utc() < last.utc() {
                return Err(SeriesError::OutOfOrder {
                    symbol: symbol.to_string(),
                    latest: last.utc(),
                    incoming: sample.utc(),
                });
            }
        }
        series.push_back(sample);
        while series.len() > self.retention.get() {
            series.pop_front();
        }
        Ok(())
    }

    /// All stored samples for `symbol`, oldest first.
    pub fn samples(&self, symbol: &str) -> Vec<Sample> {
        self.series
            .get(symbol)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Stored samples observed at or after `cutoff`, oldest first.
    pub fn since(&self, symbol: &str, cutoff: DateTime<Utc>) -> Vec<Sample> {
        self.series
            .get(symbol)
            .map(|s| s.iter().filter(|x| x.utc() >= cutoff).copied().collect())
            .unwrap_or_default()
    }

    /// The newest sample for `symbol`.
    pub fn latest(&self, symbol: &str) -> Option<&Sample> {
        self.series.get(symbol).and_then(|s| s.back())
    }

    /// Number of samples stored for `symbol`.
    pub fn len(&self, symbol: &str) -> usize {
        self.series.get(symbol).map_or(0, VecDeque::len)
    }

    /// `true` if no symbol holds any sample.
    pub fn is_empty(&self) -> bool {
        self.series.values().all(VecDeque::is_empty)
    }
}
