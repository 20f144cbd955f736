//! Per-session state that outlives a single refresh pass.

use std::{num::NonZeroUsize, time::Duration};

use market_feed::models::{bar::BarSeries, request_params::HistoryRequest};

use crate::{
    cache::TtlCache,
    reference::ReferenceCache,
    series_store::{ResetPolicy, SeriesStore},
};

/// Everything a dashboard session accumulates: live series, reference data
/// and cached history.
///
/// The history cache is keyed by request arguments, not by session symbols,
/// so it survives a change of tracked symbols.
#[derive(Debug)]
pub struct SessionContext {
    store: SeriesStore,
    references: ReferenceCache,
    history: TtlCache<HistoryRequest, BarSeries>,
}

impl SessionContext {
    /// An empty session.
    pub fn new(retention: NonZeroUsize, policy: ResetPolicy, history_ttl: Duration) -> Self {
        Self {
            store: SeriesStore::new(retention, policy),
            references: ReferenceCache::default(),
            history: TtlCache::new(history_ttl),
        }
    }

    /// Applies the reset rule for `symbols`. On a change the live series and
    /// every reference entry are discarded. Returns whether a reset happened.
    pub fn track(&mut self, symbols: &[String]) -> bool {
        let reset = self.store.reset(symbols);
        if reset {
            self.references.clear();
        }
        reset
    }

    /// Live series.
    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Live series, mutable.
    pub fn store_mut(&mut self) -> &mut SeriesStore {
        &mut self.store
    }

    /// Reference data.
    pub fn references(&self) -> &ReferenceCache {
        &self.references
    }

    /// Reference data, mutable.
    pub fn references_mut(&mut self) -> &mut ReferenceCache {
        &mut self.references
    }

    /// History cache.
    pub fn history(&self) -> &TtlCache<HistoryRequest, BarSeries> {
        &self.history
    }

    /// History cache, mutable.
    pub fn history_mut(&mut self) -> &mut TtlCache<HistoryRequest, BarSeries> {
        &mut self.history
    }
}
