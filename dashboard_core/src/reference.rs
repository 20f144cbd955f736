//! Per-symbol reference data that is fetched once per tracking period.

use indexmap::IndexMap;

/// Display name and anchor prices for one symbol.
///
/// Each field is filled by the first successful fetch and never refreshed
/// until the tracked symbol set changes. A failed fetch leaves the field
/// empty so the next pass tries again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    /// Company display name.
    pub company_name: Option<String>,
    /// Price at today's session open.
    pub opening_price: Option<f64>,
    /// Close of the previous session.
    pub previous_close: Option<f64>,
}

impl ReferenceData {
    /// `true` once every field has been fetched.
    pub fn is_complete(&self) -> bool {
        self.company_name.is_some() && self.opening_price.is_some() && self.previous_close.is_some()
    }
}

/// Symbol → [`ReferenceData`], cleared together with the live series.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: IndexMap<String, ReferenceData>,
}

impl ReferenceCache {
    /// Reference data for `symbol`, if any field has been fetched.
    pub fn get(&self, symbol: &str) -> Option<&ReferenceData> {
        self.entries.get(symbol)
    }

    /// Mutable entry for `symbol`, created empty if absent.
    pub fn entry(&mut self, symbol: &str) -> &mut ReferenceData {
        self.entries.entry(symbol.to_string()).or_default()
    }

    /// Stores `name` unless a name is already cached. Returns the cached name.
    pub fn set_company_name(&mut self, symbol: &str, name: String) -> &str {
        self.entry(symbol).company_name.get_or_insert(name)
    }

    /// Stores `price` unless an opening price is already cached.
    pub fn set_opening_price(&mut self, symbol: &str, price: f64) -> f64 {
        *self.entry(symbol).opening_price.get_or_insert(price)
    }

    /// Stores `price` unless a previous close is already cached.
    pub fn set_previous_close(&mut self, symbol: &str, price: f64) -> f64 {
        *self.entry(symbol).previous_close.get_or_insert(price)
    }

    /// Display name for `symbol`, falling back to the symbol itself.
    pub fn display_name(&self, symbol: &str) -> String {
        self.get(symbol)
            .and_then(|r| r.company_name.clone())
            .unwrap_or_else(|| symbol.to_string())
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of symbols with at least one cached field.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fetch_wins() {
        let mut cache = ReferenceCache::default();
        assert_eq!(cache.set_opening_price("RIVN", 12.0), 12.0);
        assert_eq!(cache.set_opening_price("RIVN", 13.0), 12.0);
        assert_eq!(cache.set_company_name("RIVN", "Rivian".into()), "Rivian");
        assert_eq!(cache.set_company_name("RIVN", "Other".into()), "Rivian");
        assert!(!cache.get("RIVN").unwrap().is_complete());
        cache.set_previous_close("RIVN", 11.5);
        assert!(cache.get("RIVN").unwrap().is_complete());
    }

    #[test]
    fn display_name_falls_back_to_symbol() {
        let mut cache = ReferenceCache::default();
        assert_eq!(cache.display_name("RIVN"), "RIVN");
        cache.set_company_name("RIVN", "Rivian Automotive".into());
        assert_eq!(cache.display_name("RIVN"), "Rivian Automotive");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.display_name("RIVN"), "RIVN");
    }
}
