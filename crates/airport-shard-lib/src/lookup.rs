//! Cached, single-flight lookup of one record by code
//!
//! The lookup path never touches the tree: the query code alone determines
//! the unit address, the unit is loaded from a [`UnitSource`], and the
//! outcome (record or not-found, including any load failure) is cached
//! permanently per address. A per-address `OnceCell` guarantees at most one
//! load is ever in flight for an address, no matter how many concurrent
//! queries race on it.

use crate::ShardError;
use crate::address::UnitAddress;
use crate::record::{Airport, normalize_code};
use crate::store::UnitSource;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lookup front-end over a unit store.
///
/// Cheap to share: clone the `Arc` it lives in rather than the struct. All
/// state is the source handle and the outcome cache, both concurrency-safe.
#[derive(Debug)]
pub struct AirportLookup {
    source: Arc<dyn UnitSource>,
    cache: DashMap<UnitAddress, Arc<OnceCell<Option<Airport>>>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl AirportLookup {
    /// Create a lookup over the given unit source with an empty cache.
    pub fn new(source: Arc<dyn UnitSource>) -> Self {
        Self {
            source,
            cache: DashMap::new(),
        }
    }

    /// Look up one record by code.
    ///
    /// Returns `None` for unknown codes and for any load failure; errors
    /// never surface to the caller. The first query for an address performs
    /// the load, every later query (and every concurrent one) reuses its
    /// outcome. A load failure is cached as not-found and never retried.
    pub async fn lookup(&self, code: &str) -> Option<Airport> {
        let code = normalize_code(code);
        if code.is_empty() {
            // The root unit never holds a record; skip the store entirely.
            return None;
        }
        let address = UnitAddress::for_code(&code);

        // Clone the cell out so the map guard is not held across the await.
        let cell = self
            .cache
            .entry(address.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        cell.get_or_init(|| self.load_outcome(address, code)).await.clone()
    }

    /// Number of addresses with a cached outcome (loads in flight included).
    pub fn cached_addresses(&self) -> usize {
        self.cache.len()
    }

    async fn load_outcome(&self, address: UnitAddress, code: String) -> Option<Airport> {
        match self.source.load(&address).await {
            Ok(unit) => unit.record_for(&code).cloned(),
            Err(ShardError::UnitNotFound { .. }) => None,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "unit load failed; treating as not found");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::generate;
    use crate::store::{FsUnitStore, MemoryUnitStore};

    fn airport(code: &str) -> Airport {
        Airport::new(code, 0.0, 0.0, "US", "US-NY", "Test")
    }

    fn populated_lookup(codes: &[&str]) -> (AirportLookup, Arc<MemoryUnitStore>) {
        let store = Arc::new(MemoryUnitStore::new());
        generate(codes.iter().map(|c| airport(c)), store.as_ref()).unwrap();
        (AirportLookup::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_lookup_known_code() {
        let (lookup, _) = populated_lookup(&["JFK", "LGA"]);
        assert_eq!(lookup.lookup("JFK").await.unwrap().iata_code, "JFK");
        assert_eq!(lookup.lookup("LGA").await.unwrap().iata_code, "LGA");
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let (lookup, store) = populated_lookup(&["JFK"]);
        assert!(lookup.lookup("jfk").await.is_some());
        assert!(lookup.lookup(" Jfk ").await.is_some());
        // All spellings share one address, so one load total
        assert_eq!(store.load_count(), 1);
        assert_eq!(lookup.cached_addresses(), 1);
    }

    #[tokio::test]
    async fn test_unknown_code_is_none() {
        let (lookup, _) = populated_lookup(&["JFK"]);
        assert!(lookup.lookup("ORD").await.is_none());
    }

    #[tokio::test]
    async fn test_prefix_of_a_code_is_not_a_match() {
        let (lookup, _) = populated_lookup(&["JFK"]);
        // "JF" resolves to a real unit, but that unit holds no record
        assert!(lookup.lookup("JF").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_code_skips_the_store() {
        let (lookup, store) = populated_lookup(&["JFK"]);
        assert!(lookup.lookup("").await.is_none());
        assert!(lookup.lookup("   ").await.is_none());
        assert_eq!(store.load_count(), 0);
        assert_eq!(lookup.cached_addresses(), 0);
    }

    #[tokio::test]
    async fn test_repeated_lookups_load_once() {
        let (lookup, store) = populated_lookup(&["JFK"]);
        for _ in 0..5 {
            assert!(lookup.lookup("JFK").await.is_some());
        }
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_cached_and_never_retried() {
        let (lookup, store) = populated_lookup(&["JFK"]);
        assert!(lookup.lookup("ORD").await.is_none());
        assert!(lookup.lookup("ORD").await.is_none());
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn test_mismatched_record_is_not_a_match() {
        let store = Arc::new(MemoryUnitStore::new());
        generate(vec![airport("JFK")], store.as_ref()).unwrap();
        let lookup = AirportLookup::new(store.clone());

        // Overwrite the unit with one holding a record for a different code
        {
            use crate::store::UnitSink;
            use crate::unit::Unit;
            let bad = Unit {
                record: Some(airport("XXX")),
                reexports: Vec::new(),
            };
            store.create(&UnitAddress::for_code("JFK"), &bad).unwrap();
        }

        assert!(lookup.lookup("JFK").await.is_none());
        assert!(lookup.lookup("JFK").await.is_none());
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_is_absorbed_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("J/F/K")).unwrap();
        std::fs::write(dir.path().join("J/F/K/unit.json"), b"not json").unwrap();

        let lookup = AirportLookup::new(Arc::new(FsUnitStore::new(dir.path())));
        // Decode failure becomes a plain not-found, permanently cached
        assert!(lookup.lookup("JFK").await.is_none());
        assert!(lookup.lookup("JFK").await.is_none());
        assert_eq!(lookup.cached_addresses(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lookups_are_single_flight() {
        let (lookup, store) = populated_lookup(&["JFK"]);
        let lookup = Arc::new(lookup);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let lookup = lookup.clone();
            handles.push(tokio::spawn(async move { lookup.lookup("JFK").await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn test_separator_codes_resolve_to_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsUnitStore::new(dir.path());
        generate(vec![airport("JFK")], &store).unwrap();

        let lookup = AirportLookup::new(Arc::new(store));
        // Codes that could reach outside the store root load nothing
        assert!(lookup.lookup("/etc/passwd").await.is_none());
        assert!(lookup.lookup("../JFK").await.is_none());
    }

    #[tokio::test]
    async fn test_end_to_end_over_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsUnitStore::new(dir.path());
        let jfk = Airport::new("JFK", 40.64, -73.78, "US", "US-NY", "New York");
        generate(vec![jfk.clone(), airport("LGA")], &store).unwrap();

        let lookup = AirportLookup::new(Arc::new(store));
        // Returned record is deep-equal to the generated one
        assert_eq!(lookup.lookup("jfk").await.unwrap(), jfk);
        assert!(lookup.lookup("LGA").await.is_some());
        assert!(lookup.lookup("ORD").await.is_none());
    }

    #[tokio::test]
    async fn test_distinct_codes_cache_independently() {
        let (lookup, store) = populated_lookup(&["JFK", "LGA"]);
        assert!(lookup.lookup("JFK").await.is_some());
        assert!(lookup.lookup("LGA").await.is_some());
        assert!(lookup.lookup("ORD").await.is_none());
        assert_eq!(store.load_count(), 3);
        assert_eq!(lookup.cached_addresses(), 3);
    }
}
