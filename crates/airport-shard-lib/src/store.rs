//! Unit store traits and implementations
//!
//! The store is addressed purely by [`UnitAddress`] and split along the
//! generation/lookup boundary:
//!
//! - [`UnitSink`] — synchronous writes, used once by the batch generation
//!   run. A failed write is fatal to generation.
//! - [`UnitSource`] — asynchronous reads, used per query by the lookup
//!   component. A failed read is an expected outcome (unknown code).
//!
//! Two implementations are provided: [`FsUnitStore`] persists one JSON file
//! per unit in a directory-per-character layout (`<root>/J/F/K/unit.json`),
//! and [`MemoryUnitStore`] keeps units in a map and counts loads, which the
//! cache and single-flight tests rely on.

use crate::address::UnitAddress;
use crate::unit::Unit;
use crate::{Result, ShardError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Generation-time write access to a unit store.
pub trait UnitSink: Send + Sync {
    /// Create the unit at the given address, overwriting any previous one.
    fn create(&self, address: &UnitAddress, unit: &Unit) -> Result<()>;
}

/// Lookup-time read access to a unit store.
#[async_trait]
pub trait UnitSource: Debug + Send + Sync {
    /// Load the unit at the given address.
    ///
    /// Returns [`ShardError::UnitNotFound`] when no unit exists there; any
    /// error from this method is absorbed into a not-found outcome by the
    /// lookup component.
    async fn load(&self, address: &UnitAddress) -> Result<Unit>;
}

/// Filesystem-backed unit store.
///
/// Each unit lives at `<root>/<c1>/<c2>/.../unit.json`, one directory per
/// address character, mirroring the address structure directly. Child units
/// nest under their parent's directory, so the layout itself carries the
/// transitive re-export chain: everything reachable from an address lives
/// below it.
#[derive(Debug, Clone)]
pub struct FsUnitStore {
    root: PathBuf,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl FsUnitStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory itself is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this store.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an address onto the unit's path under the store root.
    ///
    /// Only ASCII alphanumeric address characters name a directory. Anything
    /// else (`/`, `\`, `.`, NUL) could be interpreted by the platform as a
    /// separator or relative component and escape the root, so such
    /// addresses map to no path at all.
    fn unit_path(&self, address: &UnitAddress) -> Option<PathBuf> {
        let mut path = self.root.clone();
        for c in address.segments() {
            if !c.is_ascii_alphanumeric() {
                return None;
            }
            path.push(c.to_string());
        }
        path.push("unit.json");
        Some(path)
    }
}

impl UnitSink for FsUnitStore {
    fn create(&self, address: &UnitAddress, unit: &Unit) -> Result<()> {
        let path = self
            .unit_path(address)
            .ok_or_else(|| ShardError::InvalidAddress {
                address: address.as_code().to_string(),
            })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, unit.to_bytes()?)?;
        Ok(())
    }
}

#[async_trait]
impl UnitSource for FsUnitStore {
    async fn load(&self, address: &UnitAddress) -> Result<Unit> {
        // An unmappable address can hold no unit
        let Some(path) = self.unit_path(address) else {
            return Err(ShardError::UnitNotFound {
                address: address.to_string(),
            });
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Unit::from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ShardError::UnitNotFound {
                    address: address.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory unit store for tests and benchmarks.
///
/// Stores the serialized bytes (not the decoded unit) so determinism tests
/// can compare generation output byte-for-byte, and counts every `load`
/// call so cache behavior is observable.
#[derive(Debug, Default)]
pub struct MemoryUnitStore {
    units: DashMap<String, Vec<u8>>,
    loads: AtomicU64,
}

impl MemoryUnitStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of units currently stored.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Number of `load` calls observed so far.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::SeqCst)
    }

    /// Raw serialized bytes of the unit at an address, if present.
    pub fn unit_bytes(&self, address: &UnitAddress) -> Option<Vec<u8>> {
        self.units.get(address.as_code()).map(|b| b.value().clone())
    }

    /// Sorted list of all stored addresses (bare character form).
    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.units.iter().map(|e| e.key().clone()).collect();
        addresses.sort();
        addresses
    }
}

impl UnitSink for MemoryUnitStore {
    fn create(&self, address: &UnitAddress, unit: &Unit) -> Result<()> {
        self.units
            .insert(address.as_code().to_string(), unit.to_bytes()?);
        Ok(())
    }
}

#[async_trait]
impl UnitSource for MemoryUnitStore {
    async fn load(&self, address: &UnitAddress) -> Result<Unit> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match self.units.get(address.as_code()) {
            Some(bytes) => Unit::from_bytes(&bytes),
            None => Err(ShardError::UnitNotFound {
                address: address.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Airport;

    fn jfk_unit() -> Unit {
        Unit {
            record: Some(Airport::new("JFK", 40.64, -73.78, "US", "US-NY", "New York")),
            reexports: Vec::new(),
        }
    }

    #[test]
    fn test_fs_unit_path_layout() {
        let store = FsUnitStore::new("/data/airports");
        let path = store.unit_path(&UnitAddress::for_code("JFK")).unwrap();
        assert_eq!(path, Path::new("/data/airports/J/F/K/unit.json"));

        let root_path = store.unit_path(&UnitAddress::root()).unwrap();
        assert_eq!(root_path, Path::new("/data/airports/unit.json"));
    }

    #[test]
    fn test_fs_unit_path_rejects_non_alphanumeric_characters() {
        let store = FsUnitStore::new("/data/airports");
        // A separator would reset PathBuf::push to the filesystem root
        assert!(store.unit_path(&UnitAddress::for_code("/X")).is_none());
        assert!(store.unit_path(&UnitAddress::for_code("A/B")).is_none());
        assert!(store.unit_path(&UnitAddress::for_code("..")).is_none());
        assert!(store.unit_path(&UnitAddress::for_code("A\\B")).is_none());
    }

    #[tokio::test]
    async fn test_fs_store_separator_address_never_escapes_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsUnitStore::new(dir.path());

        let err = store
            .create(&UnitAddress::for_code("/X"), &jfk_unit())
            .unwrap_err();
        assert!(matches!(err, ShardError::InvalidAddress { .. }));
        // Nothing was written, inside the root or anywhere else
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());

        let err = store.load(&UnitAddress::for_code("/X")).await.unwrap_err();
        assert!(matches!(err, ShardError::UnitNotFound { .. }));
    }

    #[tokio::test]
    async fn test_fs_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsUnitStore::new(dir.path());
        let address = UnitAddress::for_code("JFK");
        let unit = jfk_unit();

        store.create(&address, &unit).unwrap();
        let loaded = store.load(&address).await.unwrap();
        assert_eq!(loaded, unit);
    }

    #[tokio::test]
    async fn test_fs_store_missing_address_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsUnitStore::new(dir.path());
        let err = store.load(&UnitAddress::for_code("ORD")).await.unwrap_err();
        assert!(matches!(err, ShardError::UnitNotFound { .. }));
    }

    #[tokio::test]
    async fn test_fs_store_malformed_unit_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsUnitStore::new(dir.path());
        let address = UnitAddress::for_code("X");

        std::fs::create_dir_all(dir.path().join("X")).unwrap();
        std::fs::write(dir.path().join("X/unit.json"), b"not json").unwrap();

        assert!(store.load(&address).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_counts_loads() {
        let store = MemoryUnitStore::new();
        let address = UnitAddress::for_code("JFK");
        store.create(&address, &jfk_unit()).unwrap();
        assert_eq!(store.load_count(), 0);

        store.load(&address).await.unwrap();
        store.load(&address).await.unwrap();
        assert_eq!(store.load_count(), 2);

        // Missing addresses still count as loads
        let _ = store.load(&UnitAddress::for_code("ORD")).await;
        assert_eq!(store.load_count(), 3);
    }

    #[test]
    fn test_memory_store_create_overwrites() {
        let store = MemoryUnitStore::new();
        let address = UnitAddress::for_code("JFK");
        store.create(&address, &jfk_unit()).unwrap();
        store
            .create(
                &address,
                &Unit {
                    record: None,
                    reexports: Vec::new(),
                },
            )
            .unwrap();
        assert_eq!(store.unit_count(), 1);
    }
}
