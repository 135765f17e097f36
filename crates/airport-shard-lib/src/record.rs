//! Airport record model and code normalization
//!
//! This module provides the `Airport` struct, the value stored at the leaves
//! of the prefix tree and embedded into persisted units, plus the single
//! normalization routine every code passes through before it is used as a key.

use serde::{Deserialize, Serialize};

/// A single airport record as produced by the upstream data provider.
///
/// The IATA code is the lookup key: non-empty and globally unique across the
/// dataset, always stored in its normalized (uppercase) form. The remaining
/// fields are descriptive attributes carried by value into the generated
/// units; the library never inspects them beyond (de)serialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// Normalized IATA code (e.g. `"JFK"`)
    pub iata_code: String,
    /// Latitude in decimal degrees
    pub latitude_deg: f64,
    /// Longitude in decimal degrees
    pub longitude_deg: f64,
    /// ISO 3166-1 country code (e.g. `"US"`)
    pub iso_country: String,
    /// ISO 3166-2 region code (e.g. `"US-NY"`)
    pub iso_region: String,
    /// Municipality served by the airport
    pub municipality: String,
}

impl Airport {
    /// Create a record, normalizing the code on the way in.
    pub fn new(
        iata_code: impl Into<String>,
        latitude_deg: f64,
        longitude_deg: f64,
        iso_country: impl Into<String>,
        iso_region: impl Into<String>,
        municipality: impl Into<String>,
    ) -> Self {
        Self {
            iata_code: normalize_code(&iata_code.into()),
            latitude_deg,
            longitude_deg,
            iso_country: iso_country.into(),
            iso_region: iso_region.into(),
            municipality: municipality.into(),
        }
    }
}

/// Normalize a code to its canonical form: trimmed and uppercased.
///
/// Every key comparison in the library happens on normalized codes, both at
/// generation time (tree insertion) and at lookup time (address resolution
/// and record selection), so `"jfk"`, `" JFK "` and `"JFK"` are the same key.
#[inline]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
