//! Airport Shard Library - Prefix-Sharded Storage and Lookup of Airport Records
//!
//! This library converts a flat dataset of airport records into a partitioned,
//! hierarchically-keyed layout and answers single-record lookups by IATA code
//! without ever loading the full dataset into memory.
//!
//! # Architecture
//!
//! - **[`Airport`]**: Immutable record for one airport, keyed by IATA code
//! - **[`PrefixTree`]**: In-memory prefix tree built over all codes at generation time
//! - **[`emit_units`]/[`generate`]**: Walks the tree and persists one [`Unit`] per node
//! - **[`UnitAddress`]**: Deterministic per-character address of a unit (`"J/F/K"`)
//! - **[`AirportLookup`]**: Cached, single-flight async lookup against a [`UnitSource`]
//!
//! # Performance Characteristics
//!
//! - **Generation**: O(total characters across all codes), single pass
//! - **Lookup**: one unit load per distinct address, ever; cache hits are O(1)
//! - **Memory**: lookup holds only the units actually queried

mod address;
mod emitter;
mod lookup;
mod record;
mod store;
mod trie;
mod unit;

// Public API exports
pub use address::UnitAddress;
pub use emitter::{EmitStats, GenerateReport, emit_units, generate};
pub use lookup::AirportLookup;
pub use record::{Airport, normalize_code};
pub use store::{FsUnitStore, MemoryUnitStore, UnitSink, UnitSource};
pub use trie::{PrefixNode, PrefixTree, TreeStats};
pub use unit::Unit;

/// Error types for the shard library
#[derive(Debug, thiserror::Error)]
pub enum ShardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unit serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no unit at address {address:?}")]
    UnitNotFound { address: String },

    #[error("address {address:?} contains characters that cannot name a unit")]
    InvalidAddress { address: String },
}

pub type Result<T> = std::result::Result<T, ShardError>;
