//! The persisted unit artifact, one per prefix-tree node
//!
//! A unit is the independently-loadable counterpart of a tree node: the held
//! record (if the node's path is itself a complete code) plus re-export
//! references to each child unit's address. Loading the unit for address `A`
//! therefore exposes, directly or transitively, every record whose code
//! starts with `A`.

use crate::Result;
use crate::record::Airport;
use serde::{Deserialize, Serialize};

/// One persisted, addressable unit of the generated dataset.
///
/// Units are created once per generation run and immutable thereafter;
/// regeneration fully replaces them. The JSON encoding is canonical (struct
/// field order, sorted re-exports, no timestamps) so two runs over the same
/// input produce byte-identical content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Record held at this exact node, present only when the node's path is
    /// a complete code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Airport>,
    /// Bare-character addresses of the child units this unit re-exports,
    /// in sorted order.
    #[serde(default)]
    pub reexports: Vec<String>,
}

impl Unit {
    /// Serialize to the canonical on-disk JSON encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Deserialize from the on-disk JSON encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Select the held record by its normalized code.
    ///
    /// The lookup path uses the query's normalized code as the selector, so
    /// a unit loaded for an address only yields a record whose code matches
    /// that exact address.
    pub fn record_for(&self, code: &str) -> Option<&Airport> {
        self.record.as_ref().filter(|r| r.iata_code == code)
    }
}
