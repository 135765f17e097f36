//! Prefix tree built over all codes at generation time
//!
//! Each path from the root spells out a prefix of one or more codes; a node
//! holds a record iff its path is a complete code. The tree exists only
//! while units are being emitted and plays no role at lookup time.

use crate::record::{Airport, normalize_code};
use std::collections::BTreeMap;

/// A single node of the prefix tree.
///
/// Children are keyed by the next character and kept in a `BTreeMap` so
/// iteration is always in sorted character order, which is what makes
/// emission deterministic and reproducible.
#[derive(Debug, Default, Clone)]
pub struct PrefixNode {
    /// Record held at this node, present only if the path to this node is a
    /// complete code.
    record: Option<Airport>,
    /// Child nodes keyed by the next code character.
    children: BTreeMap<char, PrefixNode>,
}

impl PrefixNode {
    /// Record held at this exact node, if any.
    #[inline]
    pub fn record(&self) -> Option<&Airport> {
        self.record.as_ref()
    }

    /// Iterate over children in sorted character order.
    pub fn children(&self) -> impl Iterator<Item = (char, &PrefixNode)> {
        self.children.iter().map(|(c, node)| (*c, node))
    }

    /// Whether this node has neither a record nor children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.record.is_none() && self.children.is_empty()
    }

    fn count_nodes(&self) -> usize {
        1 + self
            .children
            .values()
            .map(PrefixNode::count_nodes)
            .sum::<usize>()
    }
}

/// Statistics collected while building a tree.
///
/// `duplicate_codes` counts records that silently replaced an earlier record
/// with the same code (last write wins); each replacement is also surfaced
/// as a `tracing` warning so data-quality problems are visible at
/// generation time instead of being swallowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Records inserted (including ones later overwritten by a duplicate)
    pub record_count: usize,
    /// Records skipped because their code normalized to empty
    pub skipped_empty: usize,
    /// Records that overwrote an earlier record with the same code
    pub duplicate_codes: usize,
}

/// Prefix tree over all record codes, rooted at the empty prefix.
#[derive(Debug, Default, Clone)]
pub struct PrefixTree {
    root: PrefixNode,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PrefixTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a sequence of records.
    ///
    /// Complexity is O(total character count across all codes). Records with
    /// an empty code are skipped (upstream is expected to have filtered
    /// them); duplicate codes overwrite with a warning.
    pub fn from_records(records: impl IntoIterator<Item = Airport>) -> (Self, TreeStats) {
        let mut tree = Self::new();
        let mut stats = TreeStats::default();

        for record in records {
            if record.iata_code.trim().is_empty() {
                tracing::warn!("skipping record with empty code");
                stats.skipped_empty += 1;
                continue;
            }
            stats.record_count += 1;
            if let Some(previous) = tree.insert(record) {
                tracing::warn!(
                    code = %previous.iata_code,
                    "duplicate code overwrote an earlier record (last write wins)"
                );
                stats.duplicate_codes += 1;
            }
        }

        (tree, stats)
    }

    /// Insert one record, walking/creating nodes along its normalized code
    /// one character at a time.
    ///
    /// Returns the previously held record when the code was already present.
    pub fn insert(&mut self, record: Airport) -> Option<Airport> {
        let code = normalize_code(&record.iata_code);
        let mut current = &mut self.root;
        for c in code.chars() {
            current = current.children.entry(c).or_default();
        }
        current.record.replace(Airport {
            iata_code: code,
            ..record
        })
    }

    /// Walk the tree for a code and return the record held at its node.
    ///
    /// Only used at generation time (tests, diagnostics); lookup-time reads
    /// go through the persisted units instead.
    pub fn get(&self, code: &str) -> Option<&Airport> {
        let code = normalize_code(code);
        let mut current = &self.root;
        for c in code.chars() {
            current = current.children.get(&c)?;
        }
        current.record.as_ref()
    }

    /// The root node (empty prefix).
    #[inline]
    pub fn root(&self) -> &PrefixNode {
        &self.root
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }
}
