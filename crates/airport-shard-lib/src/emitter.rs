//! Generation: walk the prefix tree and persist one unit per node
//!
//! Emission is the bridge between the transient in-memory tree and the
//! persisted layout lookups run against. Every tree node becomes exactly one
//! unit at the address spelled by its path, carrying the node's record (if
//! any) and a sorted re-export list naming each child's address.

use crate::Result;
use crate::address::UnitAddress;
use crate::record::Airport;
use crate::store::UnitSink;
use crate::trie::{PrefixNode, PrefixTree, TreeStats};
use crate::unit::Unit;

/// Statistics collected while emitting units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitStats {
    /// Units written, root included (equals the tree's node count)
    pub units_emitted: usize,
    /// Units that carry a record (equals the distinct code count)
    pub record_units: usize,
}

/// Combined report of a full generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Statistics from building the prefix tree
    pub tree: TreeStats,
    /// Statistics from emitting its units
    pub emit: EmitStats,
}

/// Emit one unit per tree node into the sink.
///
/// Children are visited in sorted character order and re-export lists are
/// built in that same order, so the emitted bytes are a pure function of the
/// tree contents. Any sink error aborts the run; a partially-written store
/// is expected to be discarded and regenerated.
#[cfg_attr(feature = "profiling", profiling::all_functions)]
pub fn emit_units(tree: &PrefixTree, sink: &dyn UnitSink) -> Result<EmitStats> {
    let mut stats = EmitStats::default();
    emit_node(tree.root(), &UnitAddress::root(), sink, &mut stats)?;
    tracing::debug!(
        units = stats.units_emitted,
        records = stats.record_units,
        "emitted all units"
    );
    Ok(stats)
}

fn emit_node(
    node: &PrefixNode,
    address: &UnitAddress,
    sink: &dyn UnitSink,
    stats: &mut EmitStats,
) -> Result<()> {
    #[cfg(feature = "profiling")]
    profiling::scope!("emit_node");

    let unit = Unit {
        record: node.record().cloned(),
        reexports: node
            .children()
            .map(|(c, _)| address.child(c).as_code().to_string())
            .collect(),
    };
    sink.create(address, &unit)?;
    stats.units_emitted += 1;
    if unit.record.is_some() {
        stats.record_units += 1;
    }

    for (c, child) in node.children() {
        emit_node(child, &address.child(c), sink, stats)?;
    }
    Ok(())
}

/// Full generation run: build the tree from the records, then emit every
/// unit into the sink.
pub fn generate(
    records: impl IntoIterator<Item = Airport>,
    sink: &dyn UnitSink,
) -> Result<GenerateReport> {
    let (tree, tree_stats) = PrefixTree::from_records(records);
    let emit = emit_units(&tree, sink)?;
    Ok(GenerateReport {
        tree: tree_stats,
        emit,
    })
}
