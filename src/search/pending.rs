//! The unit of backtracking state exchanged between search workers.

use crate::search::word_graph::{Label, Node};

/// One deferred edge definition together with its rollback marker.
///
/// `num_edges` and `num_nodes` record the exact graph shape the definition
/// must be applied against: before committing `(source, generator) ->
/// target`, the owning graph is truncated back to `num_edges` defined edges,
/// and its active node count is set to `num_nodes` (which already includes
/// `target` when `target` is a fresh node).
///
/// Records are plain data with no references into any graph, which is what
/// lets the parallel engine move them between workers freely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingDef {
    pub source: Node,
    pub generator: Label,
    pub target: Node,
    /// Number of defined edges in the graph when this record was pushed.
    pub num_edges: usize,
    /// Number of active nodes after the definition is made.
    pub num_nodes: u32,
}

impl PendingDef {
    pub fn new(source: Node, generator: Label, target: Node, num_edges: usize, num_nodes: u32) -> Self {
        Self {
            source,
            generator,
            target,
            num_edges,
            num_nodes,
        }
    }
}
