//! The closure ("Felsch") engine: deducing every edge forced by the short
//! rules after one new edge is committed, or detecting a contradiction.
//!
//! The graph keeps a stack of registered definitions alongside the edge
//! table. The stack is what makes rollback O(amount undone): restoring a
//! `(node count, edge count)` snapshot pops definitions and clears exactly
//! the edges they name, without touching the rest of the table.

use std::sync::Arc;

use crate::search::{
    presentation::Presentation,
    word_graph::{Label, Node, WordGraph, UNDEFINED},
};

/// A word graph together with the short rules it must stay consistent with,
/// an active-node count, and the registered-definition stack.
///
/// The underlying [`WordGraph`] is allocated once at full capacity (the node
/// budget); `active` tracks how much of it is live. Rows at or above
/// `active` are always fully undefined.
#[derive(Clone, Debug)]
pub(crate) struct FelschGraph {
    graph: WordGraph,
    active: u32,
    defs: Vec<(Node, Label)>,
    presentation: Arc<Presentation>,
}

impl FelschGraph {
    /// A graph with `capacity` pre-allocated nodes, none of them active.
    pub(crate) fn new(presentation: Arc<Presentation>, capacity: u32) -> Self {
        let out_degree = presentation.alphabet_size();
        Self {
            graph: WordGraph::new(capacity, out_degree),
            active: 0,
            defs: Vec::new(),
            presentation,
        }
    }

    pub(crate) fn active_nodes(&self) -> u32 {
        self.active
    }

    /// Sets the active-node count. Growing activates pre-allocated
    /// undefined rows; shrinking requires that no surviving edge points past
    /// the new count, which holds whenever the definition stack has already
    /// been reduced to the matching snapshot.
    pub(crate) fn set_active_nodes(&mut self, m: u32) {
        debug_assert!(m <= self.graph.number_of_nodes());
        self.active = m;
    }

    pub(crate) fn out_degree(&self) -> u32 {
        self.graph.out_degree()
    }

    /// The number of defined edges, maintained as the definition-stack
    /// length (every defined edge is registered exactly once).
    pub(crate) fn number_of_edges(&self) -> usize {
        self.defs.len()
    }

    #[inline]
    pub(crate) fn target(&self, u: Node, a: Label) -> u32 {
        self.graph.target_unchecked(u, a)
    }

    /// Defines `(u, a) -> v` and registers the definition for rollback.
    pub(crate) fn set_target(&mut self, u: Node, a: Label, v: Node) {
        debug_assert!(u < self.active && v < self.active);
        debug_assert_eq!(self.graph.target_unchecked(u, a), UNDEFINED);
        self.graph.set_target_unchecked(u, a, v);
        self.defs.push((u, a));
    }

    /// The rollback primitive: pops registered definitions until only `n`
    /// remain, clearing each popped edge.
    pub(crate) fn reduce_number_of_edges_to(&mut self, n: usize) {
        while self.defs.len() > n {
            let (u, a) = self.defs.pop().unwrap();
            self.graph.remove_target(u, a);
        }
    }

    /// `true` when every edge of every active node is defined.
    pub(crate) fn is_complete(&self) -> bool {
        self.defs.len() == self.active as usize * self.graph.out_degree() as usize
    }

    /// Runs closure to a fixpoint: every short rule is traced from every
    /// active node; a one-edge-short trace against a completed one forces
    /// the missing edge; two completed traces that disagree are a
    /// contradiction. Returns `false` on contradiction, performing no
    /// rollback (that is the caller's job, via the recorded snapshot).
    ///
    /// Re-checking every rule at every node after each round is the simplest
    /// propagation schedule that is complete; it is also the dominant cost
    /// of the search, which is why backtracking works through the definition
    /// stack instead of whole-state copies.
    pub(crate) fn process_definitions(&mut self) -> bool {
        let presentation = Arc::clone(&self.presentation);
        loop {
            let before = self.defs.len();
            for x in 0..self.active {
                for (lhs, rhs) in presentation.rules() {
                    if !self.merge_targets_of_paths(x, lhs, x, rhs) {
                        return false;
                    }
                }
            }
            if self.defs.len() == before {
                return true;
            }
        }
    }

    /// Follows `word` from `from` through defined edges; returns the last
    /// node reached and how many letters were consumed.
    fn follow_partial(&self, from: Node, word: &[Label]) -> (Node, usize) {
        let mut at = from;
        for (i, &a) in word.iter().enumerate() {
            match self.graph.target_unchecked(at, a) {
                UNDEFINED => return (at, i),
                t => at = t,
            }
        }
        (at, word.len())
    }

    /// One relation instance: traces `u_word` from `u_node` and `v_word`
    /// from `v_node`. Returns `false` on a contradiction; defines a forced
    /// edge (registering it) when exactly one side is one step short.
    fn merge_targets_of_paths(
        &mut self,
        u_node: Node,
        u_word: &[Label],
        v_node: Node,
        v_word: &[Label],
    ) -> bool {
        let (x, i) = self.follow_partial(u_node, u_word);
        let (y, j) = self.follow_partial(v_node, v_word);
        let u_done = i == u_word.len();
        let v_done = j == v_word.len();
        if u_done && v_done {
            x == y
        } else if u_done && j + 1 == v_word.len() {
            self.set_target(y, v_word[j], x);
            true
        } else if v_done && i + 1 == u_word.len() {
            self.set_target(x, u_word[i], y);
            true
        } else {
            // Neither trace is complete enough to force anything yet.
            true
        }
    }

    /// A copy of the live part of the graph, suitable for yielding.
    pub(crate) fn trimmed(&self) -> WordGraph {
        let mut g = self.graph.clone();
        g.restrict(self.active);
        g
    }

    /// Checks `rules` at each of `nodes` on the (complete) live graph.
    pub(crate) fn is_compatible<'a>(
        &self,
        nodes: impl IntoIterator<Item = Node>,
        rules: impl IntoIterator<Item = &'a (Vec<Label>, Vec<Label>)> + Clone,
    ) -> bool {
        self.graph.is_compatible(nodes, rules)
    }
}

/// Two felsch graphs are equal when their live portions are equal; the
/// pre-allocated capacity and the definition order play no part.
impl PartialEq for FelschGraph {
    fn eq(&self, other: &Self) -> bool {
        self.active == other.active
            && self.graph.out_degree() == other.graph.out_degree()
            && (0..self.active).all(|u| {
                (0..self.graph.out_degree()).all(|a| {
                    self.graph.target_unchecked(u, a) == other.graph.target_unchecked(u, a)
                })
            })
    }
}

impl Eq for FelschGraph {}
