//! A deterministic, edge-labelled graph with partially defined edges.
//!
//! This is the value that the search engine builds and yields: node set
//! `0..number_of_nodes()`, exactly `out_degree()` out-edges per node, each
//! edge either pointing at a node or undefined. The edge table is a flat
//! row-major vector so that equality, ordering, and rollback are all cheap
//! linear scans over plain integers.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Node identifier. Nodes are always a dense range starting at 0.
pub type Node = u32;

/// Edge label, i.e. a generator index in `0..out_degree`.
pub type Label = u32;

/// Sentinel stored in the edge table for an undefined edge.
///
/// Kept out of the public read API: [`WordGraph::target`] returns an
/// `Option<Node>` instead.
pub(crate) const UNDEFINED: u32 = u32::MAX;

/// A deterministic word graph under construction.
///
/// Every mutating operation on in-range indices is total; there are no
/// failure modes beyond index validation, which the checked methods perform
/// with a panic (callers in the search hot path use the `_unchecked`
/// variants after establishing the invariants once).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordGraph {
    out_degree: u32,
    /// Row-major: entry for `(u, a)` is at `u * out_degree + a`.
    targets: Vec<u32>,
}

impl WordGraph {
    /// Creates a graph with `num_nodes` nodes and all edges undefined.
    pub fn new(num_nodes: u32, out_degree: u32) -> Self {
        Self {
            out_degree,
            targets: vec![UNDEFINED; num_nodes as usize * out_degree as usize],
        }
    }

    /// The distinguished empty graph (zero nodes).
    pub fn empty(out_degree: u32) -> Self {
        Self::new(0, out_degree)
    }

    pub fn number_of_nodes(&self) -> u32 {
        if self.out_degree == 0 {
            0
        } else {
            (self.targets.len() / self.out_degree as usize) as u32
        }
    }

    pub fn out_degree(&self) -> u32 {
        self.out_degree
    }

    /// The number of defined edges.
    pub fn number_of_edges(&self) -> usize {
        self.targets.iter().filter(|&&t| t != UNDEFINED).count()
    }

    /// Appends `k` nodes with all of their edges undefined.
    pub fn add_nodes(&mut self, k: u32) {
        self.targets
            .extend(std::iter::repeat(UNDEFINED).take(k as usize * self.out_degree as usize));
    }

    /// Grows the out-degree of every node by `d`; the out-degree never
    /// shrinks. New edges are undefined.
    pub fn add_to_out_degree(&mut self, d: u32) {
        if d == 0 {
            return;
        }
        let num_nodes = self.number_of_nodes();
        let new_degree = self.out_degree + d;
        let mut targets = vec![UNDEFINED; num_nodes as usize * new_degree as usize];
        for u in 0..num_nodes as usize {
            let old = u * self.out_degree as usize;
            let new = u * new_degree as usize;
            targets[new..new + self.out_degree as usize]
                .copy_from_slice(&self.targets[old..old + self.out_degree as usize]);
        }
        self.out_degree = new_degree;
        self.targets = targets;
    }

    #[inline]
    fn index(&self, u: Node, a: Label) -> usize {
        u as usize * self.out_degree as usize + a as usize
    }

    /// The target of the edge `(u, a)`, or `None` if it is undefined.
    ///
    /// # Panics
    ///
    /// Panics if `u` or `a` is out of range.
    pub fn target(&self, u: Node, a: Label) -> Option<Node> {
        assert!(u < self.number_of_nodes() && a < self.out_degree);
        match self.targets[self.index(u, a)] {
            UNDEFINED => None,
            t => Some(t),
        }
    }

    #[inline]
    pub(crate) fn target_unchecked(&self, u: Node, a: Label) -> u32 {
        debug_assert!(u < self.number_of_nodes() && a < self.out_degree);
        self.targets[u as usize * self.out_degree as usize + a as usize]
    }

    /// Defines the edge `(u, a) -> v`.
    ///
    /// # Panics
    ///
    /// Panics if `u`, `a`, or `v` is out of range.
    pub fn set_target(&mut self, u: Node, a: Label, v: Node) {
        assert!(u < self.number_of_nodes() && a < self.out_degree && v < self.number_of_nodes());
        let i = self.index(u, a);
        self.targets[i] = v;
    }

    #[inline]
    pub(crate) fn set_target_unchecked(&mut self, u: Node, a: Label, v: Node) {
        debug_assert!(u < self.number_of_nodes() && a < self.out_degree);
        debug_assert!(v < self.number_of_nodes());
        let i = self.index(u, a);
        self.targets[i] = v;
    }

    /// Makes the edge `(u, a)` undefined again. This is the primitive the
    /// rollback machinery is built from.
    pub(crate) fn remove_target(&mut self, u: Node, a: Label) {
        debug_assert!(u < self.number_of_nodes() && a < self.out_degree);
        let i = self.index(u, a);
        self.targets[i] = UNDEFINED;
    }

    /// Drops every node `>= m` (and its edges). Edges out of the surviving
    /// nodes are assumed not to point past `m`; the search maintains this.
    pub fn restrict(&mut self, m: u32) {
        debug_assert!(self
            .targets
            .iter()
            .take(m as usize * self.out_degree as usize)
            .all(|&t| t == UNDEFINED || t < m));
        self.targets.truncate(m as usize * self.out_degree as usize);
    }

    /// `true` if every edge of every node is defined.
    pub fn is_complete(&self) -> bool {
        self.targets.iter().all(|&t| t != UNDEFINED)
    }

    /// Traces `word` through defined edges starting at `from`, returning the
    /// node reached or `None` if an undefined edge is hit.
    pub fn follow_path(&self, from: Node, word: &[Label]) -> Option<Node> {
        let mut at = from;
        for &a in word {
            at = self.target(at, a)?;
        }
        Some(at)
    }

    /// Traces both sides of `(lhs, rhs)` from every node in `nodes` and
    /// checks that they reach the same node. Only meaningful on complete
    /// graphs, where every trace is defined.
    pub fn is_compatible<'a>(
        &self,
        nodes: impl IntoIterator<Item = Node>,
        rules: impl IntoIterator<Item = &'a (Vec<Label>, Vec<Label>)> + Clone,
    ) -> bool {
        for x in nodes {
            for (lhs, rhs) in rules.clone() {
                if self.follow_path(x, lhs) != self.follow_path(x, rhs) {
                    return false;
                }
            }
        }
        true
    }
}

impl PartialEq for WordGraph {
    fn eq(&self, other: &Self) -> bool {
        self.out_degree == other.out_degree && self.targets == other.targets
    }
}

impl Eq for WordGraph {}

impl std::hash::Hash for WordGraph {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.out_degree.hash(state);
        self.targets.hash(state);
    }
}

/// Strict total order: out-degree, then node count, then the edge table
/// lexicographically. Callers rely on this to sort and deduplicate results.
impl Ord for WordGraph {
    fn cmp(&self, other: &Self) -> Ordering {
        self.out_degree
            .cmp(&other.out_degree)
            .then_with(|| self.targets.len().cmp(&other.targets.len()))
            .then_with(|| self.targets.cmp(&other.targets))
    }
}

impl PartialOrd for WordGraph {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds a graph from explicit rows of targets, e.g.
/// `from_rows(2, &[&[1, 0], &[1, 1]])`. Handy in tests and demos.
pub fn from_rows(out_degree: u32, rows: &[&[Node]]) -> WordGraph {
    let mut g = WordGraph::new(rows.len() as u32, out_degree);
    for (u, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), out_degree as usize);
        for (a, &v) in row.iter().enumerate() {
            g.set_target(u as Node, a as Label, v);
        }
    }
    g
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_graph_has_no_defined_edges() {
        let g = WordGraph::new(3, 2);
        assert_eq!(g.number_of_nodes(), 3);
        assert_eq!(g.out_degree(), 2);
        assert_eq!(g.number_of_edges(), 0);
        assert_eq!(g.target(0, 0), None);
        assert!(!g.is_complete());
    }

    #[test]
    fn set_and_remove_target() {
        let mut g = WordGraph::new(2, 1);
        g.set_target(0, 0, 1);
        assert_eq!(g.target(0, 0), Some(1));
        assert_eq!(g.number_of_edges(), 1);
        g.remove_target(0, 0);
        assert_eq!(g.target(0, 0), None);
        assert_eq!(g.number_of_edges(), 0);
    }

    #[test]
    #[should_panic]
    fn set_target_out_of_range_panics() {
        let mut g = WordGraph::new(2, 1);
        g.set_target(0, 0, 2);
    }

    #[test]
    fn add_nodes_appends_undefined_rows() {
        let mut g = WordGraph::new(1, 2);
        g.set_target(0, 1, 0);
        g.add_nodes(2);
        assert_eq!(g.number_of_nodes(), 3);
        assert_eq!(g.target(0, 1), Some(0));
        assert_eq!(g.target(2, 0), None);
    }

    #[test]
    fn add_to_out_degree_preserves_existing_edges() {
        let mut g = from_rows(2, &[&[1, 0], &[1, 1]]);
        g.add_to_out_degree(1);
        assert_eq!(g.out_degree(), 3);
        assert_eq!(g.target(0, 0), Some(1));
        assert_eq!(g.target(0, 1), Some(0));
        assert_eq!(g.target(1, 1), Some(1));
        assert_eq!(g.target(0, 2), None);
        assert_eq!(g.target(1, 2), None);
    }

    #[test]
    fn restrict_truncates_rows() {
        let mut g = from_rows(1, &[&[1], &[1]]);
        g.restrict(1);
        assert_eq!(g.number_of_nodes(), 1);
        // The surviving edge 0 -> 1 was required not to exist; rebuild to
        // check the zero-node case as well.
        let mut h = WordGraph::new(2, 1);
        h.set_target(1, 0, 1);
        h.remove_target(1, 0);
        h.restrict(0);
        assert_eq!(h, WordGraph::empty(1));
    }

    #[test]
    fn follow_path_stops_at_undefined_edges() {
        let mut g = WordGraph::new(2, 2);
        g.set_target(0, 0, 1);
        g.set_target(1, 0, 1);
        assert_eq!(g.follow_path(0, &[0, 0]), Some(1));
        assert_eq!(g.follow_path(0, &[0, 1]), None);
        assert_eq!(g.follow_path(0, &[]), Some(0));
    }

    #[test]
    fn is_compatible_checks_rules_at_given_nodes() {
        // One generator with 0 -> 1 -> 1: aa = a holds from everywhere.
        let g = from_rows(1, &[&[1], &[1]]);
        let rules = vec![(vec![0, 0], vec![0])];
        assert!(g.is_compatible(0..2, rules.iter()));
        let bad = vec![(vec![0], vec![])];
        assert!(!g.is_compatible(0..2, bad.iter()));
        assert!(g.is_compatible(1..2, bad.iter()));
    }

    #[test]
    fn ordering_is_lexicographic_on_the_edge_table() {
        let a = from_rows(1, &[&[0]]);
        let b = from_rows(1, &[&[1], &[1]]);
        let c = from_rows(1, &[&[1], &[0]]);
        assert!(a < b);
        assert!(c < b);
        let mut v = vec![b.clone(), a.clone(), c.clone()];
        v.sort();
        assert_eq!(v, vec![a, c, b]);
    }

    #[test]
    fn equality_distinguishes_node_counts() {
        let one = from_rows(1, &[&[0]]);
        let mut two = WordGraph::new(2, 1);
        two.set_target(0, 0, 0);
        assert_ne!(one, two);
        assert_eq!(WordGraph::empty(3), WordGraph::new(0, 3));
    }
}
