//! The backtracking search for one-sided congruences of bounded index.
//!
//! [`LowIndex`] is the main entry point. It enumerates, for a finitely
//! presented semigroup or monoid, every deterministic complete word graph on
//! at most `n` nodes that is compatible with the presentation: short rules
//! are enforced at every node throughout the search (via the closure
//! engine), long rules are checked at every node once a graph is complete,
//! and extra rules and excluded pairs are checked from node 0 on complete
//! graphs.
//!
//! The search itself is a resumable state machine ([`SearchCursor`]): a
//! trail of pending edge definitions, each carrying the `(node count, edge
//! count)` snapshot to roll the graph back to before the definition is
//! applied. Popping the trail, committing through the closure engine, and
//! case-splitting the first unconstrained edge drives the whole
//! enumeration; a closure contradiction or a failed completion check is an
//! ordinary branch rejection, not an error.

use std::sync::Arc;

use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    search::{
        felsch::FelschGraph,
        parallel::WorkerPool,
        pending::PendingDef,
        presentation::{validate_words, Presentation, Rule},
        stats::{SearchStats, StatsSnapshot},
        word_graph::{Node, WordGraph, UNDEFINED},
    },
};

/// Configuration for a low-index search, composed by value into the engine.
///
/// The rule sets play four different roles:
///
/// - the presentation's rules are the *short* rules, propagated at every
///   node for the whole search;
/// - `long_rules` are checked only on complete graphs, at every node — they
///   are ordinary defining relations whose enforcement is deferred because
///   propagating long words is expensive;
/// - `extra` rules are constraints on the congruence itself (pairs that must
///   be identified), checked from node 0 only;
/// - `exclude` pairs are the complement: pairs the congruence must *not*
///   identify, so a complete graph is rejected when both sides of such a
///   pair trace from node 0 to the same node.
#[derive(Clone, Debug)]
pub struct Settings {
    presentation: Presentation,
    extra: Vec<Rule>,
    long_rules: Vec<Rule>,
    excluded: Vec<Rule>,
    number_of_threads: usize,
    idle_thread_restarts: usize,
}

impl Settings {
    pub fn new(presentation: Presentation) -> Self {
        Self {
            presentation,
            extra: Vec::new(),
            long_rules: Vec::new(),
            excluded: Vec::new(),
            number_of_threads: 1,
            idle_thread_restarts: 64,
        }
    }

    pub fn extra(mut self, rules: Vec<Rule>) -> Self {
        self.extra = rules;
        self
    }

    pub fn long_rules(mut self, rules: Vec<Rule>) -> Self {
        self.long_rules = rules;
        self
    }

    /// Pairs of words the congruence must separate.
    pub fn exclude(mut self, pairs: Vec<Rule>) -> Self {
        self.excluded = pairs;
        self
    }

    pub fn number_of_threads(mut self, threads: usize) -> Self {
        self.number_of_threads = threads;
        self
    }

    /// How many times an idle worker re-polls for stealable work before
    /// shutting down. Only relevant with more than one thread.
    pub fn idle_thread_restarts(mut self, restarts: usize) -> Self {
        self.idle_thread_restarts = restarts;
        self
    }
}

/// Everything a search cursor needs that is independent of the node budget,
/// shared (read-only) between all workers of one engine.
#[derive(Debug)]
pub(crate) struct SearchContext {
    pub(crate) short_rules: Arc<Presentation>,
    pub(crate) extra: Vec<Rule>,
    pub(crate) long_rules: Vec<Rule>,
    pub(crate) excluded: Vec<Rule>,
    pub(crate) stats: SearchStats,
}

/// The low-index congruence search engine.
#[derive(Debug)]
pub struct LowIndex {
    ctx: Arc<SearchContext>,
    number_of_threads: usize,
    idle_thread_restarts: usize,
}

impl LowIndex {
    /// Validates the configuration and builds an engine.
    ///
    /// All configuration errors are reported here, before any search state
    /// exists: an empty alphabet, a rule letter outside the alphabet, a zero
    /// thread count, or zero idle restarts.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.presentation.validate()?;
        let alphabet_size = settings.presentation.alphabet_size();
        validate_words(
            settings.extra.iter().flat_map(|(l, r)| [l, r]),
            alphabet_size,
        )?;
        validate_words(
            settings.long_rules.iter().flat_map(|(l, r)| [l, r]),
            alphabet_size,
        )?;
        validate_words(
            settings.excluded.iter().flat_map(|(l, r)| [l, r]),
            alphabet_size,
        )?;
        if settings.number_of_threads == 0 {
            return Err(ConfigError::ZeroThreads.into());
        }
        if settings.idle_thread_restarts == 0 {
            return Err(ConfigError::ZeroIdleRestarts.into());
        }
        Ok(Self {
            ctx: Arc::new(SearchContext {
                short_rules: Arc::new(settings.presentation),
                extra: settings.extra,
                long_rules: settings.long_rules,
                excluded: settings.excluded,
                stats: SearchStats::new(),
            }),
            number_of_threads: settings.number_of_threads,
            idle_thread_restarts: settings.idle_thread_restarts,
        })
    }

    pub fn presentation(&self) -> &Presentation {
        &self.ctx.short_rules
    }

    /// Counters from the most recent search.
    pub fn stats(&self) -> StatsSnapshot {
        self.ctx.stats.snapshot()
    }

    fn check_bound(&self, n: u32) -> Result<()> {
        if n == 0 {
            return Err(ConfigError::ZeroClassBound.into());
        }
        // A semigroup graph needs one node beyond the class bound for the
        // adjoined identity.
        if !self.ctx.short_rules.contains_empty_word() && n == u32::MAX {
            return Err(ConfigError::ClassBoundTooLarge.into());
        }
        Ok(())
    }

    /// The enumeration as a forward sequence of word graphs.
    ///
    /// Always single-threaded; the callback forms below are the parallel
    /// surface. Each yielded graph has node 0 as its start node and every
    /// edge defined.
    pub fn iter(&self, n: u32) -> Result<Iter> {
        self.check_bound(n)?;
        self.ctx.stats.reset();
        let mut cursor = SearchCursor::new(Arc::clone(&self.ctx), n);
        cursor.seed_initial_trail();
        Ok(Iter { cursor })
    }

    /// Calls `f` once per enumerated graph, using the configured number of
    /// worker threads. No ordering is guaranteed across threads; the set of
    /// graphs produced is the same for any thread count.
    pub fn for_each(&self, n: u32, mut f: impl FnMut(&WordGraph) + Send) -> Result<()> {
        self.check_bound(n)?;
        self.ctx.stats.reset();
        debug!(
            max_classes = n,
            threads = self.number_of_threads,
            short_rules = self.ctx.short_rules.rules().len(),
            long_rules = self.ctx.long_rules.len(),
            "starting low-index search"
        );
        if self.number_of_threads == 1 {
            let mut cursor = SearchCursor::new(Arc::clone(&self.ctx), n);
            cursor.seed_initial_trail();
            while cursor.advance() {
                f(&cursor.word_graph());
            }
        } else {
            let pool = WorkerPool::new(
                &self.ctx,
                n,
                self.number_of_threads,
                self.idle_thread_restarts,
            );
            pool.run(|graph| {
                f(graph);
                false
            });
        }
        debug!(congruences = self.stats().congruences, "search finished");
        Ok(())
    }

    /// Returns the first enumerated graph accepted by `pred`, or the empty
    /// (zero node) graph when there is none. With more than one worker,
    /// "first" means whichever match is accepted first; all workers stop
    /// once one match is recorded.
    pub fn find_if(
        &self,
        n: u32,
        mut pred: impl FnMut(&WordGraph) -> bool + Send,
    ) -> Result<WordGraph> {
        self.check_bound(n)?;
        self.ctx.stats.reset();
        let empty = WordGraph::empty(self.ctx.short_rules.alphabet_size());
        if self.number_of_threads == 1 {
            let mut cursor = SearchCursor::new(Arc::clone(&self.ctx), n);
            cursor.seed_initial_trail();
            while cursor.advance() {
                let graph = cursor.word_graph();
                if pred(&graph) {
                    return Ok(graph);
                }
            }
            Ok(empty)
        } else {
            let pool = WorkerPool::new(
                &self.ctx,
                n,
                self.number_of_threads,
                self.idle_thread_restarts,
            );
            Ok(pool.run(pred).unwrap_or(empty))
        }
    }

    /// The number of one-sided congruences of index at most `n`.
    pub fn number_of_congruences(&self, n: u32) -> Result<u64> {
        let mut count = 0u64;
        self.for_each(n, |_| count += 1)?;
        Ok(count)
    }
}

/// The resumable search state machine: one private felsch graph plus one
/// private trail of pending definitions.
///
/// `advance` moves the cursor to the next accepted graph (returning `true`)
/// or exhausts the trail (returning `false`, after which the cursor's graph
/// is the distinguished zero-node graph). Cursor equality is graph equality.
#[derive(Debug)]
pub(crate) struct SearchCursor {
    ctx: Arc<SearchContext>,
    /// Maximum number of graph nodes: `n` for monoid presentations, `n + 1`
    /// for semigroups, where node 0 is the adjoined formal identity.
    max_graph_nodes: u32,
    /// Smallest node index a pending definition may target: 0 for monoids,
    /// 1 for semigroups (node 0 is never a target).
    min_target: Node,
    felsch: FelschGraph,
    pending: Vec<PendingDef>,
}

impl SearchCursor {
    pub(crate) fn new(ctx: Arc<SearchContext>, n: u32) -> Self {
        debug_assert!(n > 0);
        let monoid = ctx.short_rules.contains_empty_word();
        debug_assert!(monoid || n < u32::MAX);
        let max_graph_nodes = if monoid { n } else { n + 1 };
        let min_target = if monoid { 0 } else { 1 };
        let mut felsch = FelschGraph::new(Arc::clone(&ctx.short_rules), max_graph_nodes);
        felsch.set_active_nodes(1);
        Self {
            ctx,
            max_graph_nodes,
            min_target,
            felsch,
            pending: Vec::new(),
        }
    }

    /// Seeds the trail with the case split for the very first edge `(0, 0)`.
    ///
    /// Kept separate from construction so that worker cursors in the
    /// parallel engine can be built without it (only one worker is seeded).
    pub(crate) fn seed_initial_trail(&mut self) {
        let n = self.max_graph_nodes;
        if n > 1 || self.min_target == 1 {
            self.pending.push(PendingDef::new(0, 0, 1, 0, 2));
        }
        if self.min_target == 0 {
            self.pending.push(PendingDef::new(0, 0, 0, 0, 1));
        }
    }

    /// Rolls back to the definition's snapshot, commits it, and runs
    /// closure. Returns `true` exactly when the graph is now complete and
    /// compatible with the long and extra rules, i.e. is a result.
    ///
    /// When the closure leaves some `(node, generator)` pair unconstrained,
    /// the full case split for the first such pair is pushed onto the trail
    /// (fresh node first, then existing targets in decreasing order, so the
    /// LIFO pop tries existing nodes in increasing order and the fresh node
    /// last) and the current definition is not a result.
    pub(crate) fn try_define(&mut self, pd: PendingDef) -> bool {
        debug_assert!(pd.target < pd.num_nodes);
        debug_assert!(pd.num_nodes <= self.max_graph_nodes);

        self.felsch.reduce_number_of_edges_to(pd.num_edges);
        self.felsch.set_active_nodes(pd.num_nodes);
        debug_assert_eq!(self.felsch.target(pd.source, pd.generator), UNDEFINED);

        self.felsch.set_target(pd.source, pd.generator, pd.target);
        if !self.felsch.process_definitions() {
            return false;
        }

        // Look for the first undefined edge, resuming the lexicographic
        // scan just after the definition we committed: everything before it
        // was already defined when the definition was pushed.
        let m = self.felsch.active_nodes();
        let num_edges = self.felsch.number_of_edges();
        let num_gens = self.felsch.out_degree();
        let mut a = pd.generator + 1;
        for next in pd.source..m {
            while a < num_gens {
                if self.felsch.target(next, a) == UNDEFINED {
                    let mut added = 0u64;
                    if m < self.max_graph_nodes {
                        self.pending.push(PendingDef::new(next, a, m, num_edges, m + 1));
                        added += 1;
                    }
                    for b in (self.min_target..m).rev() {
                        self.pending.push(PendingDef::new(next, a, b, num_edges, m));
                        added += 1;
                    }
                    self.ctx.stats.record_pending(added, self.pending.len());
                    return false;
                }
                a += 1;
            }
            a = 0;
        }
        debug_assert!(self.felsch.is_complete());

        // The graph is complete: long rules must hold at every node, extra
        // rules from the start node.
        if !self.felsch.is_compatible(0..m, self.ctx.long_rules.iter()) {
            return false;
        }
        if !self
            .felsch
            .is_compatible(std::iter::once(0), self.ctx.extra.iter())
        {
            return false;
        }
        // Excluded pairs are the mirror image of extra rules: the graph is
        // rejected when both sides of a pair reach the same node from node 0.
        if self
            .ctx
            .excluded
            .iter()
            .any(|pair| self.felsch.is_compatible(std::iter::once(0), std::iter::once(pair)))
        {
            return false;
        }
        self.ctx.stats.record_congruence();
        true
    }

    /// Pops trail entries through [`try_define`](Self::try_define) until a
    /// result is found (`true`) or the trail is exhausted (`false`).
    pub(crate) fn advance(&mut self) -> bool {
        while let Some(pd) = self.pending.pop() {
            if self.try_define(pd) {
                return true;
            }
        }
        // Exhausted: become the distinguished zero-node graph.
        self.felsch.reduce_number_of_edges_to(0);
        self.felsch.set_active_nodes(0);
        false
    }

    /// The current graph, trimmed to its active nodes.
    pub(crate) fn word_graph(&self) -> WordGraph {
        self.felsch.trimmed()
    }

    pub(crate) fn trail_len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn pop_local(&mut self) -> Option<PendingDef> {
        self.pending.pop()
    }

    /// Takes a copy of `victim`'s graph and every other entry of its trail.
    ///
    /// Interleaving ("unzipping") the split spreads shallow and deep
    /// branches across both workers, which balances far better than cutting
    /// the trail in half. Every stolen entry's snapshot is a prefix of the
    /// copied graph's definition stack, so it can be applied directly.
    pub(crate) fn steal_from(&mut self, victim: &mut SearchCursor) {
        debug_assert!(self.pending.is_empty());
        debug_assert!(victim.pending.len() >= 2);
        self.felsch.clone_from(&victim.felsch);
        let mut kept = Vec::with_capacity(victim.pending.len() / 2 + 1);
        for (i, pd) in victim.pending.drain(..).enumerate() {
            if i % 2 == 0 {
                self.pending.push(pd);
            } else {
                kept.push(pd);
            }
        }
        victim.pending = kept;
    }
}

impl PartialEq for SearchCursor {
    fn eq(&self, other: &Self) -> bool {
        self.felsch == other.felsch
    }
}

impl Eq for SearchCursor {}

/// Iterator over the enumerated word graphs of one sequential search.
#[derive(Debug)]
pub struct Iter {
    cursor: SearchCursor,
}

impl Iterator for Iter {
    type Item = WordGraph;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.advance() {
            Some(self.cursor.word_graph())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::search::{
        presentation::{Presentation, Rule, Word},
        word_graph::{from_rows, Label},
    };

    fn engine(p: Presentation) -> LowIndex {
        LowIndex::new(Settings::new(p)).unwrap()
    }

    /// Two-generator monoid with aaa = a, bb = b, abab = a.
    fn two_generator_monoid() -> Presentation {
        Presentation::new(2)
            .with_empty_word(true)
            .with_rule(vec![0, 0, 0], vec![0])
            .with_rule(vec![1, 1], vec![1])
            .with_rule(vec![0, 1, 0, 1], vec![0])
    }

    /// Three-generator monoid used as a larger regression ladder.
    fn three_generator_monoid() -> Presentation {
        Presentation::new(3)
            .with_empty_word(true)
            .with_rule(vec![0, 1, 0], vec![0, 0])
            .with_rule(vec![2, 2], vec![0, 0])
            .with_rule(vec![0, 0, 0], vec![0, 0])
            .with_rule(vec![2, 1], vec![1, 2])
            .with_rule(vec![2, 0], vec![0, 0])
            .with_rule(vec![1, 1], vec![1])
            .with_rule(vec![0, 2], vec![0, 0])
    }

    #[test]
    fn idempotent_generator_with_two_classes() {
        // One generator, aa = a, n = 2: exactly the self-loop and the
        // two-node chain 0 -> 1 -> 1.
        let p = Presentation::new(1)
            .with_empty_word(true)
            .with_rule(vec![0, 0], vec![0]);
        let graphs: Vec<_> = engine(p).iter(2).unwrap().collect();
        assert_eq!(
            graphs,
            vec![from_rows(1, &[&[0]]), from_rows(1, &[&[1], &[1]])]
        );
    }

    #[test]
    fn relation_free_single_generator_bound_one() {
        // No relations, one generator, n = 1: only the self-loop.
        let p = Presentation::new(1).with_empty_word(true);
        let graphs: Vec<_> = engine(p).iter(1).unwrap().collect();
        assert_eq!(graphs, vec![from_rows(1, &[&[0]])]);
    }

    #[test]
    fn two_generator_monoid_counts() {
        let s = engine(two_generator_monoid());
        let counts: Vec<_> = (1..=5)
            .map(|n| s.number_of_congruences(n).unwrap())
            .collect();
        assert_eq!(counts, vec![1, 3, 5, 6, 6]);
    }

    #[test]
    fn two_generator_monoid_graph_sequence() {
        let s = engine(two_generator_monoid());
        let graphs: Vec<_> = s.iter(5).unwrap().collect();
        assert_eq!(
            graphs,
            vec![
                from_rows(2, &[&[0, 0]]),
                from_rows(2, &[&[1, 0], &[1, 1]]),
                from_rows(2, &[&[1, 1], &[1, 1]]),
                from_rows(2, &[&[1, 2], &[1, 1], &[1, 2]]),
                from_rows(2, &[&[1, 2], &[1, 1], &[2, 2]]),
                from_rows(2, &[&[1, 2], &[1, 1], &[3, 2], &[3, 3]]),
            ]
        );
    }

    #[test]
    fn three_generator_monoid_counts() {
        let s = engine(three_generator_monoid());
        let counts: Vec<_> = (1..=10)
            .map(|n| s.number_of_congruences(n).unwrap())
            .collect();
        assert_eq!(counts, vec![1, 3, 13, 36, 82, 135, 166, 175, 176, 176]);
    }

    #[test]
    fn three_generator_monoid_graphs_at_bound_two() {
        let s = engine(three_generator_monoid());
        let graphs: Vec<_> = s.iter(2).unwrap().collect();
        assert_eq!(
            graphs,
            vec![
                from_rows(3, &[&[0, 0, 0]]),
                from_rows(3, &[&[1, 0, 1], &[1, 1, 1]]),
                from_rows(3, &[&[1, 1, 1], &[1, 1, 1]]),
            ]
        );
    }

    #[test]
    fn partition_monoid_two_counts() {
        let s = engine(crate::presentations::partition_monoid_2());
        let counts: Vec<_> = (2..=6)
            .map(|n| s.number_of_congruences(n).unwrap())
            .collect();
        assert_eq!(counts, vec![4, 7, 14, 23, 36]);
    }

    #[test]
    fn cyclic_group_counts_divisors() {
        // Right congruences of Z_m correspond to subgroups, i.e. divisors.
        let s = engine(crate::presentations::cyclic_group(6));
        assert_eq!(s.number_of_congruences(6).unwrap(), 4); // 1, 2, 3, 6
        assert_eq!(s.number_of_congruences(4).unwrap(), 3); // 1, 2, 3
        assert_eq!(s.number_of_congruences(1).unwrap(), 1);
    }

    #[test]
    fn counts_are_monotone_in_the_bound() {
        let s = engine(two_generator_monoid());
        let mut last = 0;
        for n in 1..=6 {
            let count = s.number_of_congruences(n).unwrap();
            assert!(count >= last);
            last = count;
        }
    }

    #[test]
    fn every_yielded_graph_is_sound() {
        let p = three_generator_monoid();
        let rules = p.rules().to_vec();
        let s = engine(p);
        let mut seen = 0;
        s.for_each(4, |g| {
            seen += 1;
            assert!(g.is_complete());
            assert!(g.number_of_nodes() >= 1 && g.number_of_nodes() <= 4);
            assert!(g.is_compatible(0..g.number_of_nodes(), rules.iter()));
        })
        .unwrap();
        assert_eq!(seen, 36);
    }

    #[test]
    fn long_rules_do_not_change_the_result_set() {
        // Moving defining relations from the short set to the long set only
        // defers their enforcement to graph completion.
        let mut short = three_generator_monoid();
        let all_rules = short.rules().to_vec();
        let (kept, deferred) = all_rules.split_at(3);
        short = Presentation::new(3).with_empty_word(true);
        for (l, r) in kept {
            short.add_rule(l.clone(), r.clone());
        }
        let s = LowIndex::new(Settings::new(short).long_rules(deferred.to_vec())).unwrap();
        assert_eq!(s.number_of_congruences(5).unwrap(), 82);
    }

    #[test]
    fn extra_rules_filter_by_trace_from_the_start_node() {
        // Counting with an extra rule equals filtering the plain
        // enumeration by tracing both sides from node 0.
        let extra: Vec<Rule> = vec![(vec![0], vec![1])];
        let plain = engine(two_generator_monoid());
        let mut expected = 0u64;
        plain
            .for_each(5, |g| {
                if g.follow_path(0, &[0]) == g.follow_path(0, &[1]) {
                    expected += 1;
                }
            })
            .unwrap();
        let constrained =
            LowIndex::new(Settings::new(two_generator_monoid()).extra(extra)).unwrap();
        assert_eq!(constrained.number_of_congruences(5).unwrap(), expected);
        assert!(expected > 0);
    }

    #[test]
    fn excluded_pairs_filter_by_trace_inequality() {
        // Counting with an excluded pair equals filtering the plain
        // enumeration by the two sides tracing to different nodes, and the
        // same pair included and excluded partitions the enumeration.
        let pair: Rule = (vec![0], vec![1]);
        let plain = engine(two_generator_monoid());
        let mut separated = 0u64;
        plain
            .for_each(5, |g| {
                if g.follow_path(0, &[0]) != g.follow_path(0, &[1]) {
                    separated += 1;
                }
            })
            .unwrap();
        assert!(separated > 0);

        let excluding =
            LowIndex::new(Settings::new(two_generator_monoid()).exclude(vec![pair.clone()]))
                .unwrap();
        assert_eq!(excluding.number_of_congruences(5).unwrap(), separated);

        let including =
            LowIndex::new(Settings::new(two_generator_monoid()).extra(vec![pair])).unwrap();
        assert_eq!(
            including.number_of_congruences(5).unwrap() + separated,
            plain.number_of_congruences(5).unwrap()
        );
    }

    #[test]
    fn excluding_the_empty_pair_rejects_everything() {
        let s = LowIndex::new(
            Settings::new(two_generator_monoid()).exclude(vec![(vec![], vec![])]),
        )
        .unwrap();
        assert_eq!(s.number_of_congruences(4).unwrap(), 0);
    }

    #[test]
    fn an_exhausted_cursor_equals_the_end_cursor() {
        let ctx = Arc::new(SearchContext {
            short_rules: Arc::new(two_generator_monoid()),
            extra: Vec::new(),
            long_rules: Vec::new(),
            excluded: Vec::new(),
            stats: SearchStats::new(),
        });

        // The distinguished end cursor: never seeded, exhausted at once.
        let mut end = SearchCursor::new(Arc::clone(&ctx), 3);
        assert!(!end.advance());
        assert_eq!(end.word_graph().number_of_nodes(), 0);

        let mut cursor = SearchCursor::new(ctx, 3);
        cursor.seed_initial_trail();
        assert!(cursor.advance());
        assert!(cursor != end);
        while cursor.advance() {}
        assert_eq!(cursor, end);
    }

    #[test]
    fn find_if_returns_the_empty_graph_when_nothing_matches() {
        let s = engine(two_generator_monoid());
        let result = s.find_if(3, |g| g.number_of_nodes() > 7).unwrap();
        assert_eq!(result.number_of_nodes(), 0);
    }

    #[test]
    fn find_if_stops_at_the_first_match() {
        let s = engine(two_generator_monoid());

        let mut examined_by_find = 0;
        let found = s
            .find_if(5, |_| {
                examined_by_find += 1;
                true
            })
            .unwrap();
        assert_eq!(found, from_rows(2, &[&[0, 0]]));

        // An equivalent early-exit guard over for_each examines the same
        // number of graphs.
        let mut examined_by_guard = 0;
        let mut done = false;
        s.for_each(5, |_| {
            if !done {
                examined_by_guard += 1;
                done = true;
            }
        })
        .unwrap();
        assert_eq!(examined_by_find, examined_by_guard);
    }

    #[test]
    fn configuration_errors_are_reported_up_front() {
        use crate::error::ConfigError;

        let s = engine(two_generator_monoid());
        assert!(matches!(
            s.number_of_congruences(0).unwrap_err().config_error(),
            ConfigError::ZeroClassBound
        ));
        assert!(matches!(
            s.iter(0).unwrap_err().config_error(),
            ConfigError::ZeroClassBound
        ));

        assert!(matches!(
            LowIndex::new(Settings::new(Presentation::new(0)))
                .unwrap_err()
                .config_error(),
            ConfigError::EmptyPresentation
        ));
        assert!(matches!(
            LowIndex::new(Settings::new(two_generator_monoid()).number_of_threads(0))
                .unwrap_err()
                .config_error(),
            ConfigError::ZeroThreads
        ));
        assert!(matches!(
            LowIndex::new(Settings::new(two_generator_monoid()).idle_thread_restarts(0))
                .unwrap_err()
                .config_error(),
            ConfigError::ZeroIdleRestarts
        ));
        assert!(matches!(
            LowIndex::new(Settings::new(two_generator_monoid()).extra(vec![(vec![5], vec![0])]))
                .unwrap_err()
                .config_error(),
            ConfigError::LetterOutOfBounds { letter: 5, .. }
        ));
        assert!(matches!(
            LowIndex::new(Settings::new(two_generator_monoid()).exclude(vec![(vec![7], vec![0])]))
                .unwrap_err()
                .config_error(),
            ConfigError::LetterOutOfBounds { letter: 7, .. }
        ));
    }

    #[test]
    fn semigroup_bound_cannot_exhaust_the_node_type() {
        use crate::error::ConfigError;

        // The adjoined identity needs a node of its own, so the bound for a
        // semigroup presentation must stay below u32::MAX.
        let s = engine(crate::presentations::partition_monoid_2());
        assert!(matches!(
            s.iter(u32::MAX).unwrap_err().config_error(),
            ConfigError::ClassBoundTooLarge
        ));
    }

    #[test]
    fn stats_track_accepted_graphs() {
        let s = engine(two_generator_monoid());
        assert_eq!(s.number_of_congruences(5).unwrap(), 6);
        let snap = s.stats();
        assert_eq!(snap.congruences, 6);
        assert!(snap.total_pending > 0);
        assert!(snap.max_pending > 0);
    }

    // --- brute-force completeness ---

    /// Renumbers nodes in order of first appearance along the lexicographic
    /// edge scan from node 0. Returns `None` when some node is unreachable.
    fn canonicalize(g: &WordGraph) -> Option<WordGraph> {
        let k = g.number_of_nodes();
        let m = g.out_degree();
        let mut order: Vec<Node> = vec![0];
        let mut names: Vec<Option<Node>> = vec![None; k as usize];
        names[0] = Some(0);
        let mut i = 0;
        while i < order.len() {
            let u = order[i];
            for a in 0..m {
                let v = g.target(u, a).unwrap();
                if names[v as usize].is_none() {
                    names[v as usize] = Some(order.len() as Node);
                    order.push(v);
                }
            }
            i += 1;
        }
        if order.len() != k as usize {
            return None;
        }
        let mut h = WordGraph::new(k, m);
        for u in 0..k {
            for a in 0..m {
                let v = g.target(u, a).unwrap();
                h.set_target(names[u as usize].unwrap(), a, names[v as usize].unwrap());
            }
        }
        Some(h)
    }

    /// Counts congruences by enumerating every complete edge table on up to
    /// `n` nodes, filtering by reachability and rule satisfaction, and
    /// deduplicating up to relabelling. Monoid convention only.
    fn brute_force_count(p: &Presentation, n: u32) -> u64 {
        let m = p.alphabet_size();
        let mut classes: HashSet<WordGraph> = HashSet::new();
        for k in 1..=n {
            let cells = (k * m) as usize;
            let mut table = vec![0 as Node; cells];
            'tables: loop {
                let mut g = WordGraph::new(k, m);
                for (i, &t) in table.iter().enumerate() {
                    g.set_target((i as u32) / m, (i as u32) % m, t);
                }
                if let Some(canonical) = canonicalize(&g) {
                    if canonical.is_compatible(0..k, p.rules().iter()) {
                        classes.insert(canonical);
                    }
                }
                // Odometer over all k^cells tables.
                for i in 0..cells {
                    table[i] += 1;
                    if table[i] < k {
                        continue 'tables;
                    }
                    table[i] = 0;
                }
                break;
            }
        }
        classes.len() as u64
    }

    #[test]
    fn brute_force_agrees_on_the_two_generator_monoid() {
        let p = two_generator_monoid();
        let s = engine(p.clone());
        for n in 1..=3 {
            assert_eq!(
                s.number_of_congruences(n).unwrap(),
                brute_force_count(&p, n),
                "bound {n}"
            );
        }
    }

    fn small_word() -> impl Strategy<Value = Word> {
        proptest::collection::vec(0..2 as Label, 0..=3)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn brute_force_agrees_on_random_presentations(
            rules in proptest::collection::vec((small_word(), small_word()), 0..=2),
            n in 1..=3u32,
        ) {
            let mut p = Presentation::new(2).with_empty_word(true);
            for (l, r) in &rules {
                p.add_rule(l.clone(), r.clone());
            }
            let s = LowIndex::new(Settings::new(p.clone())).unwrap();
            prop_assert_eq!(
                s.number_of_congruences(n).unwrap(),
                brute_force_count(&p, n)
            );
        }
    }
}
