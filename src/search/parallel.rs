//! Work-stealing execution of the search across a fixed pool of threads.
//!
//! Each worker owns a [`SearchCursor`] behind a mutex. A worker drains its
//! own trail; when that runs dry it tries to steal from the other workers
//! in round-robin order. Stealing copies the victim's graph and takes every
//! other entry of its trail, so both sides continue from coherent state.
//! A worker that finds neither local nor stealable work yields the thread
//! and re-polls, up to the configured number of idle restarts, before
//! shutting down; because a worker only ever goes idle with an empty trail
//! of its own, no pending work is abandoned and the set of graphs produced
//! does not depend on the thread count.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use tracing::debug;

use crate::search::{
    engine::{SearchContext, SearchCursor},
    pending::PendingDef,
    word_graph::WordGraph,
};

pub(crate) struct WorkerPool {
    cursors: Vec<Mutex<SearchCursor>>,
    done: AtomicBool,
    result: Mutex<Option<WordGraph>>,
    idle_restarts: usize,
}

impl WorkerPool {
    pub(crate) fn new(
        ctx: &Arc<SearchContext>,
        n: u32,
        threads: usize,
        idle_restarts: usize,
    ) -> Self {
        debug_assert!(threads > 1);
        let mut cursors = Vec::with_capacity(threads);
        for i in 0..threads {
            let mut cursor = SearchCursor::new(Arc::clone(ctx), n);
            if i == 0 {
                cursor.seed_initial_trail();
            }
            cursors.push(Mutex::new(cursor));
        }
        Self {
            cursors,
            done: AtomicBool::new(false),
            result: Mutex::new(None),
            idle_restarts,
        }
    }

    /// Runs `hook` once per enumerated graph. A `true` return stops every
    /// worker; the graph that triggered it is returned. The hook runs under
    /// a pool-wide lock, so it never observes two graphs concurrently.
    pub(crate) fn run<F>(self, hook: F) -> Option<WordGraph>
    where
        F: FnMut(&WordGraph) -> bool + Send,
    {
        let hook = Mutex::new(hook);
        std::thread::scope(|scope| {
            for me in 0..self.cursors.len() {
                let pool = &self;
                let hook = &hook;
                scope.spawn(move || pool.worker(me, hook));
            }
        });
        debug!(workers = self.cursors.len(), "worker pool drained");
        self.result.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn worker<F>(&self, me: usize, hook: &Mutex<F>)
    where
        F: FnMut(&WordGraph) -> bool + Send,
    {
        for _ in 0..self.idle_restarts {
            loop {
                if self.done.load(Ordering::Acquire) {
                    return;
                }
                let Some(pd) = self.pop_local(me).or_else(|| self.steal(me)) else {
                    break;
                };
                let mut cursor = self.cursors[me].lock().unwrap();
                if cursor.try_define(pd) {
                    let graph = cursor.word_graph();
                    drop(cursor);
                    if (hook.lock().unwrap())(&graph) {
                        if !self.done.swap(true, Ordering::AcqRel) {
                            *self.result.lock().unwrap() = Some(graph);
                        }
                        return;
                    }
                }
            }
            std::thread::yield_now();
        }
    }

    fn pop_local(&self, me: usize) -> Option<PendingDef> {
        self.cursors[me].lock().unwrap().pop_local()
    }

    /// Round-robin over the other workers, skipping any whose trail has
    /// fewer than two entries (a single entry stays with its owner). Locks
    /// are only ever taken victim first, thief second, and the thief's
    /// trail is empty, so two concurrent steals cannot wait on each other.
    fn steal(&self, me: usize) -> Option<PendingDef> {
        let threads = self.cursors.len();
        for offset in 1..threads {
            let victim_index = (me + offset) % threads;
            let mut victim = self.cursors[victim_index].lock().unwrap();
            if victim.trail_len() < 2 {
                continue;
            }
            let mut thief = self.cursors[me].lock().unwrap();
            thief.steal_from(&mut victim);
            drop(victim);
            return thief.pop_local();
        }
        None
    }
}
