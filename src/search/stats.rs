//! Counters accumulated across a search, shared by all workers.

use std::sync::atomic::{AtomicU64, Ordering};

use prettytable::{Cell, Row, Table};

/// Atomically updated statistics for one search run.
///
/// The counters are shared by every worker (they live behind the engine's
/// `Arc`), so all updates are relaxed atomics; nothing here is used for
/// synchronisation.
#[derive(Debug, Default)]
pub struct SearchStats {
    congruences: AtomicU64,
    total_pending: AtomicU64,
    max_pending: AtomicU64,
}

/// A point-in-time copy of [`SearchStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Number of accepted (complete, compatible) word graphs.
    pub congruences: u64,
    /// Total number of pending definitions ever pushed.
    pub total_pending: u64,
    /// High-water mark of any one worker's trail length.
    pub max_pending: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.congruences.store(0, Ordering::Relaxed);
        self.total_pending.store(0, Ordering::Relaxed);
        self.max_pending.store(0, Ordering::Relaxed);
    }

    pub fn record_congruence(&self) {
        self.congruences.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pending(&self, added: u64, trail_len: usize) {
        self.total_pending.fetch_add(added, Ordering::Relaxed);
        self.max_pending.fetch_max(trail_len as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            congruences: self.congruences.load(Ordering::Relaxed),
            total_pending: self.total_pending.load(Ordering::Relaxed),
            max_pending: self.max_pending.load(Ordering::Relaxed),
        }
    }
}

/// Renders a snapshot as a table, for the demo binaries' final report.
pub fn render_stats_table(stats: &StatsSnapshot) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Congruences"),
        Cell::new("Pending defs (total)"),
        Cell::new("Pending defs (max)"),
    ]));
    table.add_row(Row::new(vec![
        Cell::new(&stats.congruences.to_string()),
        Cell::new(&stats.total_pending.to_string()),
        Cell::new(&stats.max_pending.to_string()),
    ]));
    table.to_string()
}
