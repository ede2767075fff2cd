//! The low-index congruence search: word graphs, presentations, the
//! backtracking engine, and its parallel driver.

pub mod engine;
pub(crate) mod felsch;
pub(crate) mod parallel;
pub(crate) mod pending;
pub mod presentation;
pub mod stats;
pub mod word_graph;

pub use engine::{Iter, LowIndex, Settings};
pub use presentation::{Presentation, Rule, Word};
pub use stats::{render_stats_table, StatsSnapshot};
pub use word_graph::{Label, Node, WordGraph};
