//! A low-index congruence search engine for finitely presented semigroups
//! and monoids.
//!
//! Given a presentation (an alphabet and a list of defining relations),
//! [`LowIndex`](search::LowIndex) enumerates every right congruence with at
//! most `n` classes, each represented as a complete deterministic word
//! graph: nodes are congruence classes, node 0 is the class of the empty
//! word, and the edge `(u, a)` leads to the class of `ua`. Graphs are
//! produced in a canonical numbering (nodes appear in the order the search
//! first reaches them), so each congruence shows up exactly once.
//!
//! ```
//! use lowindex::search::{LowIndex, Presentation, Settings};
//!
//! // One idempotent generator: aa = a.
//! let p = Presentation::new(1)
//!     .with_empty_word(true)
//!     .with_rule(vec![0, 0], vec![0]);
//! let engine = LowIndex::new(Settings::new(p)).unwrap();
//!
//! // Two right congruences with at most two classes: the trivial one and
//! // the one separating the empty word from everything else.
//! assert_eq!(engine.number_of_congruences(2).unwrap(), 2);
//! ```
//!
//! Searches can run across several threads
//! ([`Settings::number_of_threads`](search::Settings::number_of_threads));
//! the set of graphs produced is the same for any thread count.

pub mod error;
pub mod presentations;
pub mod search;
