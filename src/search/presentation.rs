//! Finitely presented semigroups and monoids, as consumed by the search.
//!
//! The engine does not parse or normalise presentations: generators are
//! exactly `0..alphabet_size` and, for left congruences, the caller has
//! already reversed every word. [`Presentation::validate`] only checks that
//! every rule stays inside the alphabet.

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    search::word_graph::Label,
};

/// A word over the generators.
pub type Word = Vec<Label>;

/// A defining relation, `lhs = rhs`.
pub type Rule = (Word, Word);

/// A finite presentation over the alphabet `0..alphabet_size`.
///
/// When `contains_empty_word` is `true` the presented object is a monoid and
/// the empty word is an element; otherwise it is a semigroup, and the search
/// adjoins a formal identity as node 0 of every graph it builds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    alphabet_size: u32,
    contains_empty_word: bool,
    rules: Vec<Rule>,
}

impl Presentation {
    pub fn new(alphabet_size: u32) -> Self {
        Self {
            alphabet_size,
            contains_empty_word: false,
            rules: Vec::new(),
        }
    }

    pub fn alphabet_size(&self) -> u32 {
        self.alphabet_size
    }

    pub fn contains_empty_word(&self) -> bool {
        self.contains_empty_word
    }

    /// Sets the monoid/semigroup convention. Chainable, like the other
    /// builder-style methods.
    pub fn with_empty_word(mut self, yes: bool) -> Self {
        self.contains_empty_word = yes;
        self
    }

    pub fn add_rule(&mut self, lhs: impl Into<Word>, rhs: impl Into<Word>) -> &mut Self {
        self.rules.push((lhs.into(), rhs.into()));
        self
    }

    /// Chainable variant of [`add_rule`](Self::add_rule).
    pub fn with_rule(mut self, lhs: impl Into<Word>, rhs: impl Into<Word>) -> Self {
        self.add_rule(lhs, rhs);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Checks that the alphabet is non-empty and that every rule uses only
    /// letters in `0..alphabet_size`.
    pub fn validate(&self) -> Result<()> {
        if self.alphabet_size == 0 {
            return Err(ConfigError::EmptyPresentation.into());
        }
        validate_words(
            self.rules.iter().flat_map(|(l, r)| [l, r]),
            self.alphabet_size,
        )
    }
}

/// Shared by [`Presentation::validate`] and the extra/long rule sets held in
/// the search settings.
pub(crate) fn validate_words<'a>(
    words: impl IntoIterator<Item = &'a Word>,
    alphabet_size: u32,
) -> Result<()> {
    for word in words {
        if let Some(&letter) = word.iter().find(|&&l| l >= alphabet_size) {
            return Err(ConfigError::LetterOutOfBounds {
                letter,
                alphabet_size,
            }
            .into());
        }
    }
    Ok(())
}
