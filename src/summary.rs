//! Constraint summary: folds every guess on the board into one compact
//! description of what is known about the solution.

use crate::board::{GuessedWord, TileFeedback, WORD_LENGTH};
use indexmap::IndexSet;
use serde::{Serialize, Serializer};
use std::fmt;

/// Marks a position whose letter is not yet confirmed.
pub const PLACEHOLDER: char = '_';

/// What the board tells us about the solution.
///
/// A letter in `pattern` never appears in `floating_letters` or
/// `excluded_letters`. Both sets keep first-seen order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConstraintSummary {
    #[serde(serialize_with = "serialize_pattern")]
    pub pattern: [char; WORD_LENGTH],
    pub floating_letters: IndexSet<char>,
    pub excluded_letters: IndexSet<char>,
}

impl Default for ConstraintSummary {
    fn default() -> Self {
        Self {
            pattern: [PLACEHOLDER; WORD_LENGTH],
            floating_letters: IndexSet::new(),
            excluded_letters: IndexSet::new(),
        }
    }
}

impl ConstraintSummary {
    /// Pattern as a five character string, e.g. `__A_E`.
    #[must_use]
    pub fn pattern_string(&self) -> String {
        self.pattern.iter().collect()
    }

    #[must_use]
    pub fn is_confirmed(&self, letter: char) -> bool {
        self.pattern.contains(&letter)
    }

    /// True when nothing is known yet.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pattern.iter().all(|&c| c == PLACEHOLDER)
            && self.floating_letters.is_empty()
            && self.excluded_letters.is_empty()
    }

    /// Whether `word` could still be the solution under these constraints.
    #[must_use]
    pub fn admits(&self, word: &str) -> bool {
        let letters: Vec<char> = word.chars().map(|c| c.to_ascii_uppercase()).collect();
        if letters.len() != WORD_LENGTH || !letters.iter().all(char::is_ascii_alphabetic) {
            return false;
        }
        let pattern_ok = self
            .pattern
            .iter()
            .zip(&letters)
            .all(|(&p, &c)| p == PLACEHOLDER || p == c);
        pattern_ok
            && self.floating_letters.iter().all(|f| letters.contains(f))
            && !letters.iter().any(|c| self.excluded_letters.contains(c))
    }
}

impl fmt::Display for ConstraintSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pattern {} | floating: {} | excluded: {}",
            self.pattern_string(),
            format_letters(&self.floating_letters),
            format_letters(&self.excluded_letters)
        )
    }
}

fn serialize_pattern<S: Serializer>(
    pattern: &[char; WORD_LENGTH],
    s: S,
) -> Result<S::Ok, S::Error> {
    s.serialize_str(&pattern.iter().collect::<String>())
}

/// Comma separated letters, or `none`.
#[must_use]
pub fn format_letters<'a>(letters: impl IntoIterator<Item = &'a char>) -> String {
    let joined = letters
        .into_iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}

/// Collapse the board into a [`ConstraintSummary`].
///
/// Confirmed positions are gathered from every guess before any present or
/// absent tile is looked at, so a letter placed anywhere on the board is
/// never reported as floating or excluded.
#[must_use]
pub fn summarize(progress: &[GuessedWord]) -> ConstraintSummary {
    let mut summary = ConstraintSummary::default();

    // First pass: greens
    for word in progress {
        for (i, tile) in word.tiles().iter().enumerate() {
            if tile.feedback == TileFeedback::Correct {
                summary.pattern[i] = tile.letter;
            }
        }
    }

    // Second pass: yellows and greys
    for word in progress {
        for tile in word.tiles() {
            if summary.is_confirmed(tile.letter) {
                continue;
            }
            match tile.feedback {
                TileFeedback::Present => {
                    summary.floating_letters.insert(tile.letter);
                }
                TileFeedback::Absent => {
                    summary.excluded_letters.insert(tile.letter);
                }
                TileFeedback::Correct | TileFeedback::Empty => {}
            }
        }
    }

    summary
}
