//! Board extraction.
//!
//! Reads the game grid out of any tree that can answer a handful of queries
//! (find descendants by role and attribute, read an attribute, read text) and
//! turns it into an ordered list of completed guesses.

use crate::debug_log;
use scraper::{ElementRef, Selector};
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

pub const WORD_LENGTH: usize = 5;

/// Attribute carrying the per-tile evaluation.
pub const FEEDBACK_ATTRIBUTE: &str = "data-state";

/// Per-tile signal describing how a letter relates to the hidden solution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileFeedback {
    /// Letter sits at exactly this position in the solution (green).
    Correct,
    /// Letter is in the solution, somewhere else (yellow).
    Present,
    /// Letter is not in the solution (gray).
    Absent,
    /// Unfilled, pending or unrecognized tile.
    Empty,
}

impl TileFeedback {
    #[must_use]
    pub fn from_state(state: &str) -> Self {
        match state {
            "correct" => Self::Correct,
            "present" => Self::Present,
            "absent" => Self::Absent,
            _ => Self::Empty,
        }
    }

    /// Parse the single-letter shorthand used on the command line (G/Y/X).
    #[must_use]
    pub fn from_mark(mark: char) -> Option<Self> {
        match mark.to_ascii_uppercase() {
            'G' => Some(Self::Correct),
            'Y' => Some(Self::Present),
            'X' => Some(Self::Absent),
            _ => None,
        }
    }

    /// Inverse of [`TileFeedback::from_mark`]; unrevealed tiles show as `.`.
    #[must_use]
    pub fn mark(self) -> char {
        match self {
            Self::Correct => 'G',
            Self::Present => 'Y',
            Self::Absent => 'X',
            Self::Empty => '.',
        }
    }

    #[must_use]
    pub fn is_revealed(self) -> bool {
        !matches!(self, Self::Empty)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for TileFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub letter: char,
    pub feedback: TileFeedback,
}

impl Tile {
    #[must_use]
    pub fn new(letter: char, feedback: TileFeedback) -> Self {
        Self {
            letter: letter.to_ascii_uppercase(),
            feedback,
        }
    }
}

/// A completed guess: always exactly five tiles, left to right.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GuessedWord {
    tiles: [Tile; WORD_LENGTH],
}

impl GuessedWord {
    #[must_use]
    pub fn new(tiles: [Tile; WORD_LENGTH]) -> Self {
        Self { tiles }
    }

    /// Returns `None` unless exactly five tiles are supplied.
    #[must_use]
    pub fn from_tiles(tiles: Vec<Tile>) -> Option<Self> {
        let tiles: [Tile; WORD_LENGTH] = tiles.try_into().ok()?;
        Some(Self::new(tiles))
    }

    /// Build a guess from a word and G/Y/X marks, e.g. `("CRANE", "XYGXG")`.
    #[must_use]
    pub fn from_marks(word: &str, marks: &str) -> Option<Self> {
        if word.chars().count() != WORD_LENGTH || !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let tiles = word
            .chars()
            .zip(marks.chars())
            .map(|(letter, mark)| TileFeedback::from_mark(mark).map(|fb| Tile::new(letter, fb)))
            .collect::<Option<Vec<_>>>()?;
        Self::from_tiles(tiles)
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile; WORD_LENGTH] {
        &self.tiles
    }

    /// The guessed word itself, e.g. `CRANE`.
    #[must_use]
    pub fn word(&self) -> String {
        self.tiles.iter().map(|t| t.letter).collect()
    }

    /// Feedback in G/Y/X shorthand, e.g. `XYGXG`.
    #[must_use]
    pub fn marks(&self) -> String {
        self.tiles.iter().map(|t| t.feedback.mark()).collect()
    }
}

/// Guesses in the order they appear on the board.
pub type GameProgress = Vec<GuessedWord>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeMatch {
    Exact,
    Prefix,
}

/// Selects descendant elements by ARIA role plus one attribute constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementQuery {
    pub role: &'static str,
    pub attribute: &'static str,
    pub value: &'static str,
    pub matching: AttributeMatch,
}

/// Board rows: `role="group"` labelled `Row 1`, `Row 2`, ...
pub const ROW_QUERY: ElementQuery = ElementQuery {
    role: "group",
    attribute: "aria-label",
    value: "Row",
    matching: AttributeMatch::Prefix,
};

/// Tiles inside a row: `role="img"` with `aria-roledescription="tile"`.
pub const TILE_QUERY: ElementQuery = ElementQuery {
    role: "img",
    attribute: "aria-roledescription",
    value: "tile",
    matching: AttributeMatch::Exact,
};

impl ElementQuery {
    /// Check an element given its `role` and the queried attribute's value.
    #[must_use]
    pub fn matches(&self, role: Option<&str>, attribute: Option<&str>) -> bool {
        if role != Some(self.role) {
            return false;
        }
        match (attribute, self.matching) {
            (Some(value), AttributeMatch::Exact) => value == self.value,
            (Some(value), AttributeMatch::Prefix) => value.starts_with(self.value),
            (None, _) => false,
        }
    }

    #[must_use]
    pub fn css_selector(&self) -> String {
        let op = match self.matching {
            AttributeMatch::Exact => "=",
            AttributeMatch::Prefix => "^=",
        };
        format!(
            "[role=\"{}\"][{}{}\"{}\"]",
            self.role, self.attribute, op, self.value
        )
    }
}

/// Query surface the extractor needs from a document tree.
///
/// Implementations must return descendants in document order and must not
/// include the element itself.
pub trait BoardElement: Sized {
    fn find_all(&self, query: &ElementQuery) -> Vec<Self>;
    fn attribute(&self, name: &str) -> Option<String>;
    fn text_content(&self) -> String;
}

static ROW_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| parse_selector(&ROW_QUERY));
static TILE_SELECTOR: LazyLock<Option<Selector>> = LazyLock::new(|| parse_selector(&TILE_QUERY));

fn parse_selector(query: &ElementQuery) -> Option<Selector> {
    let css = query.css_selector();
    match Selector::parse(&css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::warn!("Unusable selector {css}: {e:?}");
            None
        }
    }
}

fn select_all<'a>(element: &ElementRef<'a>, selector: Option<&Selector>) -> Vec<ElementRef<'a>> {
    selector
        .map(|selector| element.select(selector).collect())
        .unwrap_or_default()
}

impl BoardElement for ElementRef<'_> {
    fn find_all(&self, query: &ElementQuery) -> Vec<Self> {
        // The board queries are parsed once; anything else is parsed per call
        if *query == ROW_QUERY {
            return select_all(self, ROW_SELECTOR.as_ref());
        }
        if *query == TILE_QUERY {
            return select_all(self, TILE_SELECTOR.as_ref());
        }
        select_all(self, parse_selector(query).as_ref())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }
}

/// Read every completed guess off the board, in row order.
///
/// Never fails: a page without rows yields an empty list and rows that do
/// not hold exactly five revealed tiles are dropped.
pub fn extract_progress<E: BoardElement>(document: &E) -> GameProgress {
    let rows = document.find_all(&ROW_QUERY);
    debug_log!("extract_progress() - {} rows found", rows.len());
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let word = extract_word(row);
            if word.is_none() {
                debug_log!("extract_progress() - row {} is not a completed guess", index + 1);
            }
            word
        })
        .collect()
}

fn extract_word<E: BoardElement>(row: &E) -> Option<GuessedWord> {
    let tiles: Vec<Tile> = row.find_all(&TILE_QUERY).iter().filter_map(read_tile).collect();
    GuessedWord::from_tiles(tiles)
}

fn read_tile<E: BoardElement>(element: &E) -> Option<Tile> {
    let state = element.attribute(FEEDBACK_ATTRIBUTE)?;
    let feedback = TileFeedback::from_state(&state);
    if !feedback.is_revealed() {
        return None;
    }
    let letter = single_letter(&element.text_content())?;
    Some(Tile::new(letter, feedback))
}

fn single_letter(text: &str) -> Option<char> {
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}
