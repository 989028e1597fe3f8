//! Orchestration: board → summary → suggestion source → front end.
//!
//! Suggestion failures of every kind end here as "no suggestion"; callers
//! only ever see an `Option`.

use crate::board::{BoardElement, GameProgress, extract_progress};
use crate::snapshot::{BoardSnapshot, SnapshotError};
use crate::suggest::SuggestionSource;
use crate::summary::{ConstraintSummary, summarize};
use crate::{debug_log, info_log};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Suggest,
    Reload,
    Exit,
}

/// One suggested word and whether it fits what the board already shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub word: String,
    pub consistent: bool,
}

/// Result of one successful request.
#[derive(Debug, Clone)]
pub struct SuggestionReport {
    pub suggestions: Vec<Suggestion>,
    pub source: String,
    pub elapsed: Duration,
}

impl SuggestionReport {
    #[must_use]
    pub fn words(&self) -> Vec<String> {
        self.suggestions.iter().map(|s| s.word.clone()).collect()
    }
}

/// Everything known about one snapshot, for machine-readable output.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub guesses: GameProgress,
    pub summary: ConstraintSummary,
    pub suggestions: Option<Vec<Suggestion>>,
}

/// UI seam shared by the line-oriented front end and the TUI.
pub trait AssistantInterface {
    fn display_board(&mut self, progress: &GameProgress);
    fn display_summary(&mut self, summary: &ConstraintSummary);
    fn display_load_error(&mut self, error: &SnapshotError);
    /// `None` means the input was not understood and the caller should ask again.
    fn read_action(&mut self) -> Option<UserAction>;
    fn display_requesting(&mut self, source: &str);
    fn display_suggestions(&mut self, report: &SuggestionReport);
    fn display_no_suggestion(&mut self);
    fn display_exit_message(&mut self);
}

/// Ask `source` for guesses. Every failure is logged and collapsed to `None`.
pub fn request_suggestions(
    summary: &ConstraintSummary,
    source: &dyn SuggestionSource,
) -> Option<SuggestionReport> {
    let started = Instant::now();
    let guesses = match source.suggest(summary) {
        Ok(guesses) => guesses,
        Err(e) => {
            log::error!("Error querying {}: {e}", source.name());
            return None;
        }
    };
    let elapsed = started.elapsed();

    log::info!("All suggested guesses from {}:", source.name());
    for (i, guess) in guesses.iter().enumerate() {
        log::info!("Guess {}: {guess}", i + 1);
    }

    let suggestions = guesses
        .into_iter()
        .map(|word| Suggestion {
            consistent: summary.admits(&word),
            word,
        })
        .collect();
    Some(SuggestionReport {
        suggestions,
        source: source.name().to_string(),
        elapsed,
    })
}

/// Extract, summarize and ask for guesses in one go.
pub fn get_all_guesses<E: BoardElement>(
    document: &E,
    source: &dyn SuggestionSource,
) -> Option<Vec<String>> {
    let progress = extract_progress(document);
    let summary = summarize(&progress);
    let report = request_suggestions(&summary, source);
    if report.is_none() {
        log::info!("No guesses returned from {}", source.name());
    }
    report.map(|r| r.words())
}

/// The first of [`get_all_guesses`], if any.
pub fn get_next_guess<E: BoardElement>(
    document: &E,
    source: &dyn SuggestionSource,
) -> Option<String> {
    get_all_guesses(document, source)?.into_iter().next()
}

/// Extract and summarize a snapshot, optionally asking for guesses too.
pub fn assess(snapshot: &BoardSnapshot, source: Option<&dyn SuggestionSource>) -> Assessment {
    let guesses = snapshot.progress();
    let summary = summarize(&guesses);
    let suggestions = source
        .and_then(|source| request_suggestions(&summary, source))
        .map(|report| report.suggestions);
    Assessment {
        guesses,
        summary,
        suggestions,
    }
}

fn load_and_display<I: AssistantInterface>(
    path: &Path,
    interface: &mut I,
) -> Result<ConstraintSummary, SnapshotError> {
    let snapshot = match BoardSnapshot::load(path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            interface.display_load_error(&e);
            return Err(e);
        }
    };
    let progress = snapshot.progress();
    let summary = summarize(&progress);
    info_log!(
        "load_and_display() - {} guesses, {}",
        progress.len(),
        summary
    );
    interface.display_board(&progress);
    interface.display_summary(&summary);
    Ok(summary)
}

fn suggest_and_display<I: AssistantInterface>(
    summary: &ConstraintSummary,
    source: &dyn SuggestionSource,
    interface: &mut I,
) {
    interface.display_requesting(source.name());
    match request_suggestions(summary, source) {
        Some(report) => interface.display_suggestions(&report),
        None => interface.display_no_suggestion(),
    }
}

/// Show the board once and, if a source is given, one round of suggestions.
pub fn run_once<I: AssistantInterface>(
    path: &Path,
    source: Option<&dyn SuggestionSource>,
    interface: &mut I,
) -> Result<(), SnapshotError> {
    let summary = load_and_display(path, interface)?;
    if let Some(source) = source {
        suggest_and_display(&summary, source, interface);
    }
    Ok(())
}

/// Interactive loop: the board is re-read on demand and suggestions are
/// requested for the most recently loaded state. Until a load succeeds,
/// `Suggest` reports no suggestion.
pub fn run_session<I: AssistantInterface>(
    path: &Path,
    source: &dyn SuggestionSource,
    interface: &mut I,
) {
    // Stays `None` until a load succeeds; nothing is asked for a board never seen
    let mut summary = load_and_display(path, interface).ok();

    loop {
        let Some(action) = interface.read_action() else {
            continue;
        };
        debug_log!("run_session() - action {:?}", action);

        match action {
            UserAction::Exit => {
                interface.display_exit_message();
                break;
            }
            UserAction::Reload => {
                if let Ok(reloaded) = load_and_display(path, interface) {
                    summary = Some(reloaded);
                }
            }
            UserAction::Suggest => match &summary {
                Some(summary) => suggest_and_display(summary, source, interface),
                None => {
                    log::warn!(
                        "No board loaded from {}, not asking {}",
                        path.display(),
                        source.name()
                    );
                    interface.display_no_suggestion();
                }
            },
        }
    }
}
