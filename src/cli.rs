use crate::board::GameProgress;
use crate::logging::tui_log_path;
use crate::session::{AssistantInterface, SuggestionReport, UserAction};
use crate::snapshot::SnapshotError;
use crate::summary::{ConstraintSummary, format_letters};
use clap::Parser;
use log::LevelFilter;
use std::io::BufRead;
use std::path::PathBuf;

/// Wordle assistant: reads a saved game page, summarizes the board and asks a
/// language model for the next guess.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Saved game page (.html, or .mhtml as saved by the browser)
    pub board: PathBuf,

    /// Gemini model to query (default: gemini-2.0-flash-lite, or $GEMINI_MODEL)
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Gemini API key (default: $GEMINI_API_KEY, then api_key.json in the config dir)
    #[arg(long = "api-key")]
    pub api_key: Option<String>,

    /// Base URL of the generative language API
    #[arg(long = "endpoint")]
    pub endpoint: Option<String>,

    /// Keep running and accept commands on stdin (suggest, reload, exit)
    #[arg(short = 'i', long = "interactive", conflicts_with = "tui")]
    pub interactive: bool,

    /// Full-screen terminal interface
    #[arg(long = "tui")]
    pub tui: bool,

    /// Only show the board and summary; never contact the model
    #[arg(long = "no-suggest")]
    pub no_suggest: bool,

    /// Print the board, summary and suggestions as JSON
    #[arg(long = "json", conflicts_with_all = ["interactive", "tui"])]
    pub json: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Default log level when `RUST_LOG` is not set.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Where logs go instead of stderr. The TUI owns the terminal, so its
    /// logs are written to a file.
    #[must_use]
    pub fn log_file(&self) -> Option<PathBuf> {
        self.tui.then(tui_log_path)
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

pub enum ActionInput {
    Valid(UserAction),
    Invalid,
}

fn parse_action(input: &str) -> ActionInput {
    match input.trim().to_uppercase().as_str() {
        "S" | "SUGGEST" => ActionInput::Valid(UserAction::Suggest),
        "R" | "RELOAD" => ActionInput::Valid(UserAction::Reload),
        "Q" | "QUIT" | "EXIT" => ActionInput::Valid(UserAction::Exit),
        _ => ActionInput::Invalid,
    }
}

pub fn read_action<R: BufRead>(reader: &mut R) -> ActionInput {
    println!("\nEnter a command ('s' to suggest, 'r' to reload the page, 'q' to quit):");
    let mut input = String::new();
    match reader.read_line(&mut input) {
        // End of input behaves like 'quit'
        Ok(0) => ActionInput::Valid(UserAction::Exit),
        Ok(_) => {
            let action = parse_action(&input);
            if matches!(action, ActionInput::Invalid) {
                println!("Unknown command '{}'.", input.trim());
            }
            action
        }
        Err(e) => {
            log::error!("Failed to read command: {e}");
            ActionInput::Valid(UserAction::Exit)
        }
    }
}

pub fn display_board(progress: &GameProgress) {
    if progress.is_empty() {
        println!("No completed guesses on the board.");
        return;
    }
    println!("Board ({} guesses):", progress.len());
    for (i, word) in progress.iter().enumerate() {
        println!("{}. {}  {}", i + 1, word.word(), word.marks());
    }
}

pub fn display_summary(summary: &ConstraintSummary) {
    println!("Pattern:  {}", summary.pattern_string());
    println!("Floating: {}", format_letters(&summary.floating_letters));
    println!("Excluded: {}", format_letters(&summary.excluded_letters));
}

pub fn display_suggestions(report: &SuggestionReport) {
    println!(
        "Suggested words ({:.1}s using {}):",
        report.elapsed.as_secs_f64(),
        report.source
    );
    for (i, suggestion) in report.suggestions.iter().enumerate() {
        if suggestion.consistent {
            println!("{}. {}", i + 1, suggestion.word);
        } else {
            println!("{}. {} (does not fit the board)", i + 1, suggestion.word);
        }
    }
}

/// Line-oriented front end over any `BufRead`.
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> AssistantInterface for CliInterface<R> {
    fn display_board(&mut self, progress: &GameProgress) {
        display_board(progress);
    }

    fn display_summary(&mut self, summary: &ConstraintSummary) {
        display_summary(summary);
    }

    fn display_load_error(&mut self, error: &SnapshotError) {
        eprintln!("{error}");
    }

    fn read_action(&mut self) -> Option<UserAction> {
        match read_action(&mut self.reader) {
            ActionInput::Valid(action) => Some(action),
            ActionInput::Invalid => None,
        }
    }

    fn display_requesting(&mut self, source: &str) {
        println!("Getting suggestion using {source}...");
    }

    fn display_suggestions(&mut self, report: &SuggestionReport) {
        display_suggestions(report);
    }

    fn display_no_suggestion(&mut self) {
        println!("No suggestion available.");
    }

    fn display_exit_message(&mut self) {
        println!("Exiting.");
    }
}
