// Library interface for wordle-assistant
// The binary and the integration tests both go through these modules

pub mod board;
pub mod cli;
pub mod config;
pub mod logging;
pub mod session;
pub mod snapshot;
pub mod suggest;
pub mod summary;
pub mod tui;

// Re-export commonly used items for easier testing
pub use board::{
    BoardElement, ElementQuery, GameProgress, GuessedWord, ROW_QUERY, TILE_QUERY, Tile,
    TileFeedback, extract_progress,
};
pub use config::{SuggestConfig, load_config};
pub use session::{
    AssistantInterface, UserAction, assess, get_all_guesses, get_next_guess, run_once,
    run_session,
};
pub use snapshot::{BoardSnapshot, SnapshotError};
pub use suggest::{GeminiClient, SuggestError, SuggestionSource, Unavailable};
pub use summary::{ConstraintSummary, summarize};
