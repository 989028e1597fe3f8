//! TUI (Terminal User Interface) for the Wordle assistant
//!
//! Terminal counterpart of the in-page overlay: shows the board read from the
//! snapshot, the constraint summary, and the latest suggestions.
//!
//! # State Machine
//! - `Ready` → `Requesting` (suggestion in flight) → back to `Ready`
//! - `Exiting` is terminal

use crate::board::{GameProgress, GuessedWord, TileFeedback, WORD_LENGTH};
use crate::session::{AssistantInterface, SuggestionReport, UserAction};
use crate::snapshot::SnapshotError;
use crate::summary::{ConstraintSummary, format_letters};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

const MAX_GUESSES: usize = 6;
const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ROW_SPACING: u16 = 2;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

/// Background and foreground for a tile.
fn tile_colors(feedback: TileFeedback) -> (Color, Color) {
    match feedback {
        TileFeedback::Correct => (Color::Green, Color::Black),
        TileFeedback::Present => (Color::Yellow, Color::Black),
        TileFeedback::Absent => (Color::Gray, Color::White),
        TileFeedback::Empty => (Color::DarkGray, Color::White),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TuiState {
    Ready,
    Requesting,
    Exiting,
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    progress: &'a [GuessedWord],
    summary: Option<&'a ConstraintSummary>,
    report: Option<&'a SuggestionReport>,
    state: TuiState,
    message: &'a str,
    error_message: &'a str,
    status: &'a str,
}

/// Map a key press to an action. Unbound keys yield `None`.
fn action_for_key(key: KeyEvent) -> Option<UserAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'C') => Some(UserAction::Exit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char('s' | 'S') => Some(UserAction::Suggest),
        KeyCode::Char('r' | 'R') => Some(UserAction::Reload),
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(UserAction::Exit),
        _ => None,
    }
}

/// Full-screen front end.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    progress: GameProgress,
    summary: Option<ConstraintSummary>,
    report: Option<SuggestionReport>,
    state: TuiState,
    message: String,
    error_message: String,
    status: String,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal backend created");

        Ok(Self {
            terminal,
            progress: Vec::new(),
            summary: None,
            report: None,
            state: TuiState::Ready,
            message: String::new(),
            error_message: String::new(),
            status: "Loading board...".to_string(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let ctx = RenderContext {
            progress: &self.progress,
            summary: self.summary.as_ref(),
            report: self.report.as_ref(),
            state: self.state,
            message: &self.message,
            error_message: &self.error_message,
            status: &self.status,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Title
                Constraint::Length(14), // Board and summary
                Constraint::Min(7),     // Suggestions
                Constraint::Length(3),  // Status line
                Constraint::Length(3),  // Instructions
            ])
            .split(f.area());

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(20)])
            .split(chunks[1]);

        Self::render_title(f, chunks[0]);
        Self::render_board(f, middle[0], ctx.progress);
        Self::render_summary(f, middle[1], ctx.summary);
        Self::render_info(f, chunks[2], ctx.report, ctx.message, ctx.error_message);
        Self::render_status(f, chunks[3], ctx.status);
        Self::render_instructions(f, chunks[4], ctx.state);
    }

    fn render_title(f: &mut Frame, area: Rect) {
        let title = Paragraph::new("WORDLE ASSISTANT")
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_board(f: &mut Frame, area: Rect, progress: &[GuessedWord]) {
        let block = Block::default().title("Board").borders(Borders::ALL);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let available_rows = (inner.height / ROW_SPACING) as usize;
        let shown = available_rows.min(MAX_GUESSES.max(progress.len()));

        // Most recent guesses win when the board does not fit
        let skip_count = progress.len().saturating_sub(shown);
        for row_index in 0..shown {
            match progress.get(skip_count + row_index) {
                Some(word) => Self::render_guess_row(f, word, row_index, inner),
                None => Self::render_empty_row(f, row_index, inner),
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_guess_row(f: &mut Frame, word: &GuessedWord, row_index: usize, area: Rect) {
        let y = area.y + (row_index as u16 * ROW_SPACING);
        if y >= area.y + area.height {
            return;
        }

        let mut spans = vec![Span::raw("  ")];
        for tile in word.tiles() {
            let (bg_color, fg_color) = tile_colors(tile.feedback);
            spans.push(Span::styled(
                format!(" {} ", tile.letter),
                Style::default().fg(fg_color).bg(bg_color),
            ));
            spans.push(Span::raw(" "));
        }

        Self::render_line(f, area, y, spans);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_empty_row(f: &mut Frame, row_index: usize, area: Rect) {
        let y = area.y + (row_index as u16 * ROW_SPACING);
        if y >= area.y + area.height {
            return;
        }

        let (bg_color, fg_color) = tile_colors(TileFeedback::Empty);
        let mut spans = vec![Span::raw("  ")];
        for _ in 0..WORD_LENGTH {
            spans.push(Span::styled(
                "   ",
                Style::default().fg(fg_color).bg(bg_color),
            ));
            spans.push(Span::raw(" "));
        }

        Self::render_line(f, area, y, spans);
    }

    fn render_line(f: &mut Frame, area: Rect, y: u16, spans: Vec<Span>) {
        let line = Line::from(spans);
        let paragraph = Paragraph::new(line);
        f.render_widget(
            paragraph,
            Rect {
                x: area.x,
                y,
                width: area.width,
                height: 1,
            },
        );
    }

    fn render_summary(f: &mut Frame, area: Rect, summary: Option<&ConstraintSummary>) {
        let mut lines = Vec::new();
        match summary {
            Some(summary) => {
                lines.push(Line::from(vec![
                    Span::styled("Pattern:  ", HEADER_STYLE),
                    Span::styled(summary.pattern_string(), SUCCESS_STYLE),
                ]));
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("Floating: ", HEADER_STYLE),
                    Span::styled(format_letters(&summary.floating_letters), INFO_STYLE),
                ]));
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("Excluded: ", HEADER_STYLE),
                    Span::raw(format_letters(&summary.excluded_letters)),
                ]));
            }
            None => lines.push(Line::from("No board loaded")),
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Constraints").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_info(
        f: &mut Frame,
        area: Rect,
        report: Option<&SuggestionReport>,
        message: &str,
        error_message: &str,
    ) {
        let mut lines = Vec::new();

        if let Some(report) = report {
            lines.push(Line::from(vec![Span::styled(
                "Suggested words:",
                HEADER_STYLE,
            )]));
            for (i, suggestion) in report.suggestions.iter().enumerate() {
                let num = i + 1;
                if suggestion.consistent {
                    lines.push(Line::from(vec![Span::styled(
                        format!("  {num}. {}", suggestion.word),
                        SUCCESS_STYLE,
                    )]));
                } else {
                    lines.push(Line::from(format!(
                        "  {num}. {} (does not fit the board)",
                        suggestion.word
                    )));
                }
            }
            lines.push(Line::from(""));
        }

        if !message.is_empty() {
            lines.push(Line::from(vec![Span::styled(message, MESSAGE_STYLE)]));
        }

        if !error_message.is_empty() {
            lines.push(Line::from(vec![Span::styled(error_message, ERROR_STYLE)]));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Suggestions").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, state: TuiState) {
        let text = match state {
            TuiState::Ready => "S/ENTER: Get suggestion | R: Reload page | ESC/Q: Quit",
            TuiState::Requesting => "Waiting for the model...",
            TuiState::Exiting => "Exiting...",
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    fn handle_input(&mut self) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) => {
                debug_log!(
                    "handle_input() - Key event received: code={:?}, modifiers={:?}",
                    key.code,
                    key.modifiers
                );
                let action = action_for_key(key);
                if action.is_none() && key.kind == KeyEventKind::Press {
                    self.error_message = "Unknown key. Use S, R or Q.".to_string();
                } else {
                    self.error_message.clear();
                }
                Ok(action)
            }
            other => {
                debug_log!("handle_input() - Ignoring event: {:?}", other);
                Ok(None)
            }
        }
    }
}

impl AssistantInterface for TuiInterface {
    fn display_board(&mut self, progress: &GameProgress) {
        self.progress.clone_from(progress);
        self.error_message.clear();
        self.status = format!("Board loaded: {} guesses", progress.len());
        self.draw_or_log();
    }

    fn display_summary(&mut self, summary: &ConstraintSummary) {
        self.summary = Some(summary.clone());
        self.draw_or_log();
    }

    fn display_load_error(&mut self, error: &SnapshotError) {
        self.error_message = error.to_string();
        self.status = "Could not load the page".to_string();
        self.draw_or_log();
    }

    fn read_action(&mut self) -> Option<UserAction> {
        loop {
            if self.draw().is_err() {
                info_log!("read_action() - Draw failed, returning Exit");
                return Some(UserAction::Exit);
            }

            match self.handle_input() {
                Ok(Some(action)) => {
                    info_log!("read_action() - Action received: {:?}", action);
                    return Some(action);
                }
                Ok(None) => {}
                Err(_e) => {
                    info_log!("read_action() - Error handling input, returning Exit");
                    return Some(UserAction::Exit);
                }
            }
        }
    }

    fn display_requesting(&mut self, source: &str) {
        self.state = TuiState::Requesting;
        self.error_message.clear();
        self.status = format!("Getting suggestion using {source}...");
        self.draw_or_log();
    }

    fn display_suggestions(&mut self, report: &SuggestionReport) {
        self.state = TuiState::Ready;
        self.status = format!(
            "Suggestion ready! ({:.1}s using {})",
            report.elapsed.as_secs_f64(),
            report.source
        );
        self.message.clear();
        self.report = Some(report.clone());
        self.draw_or_log();
    }

    fn display_no_suggestion(&mut self) {
        self.state = TuiState::Ready;
        self.report = None;
        self.error_message = "No suggestion available. Check the API key and model.".to_string();
        self.status = "Suggestion failed".to_string();
        self.draw_or_log();
    }

    fn display_exit_message(&mut self) {
        self.state = TuiState::Exiting;
        self.message = "Exiting...".to_string();
        self.status = "Exiting application...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
