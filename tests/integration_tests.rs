// Integration tests for the wordle-assistant application
// These tests verify that all modules work together correctly

use std::cell::Cell;
use std::io::{BufRead, BufReader, Cursor, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::thread;
use wordle_assistant::cli::CliInterface;
use wordle_assistant::session::SuggestionReport;
use wordle_assistant::*;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn temp_page(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "wordle_assistant_it_{}_{}",
        std::process::id(),
        name
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

fn letters(set: &indexmap::IndexSet<char>) -> Vec<char> {
    set.iter().copied().collect()
}

/// Source that answers with a fixed list and counts calls.
struct CannedSource {
    words: Vec<&'static str>,
    calls: Cell<usize>,
}

impl CannedSource {
    fn new(words: Vec<&'static str>) -> Self {
        Self {
            words,
            calls: Cell::new(0),
        }
    }
}

impl SuggestionSource for CannedSource {
    fn name(&self) -> &str {
        "canned"
    }

    fn suggest(&self, _summary: &ConstraintSummary) -> Result<Vec<String>, SuggestError> {
        self.calls.set(self.calls.get() + 1);
        if self.words.is_empty() {
            return Err(SuggestError::NoValidGuesses);
        }
        Ok(self.words.iter().map(|w| (*w).to_string()).collect())
    }
}

/// Records what the session showed, for asserting on the flow.
#[derive(Default)]
struct RecordingInterface {
    actions: Vec<UserAction>,
    boards: Vec<usize>,
    patterns: Vec<String>,
    load_errors: usize,
    reports: Vec<Vec<String>>,
    no_suggestion: usize,
    exited: bool,
    // Page contents to write just before the first reload
    rewrite_on_reload: Option<(PathBuf, String)>,
}

impl AssistantInterface for RecordingInterface {
    fn display_board(&mut self, progress: &GameProgress) {
        self.boards.push(progress.len());
    }

    fn display_summary(&mut self, summary: &ConstraintSummary) {
        self.patterns.push(summary.pattern_string());
    }

    fn display_load_error(&mut self, _error: &SnapshotError) {
        self.load_errors += 1;
    }

    fn read_action(&mut self) -> Option<UserAction> {
        if self.actions.is_empty() {
            return Some(UserAction::Exit);
        }
        let action = self.actions.remove(0);
        if action == UserAction::Reload {
            if let Some((path, contents)) = self.rewrite_on_reload.take() {
                std::fs::write(path, contents).unwrap();
            }
        }
        Some(action)
    }

    fn display_requesting(&mut self, _source: &str) {}

    fn display_suggestions(&mut self, report: &SuggestionReport) {
        self.reports.push(report.words());
    }

    fn display_no_suggestion(&mut self) {
        self.no_suggestion += 1;
    }

    fn display_exit_message(&mut self) {
        self.exited = true;
    }
}

/// Minimal document tree, independent of any HTML parser.
struct Node {
    attributes: Vec<(&'static str, &'static str)>,
    text: &'static str,
    children: Vec<Node>,
}

impl Node {
    fn element(attributes: Vec<(&'static str, &'static str)>, children: Vec<Node>) -> Self {
        Self {
            attributes,
            text: "",
            children,
        }
    }

    fn tile(state: &'static str, letter: &'static str) -> Self {
        Self {
            attributes: vec![
                ("role", "img"),
                ("aria-roledescription", "tile"),
                ("data-state", state),
            ],
            text: letter,
            children: Vec::new(),
        }
    }

    fn row(label: &'static str, tiles: Vec<Node>) -> Self {
        Self::element(vec![("role", "group"), ("aria-label", label)], tiles)
    }

    fn get(&self, name: &str) -> Option<&'static str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    fn collect<'a>(&'a self, query: &ElementQuery, found: &mut Vec<&'a Node>) {
        for child in &self.children {
            if query.matches(child.get("role"), child.get(query.attribute)) {
                found.push(child);
            }
            child.collect(query, found);
        }
    }
}

impl<'a> BoardElement for &'a Node {
    fn find_all(&self, query: &ElementQuery) -> Vec<Self> {
        let node: &'a Node = self;
        let mut found = Vec::new();
        node.collect(query, &mut found);
        found
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    fn text_content(&self) -> String {
        let mut text = self.text.to_string();
        for child in &self.children {
            text.push_str(&child.text_content());
        }
        text
    }
}

fn tiles(word: &[(&'static str, &'static str)]) -> Vec<Node> {
    word.iter()
        .map(|&(state, letter)| Node::tile(state, letter))
        .collect()
}

fn crane_row(label: &'static str) -> Node {
    Node::row(
        label,
        tiles(&[
            ("absent", "c"),
            ("present", "r"),
            ("correct", "a"),
            ("absent", "n"),
            ("correct", "e"),
        ]),
    )
}

#[test]
fn test_extract_from_custom_tree() {
    // Any tree exposing the four queries works, not just scraper's
    let board = Node::element(
        vec![("id", "board")],
        vec![
            crane_row("Row 1"),
            Node::row(
                "Row 2",
                tiles(&[
                    ("absent", "f"),
                    ("absent", "l"),
                    ("correct", "a"),
                    ("absent", "m"),
                    ("correct", "e"),
                ]),
            ),
            Node::row("Row 3", tiles(&[("tbd", "g"), ("tbd", "r")])),
            Node::element(vec![("role", "group"), ("aria-label", "Keyboard")], vec![]),
        ],
    );

    let progress = extract_progress(&&board);
    assert_eq!(progress.len(), 2);
    assert_eq!(progress[0].word(), "CRANE");
    assert_eq!(progress[1].word(), "FLAME");

    let summary = summarize(&progress);
    assert_eq!(summary.pattern_string(), "__A_E");
    assert_eq!(letters(&summary.floating_letters), vec!['R']);
    assert_eq!(letters(&summary.excluded_letters), vec!['C', 'N', 'F', 'L', 'M']);
}

#[test]
fn test_custom_tree_row_with_four_tiles_is_dropped() {
    let board = Node::element(
        vec![],
        vec![
            Node::row(
                "Row 1",
                tiles(&[
                    ("absent", "c"),
                    ("present", "r"),
                    ("correct", "a"),
                    ("absent", "n"),
                ]),
            ),
            crane_row("Row 2"),
        ],
    );

    let progress = extract_progress(&&board);
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].marks(), "XYGXG");
}

#[test]
fn test_mhtml_fixture_end_to_end() {
    let snapshot = BoardSnapshot::load(fixture("partly_solved.mhtml")).unwrap();
    let progress = snapshot.progress();

    // The third row is still being typed
    assert_eq!(progress.len(), 2);
    assert_eq!(progress[0].word(), "CRANE");
    assert_eq!(progress[0].marks(), "XYGXG");
    assert_eq!(progress[1].word(), "FLARE");
    assert_eq!(progress[1].marks(), "XXGGG");

    let summary = summarize(&progress);
    assert_eq!(summary.pattern_string(), "__ARE");
    // R was yellow in CRANE but is confirmed in FLARE
    assert!(summary.floating_letters.is_empty());
    assert_eq!(letters(&summary.excluded_letters), vec!['C', 'N', 'F', 'L']);
    assert!(summary.admits("SHARE"));
    assert!(!summary.admits("FLARE"));
}

#[test]
fn test_summary_is_safe_to_share_across_threads() {
    let snapshot = BoardSnapshot::load(fixture("partly_solved.mhtml")).unwrap();
    let progress = snapshot.progress();
    let expected = summarize(&progress);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| summarize(&progress))).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_get_next_guess_from_fixture() {
    let snapshot = BoardSnapshot::load(fixture("partly_solved.mhtml")).unwrap();
    let source = CannedSource::new(vec!["SHARE", "SPARE"]);

    assert_eq!(
        get_all_guesses(&snapshot.root(), &source),
        Some(vec!["SHARE".to_string(), "SPARE".to_string()])
    );
    assert_eq!(
        get_next_guess(&snapshot.root(), &source),
        Some("SHARE".to_string())
    );
    assert_eq!(source.calls.get(), 2);
}

#[test]
fn test_assess_reports_consistency() {
    let snapshot = BoardSnapshot::load(fixture("partly_solved.mhtml")).unwrap();
    let source = CannedSource::new(vec!["SHARE", "CRATE"]);

    let assessment = assess(&snapshot, Some(&source));
    let suggestions = assessment.suggestions.unwrap();
    assert!(suggestions[0].consistent);
    assert!(!suggestions[1].consistent);
}

#[test]
fn test_run_once_with_failing_source() {
    let mut interface = RecordingInterface::default();
    let source = CannedSource::new(vec![]);

    run_once(&fixture("partly_solved.mhtml"), Some(&source), &mut interface).unwrap();

    assert_eq!(interface.boards, vec![2]);
    assert_eq!(interface.patterns, vec!["__ARE"]);
    assert_eq!(interface.no_suggestion, 1);
    assert!(interface.reports.is_empty());
}

#[test]
fn test_run_once_missing_page() {
    let mut interface = RecordingInterface::default();
    let result = run_once(Path::new("/nonexistent/board.html"), None, &mut interface);

    assert!(matches!(result, Err(SnapshotError::Read { .. })));
    assert_eq!(interface.load_errors, 1);
    assert!(interface.boards.is_empty());
}

#[test]
fn test_session_reload_picks_up_new_guesses() {
    let path = temp_page(
        "reload.html",
        r#"<div role="group" aria-label="Row 1">
            <div role="img" aria-roledescription="tile" data-state="absent">c</div>
            <div role="img" aria-roledescription="tile" data-state="present">r</div>
            <div role="img" aria-roledescription="tile" data-state="correct">a</div>
            <div role="img" aria-roledescription="tile" data-state="absent">n</div>
            <div role="img" aria-roledescription="tile" data-state="correct">e</div>
        </div>"#,
    );
    let updated = std::fs::read_to_string(fixture("partly_solved.mhtml")).unwrap();
    let source = CannedSource::new(vec!["GRAPE"]);
    let mut interface = RecordingInterface {
        actions: vec![UserAction::Suggest, UserAction::Reload, UserAction::Suggest],
        rewrite_on_reload: Some((path.clone(), updated)),
        ..RecordingInterface::default()
    };

    run_session(&path, &source, &mut interface);

    assert_eq!(interface.boards, vec![1, 2]);
    assert_eq!(interface.patterns, vec!["__A_E", "__ARE"]);
    assert_eq!(interface.reports.len(), 2);
    assert_eq!(source.calls.get(), 2);
    assert!(interface.exited);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_session_survives_missing_page() {
    let source = CannedSource::new(vec!["CRANE"]);
    let mut interface = RecordingInterface {
        actions: vec![UserAction::Reload, UserAction::Suggest],
        ..RecordingInterface::default()
    };

    run_session(Path::new("/nonexistent/board.html"), &source, &mut interface);

    assert_eq!(interface.load_errors, 2);
    // Nothing is sent to the source for a board that never loaded
    assert!(interface.reports.is_empty());
    assert_eq!(interface.no_suggestion, 1);
    assert_eq!(source.calls.get(), 0);
    assert!(interface.exited);
}

#[test]
fn test_session_suggests_once_page_appears() {
    let path = std::env::temp_dir().join(format!(
        "wordle_assistant_it_{}_appears.mhtml",
        std::process::id()
    ));
    std::fs::remove_file(&path).ok();
    let page = std::fs::read_to_string(fixture("partly_solved.mhtml")).unwrap();
    let source = CannedSource::new(vec!["SHARE"]);
    let mut interface = RecordingInterface {
        actions: vec![UserAction::Suggest, UserAction::Reload, UserAction::Suggest],
        rewrite_on_reload: Some((path.clone(), page)),
        ..RecordingInterface::default()
    };

    run_session(&path, &source, &mut interface);

    assert_eq!(interface.load_errors, 1);
    assert_eq!(interface.no_suggestion, 1);
    assert_eq!(interface.patterns, vec!["__ARE"]);
    assert_eq!(interface.reports, vec![vec!["SHARE".to_string()]]);
    assert_eq!(source.calls.get(), 1);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_cli_session_over_reader() {
    let source = CannedSource::new(vec!["SHARE", "SPARE", "SNARE"]);
    let input = "s\nwhat\nr\nq\n";
    let mut interface = CliInterface::new(Cursor::new(input));

    // Should complete without panicking and stop at 'q'
    run_session(&fixture("partly_solved.mhtml"), &source, &mut interface);

    assert_eq!(source.calls.get(), 1);
}

#[test]
fn test_cli_session_stops_at_end_of_input() {
    let source = CannedSource::new(vec!["SHARE"]);
    let mut interface = CliInterface::new(Cursor::new("s\n"));

    run_session(&fixture("partly_solved.mhtml"), &source, &mut interface);

    assert_eq!(source.calls.get(), 1);
}

#[test]
fn test_unavailable_source_means_no_suggestion() {
    let snapshot = BoardSnapshot::load(fixture("partly_solved.mhtml")).unwrap();
    let source = Unavailable::new("no API key");
    assert!(get_next_guess(&snapshot.root(), &source).is_none());
    assert!(assess(&snapshot, Some(&source)).suggestions.is_none());
}

/// Serve one canned HTTP response and hand back the request line and body.
fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, thread::JoinHandle<(String, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut content_length = 0;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            if header.trim().is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut request_body = vec![0; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let response = format!(
            concat!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\n",
                "Content-Length: {}\r\nConnection: close\r\n\r\n{}"
            ),
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        (
            request_line.trim_end().to_string(),
            String::from_utf8(request_body).unwrap(),
        )
    });
    (format!("http://{address}"), handle)
}

#[test]
fn test_gemini_client_against_local_server() {
    let (endpoint, server) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"parts":[{"text":"SHARE\nspare\nSNARE\nSTARE"}]}}]}"#,
    );
    let snapshot = BoardSnapshot::load(fixture("partly_solved.mhtml")).unwrap();
    let client = GeminiClient::new(
        SuggestConfig::new("test-key")
            .with_model("gemini-test")
            .with_endpoint(endpoint),
    )
    .unwrap();

    let guesses = get_all_guesses(&snapshot.root(), &client).unwrap();
    assert_eq!(guesses, vec!["SHARE", "SPARE", "SNARE"]);

    let (request_line, request_body) = server.join().unwrap();
    assert_eq!(
        request_line,
        "POST /models/gemini-test:generateContent?key=test-key HTTP/1.1"
    );
    let request: serde_json::Value = serde_json::from_str(&request_body).unwrap();
    let prompt = request["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("__ARE"));
    assert!(prompt.contains("C, N, F, L"));
}

#[test]
fn test_gemini_client_error_status() {
    let (endpoint, server) = serve_once(
        "403 Forbidden",
        r#"{"error":{"code":403,"message":"API key not valid"}}"#,
    );
    let config = SuggestConfig::new("secret-key").with_endpoint(endpoint);
    let client = GeminiClient::new(config).unwrap();

    let error = client.suggest(&ConstraintSummary::default()).unwrap_err();
    assert!(matches!(error, SuggestError::HttpStatus { .. }));
    assert!(!error.to_string().contains("secret-key"));
    server.join().unwrap();
}

#[test]
fn test_gemini_client_reply_without_words() {
    let (endpoint, server) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"parts":[{"text":"I cannot help with that."}]}}]}"#,
    );
    let client = GeminiClient::new(SuggestConfig::new("k").with_endpoint(endpoint)).unwrap();

    let error = client.suggest(&ConstraintSummary::default()).unwrap_err();
    assert!(matches!(error, SuggestError::NoValidGuesses));
    server.join().unwrap();
}
