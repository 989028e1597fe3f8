use std::io;
use std::process::ExitCode;
use wordle_assistant::cli::{Cli, CliInterface, parse_cli};
use wordle_assistant::config::load_config;
use wordle_assistant::logging::{init_file_logger, init_logger};
use wordle_assistant::suggest::{GeminiClient, SuggestionSource, Unavailable};
use wordle_assistant::tui::TuiInterface;
use wordle_assistant::{BoardSnapshot, assess, run_once, run_session};

fn build_source(cli: &Cli) -> Box<dyn SuggestionSource> {
    if cli.no_suggest {
        return Box::new(Unavailable::new("suggestions disabled"));
    }
    let config = match load_config(
        cli.api_key.as_deref(),
        cli.model.as_deref(),
        cli.endpoint.as_deref(),
    ) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}");
            return Box::new(Unavailable::new(e.to_string()));
        }
    };
    match GeminiClient::new(config) {
        Ok(client) => Box::new(client),
        Err(e) => {
            log::warn!("{e}");
            Box::new(Unavailable::new(e.to_string()))
        }
    }
}

fn main() -> ExitCode {
    let cli = parse_cli();
    match cli.log_file() {
        Some(path) => {
            // Without a log file the TUI runs without logging rather than
            // writing over its own screen
            if let Err(e) = init_file_logger(cli.log_level(), &path) {
                eprintln!("Logging disabled: cannot open {}: {e}", path.display());
            }
        }
        None => init_logger(cli.log_level()),
    }

    let source = build_source(&cli);
    // --no-suggest leaves one-shot modes without a source at all
    let one_shot_source = (!cli.no_suggest).then_some(source.as_ref());

    if cli.tui {
        let mut interface = match TuiInterface::new() {
            Ok(interface) => interface,
            Err(e) => {
                eprintln!("Failed to start the terminal interface: {e}");
                return ExitCode::FAILURE;
            }
        };
        run_session(&cli.board, source.as_ref(), &mut interface);
        return ExitCode::SUCCESS;
    }

    if cli.interactive {
        let stdin = io::stdin();
        let mut interface = CliInterface::new(stdin.lock());
        run_session(&cli.board, source.as_ref(), &mut interface);
        return ExitCode::SUCCESS;
    }

    if cli.json {
        let snapshot = match BoardSnapshot::load(&cli.board) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        };
        let assessment = assess(&snapshot, one_shot_source);
        return match serde_json::to_string_pretty(&assessment) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to encode the result: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let stdin = io::stdin();
    let mut interface = CliInterface::new(stdin.lock());
    match run_once(&cli.board, one_shot_source, &mut interface) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
