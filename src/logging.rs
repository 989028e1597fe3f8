// Conditional logging macros - only active in debug builds

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

use env_logger::Target;
use log::LevelFilter;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "wordle-assistant";
const TUI_LOG_FILE: &str = "tui.log";

/// Install the stderr logger. `RUST_LOG` overrides `default_level`.
/// Calling this more than once is harmless.
pub fn init_logger(default_level: LevelFilter) {
    install(default_level, Target::Stderr);
}

/// Install a logger that appends to `path`. Used while the TUI owns the
/// terminal, since anything written to stderr would land on the screen.
pub fn init_file_logger(default_level: LevelFilter, path: &Path) -> io::Result<()> {
    let file = open_log_file(path)?;
    install(default_level, Target::Pipe(Box::new(file)));
    Ok(())
}

/// Open `path` for appending, creating parent directories as needed.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Log file for TUI sessions: the cache directory if there is one,
/// otherwise the temp directory.
#[must_use]
pub fn tui_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
        .join(TUI_LOG_FILE)
}

fn install(default_level: LevelFilter, target: Target) {
    let env = env_logger::Env::default().default_filter_or(default_level.as_str());
    let result = env_logger::Builder::from_env(env)
        .target(target)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
    if result.is_err() {
        debug_log!("install() - logger already installed");
    }
}
