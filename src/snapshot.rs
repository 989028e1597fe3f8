//! Saved copies of the game page.
//!
//! Accepts plain HTML or the MHTML archives browsers produce with
//! "Save page as... single file". MHTML bodies are quoted-printable encoded,
//! so they are decoded before parsing.

use crate::board::{GameProgress, extract_progress};
use crate::info_log;
use scraper::{ElementRef, Html};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MHTML_EXTENSIONS: [&str; 2] = ["mhtml", "mht"];
const MIME_HEADER_SCAN_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not read page snapshot {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

/// A parsed page snapshot.
pub struct BoardSnapshot {
    html: Html,
}

impl BoardSnapshot {
    /// Parse markup, decoding it first if it looks like an MHTML archive.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if looks_like_mhtml(text) {
            Self::parse_mhtml(text)
        } else {
            Self::parse_html(text)
        }
    }

    #[must_use]
    pub fn parse_html(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    #[must_use]
    pub fn parse_mhtml(text: &str) -> Self {
        Self::parse_html(&decode_quoted_printable(text))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_archive = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                MHTML_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        info_log!("Loaded snapshot {} ({} bytes)", path.display(), text.len());
        Ok(if is_archive {
            Self::parse_mhtml(&text)
        } else {
            Self::parse(&text)
        })
    }

    #[must_use]
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// Shorthand for running the board extractor over this snapshot.
    #[must_use]
    pub fn progress(&self) -> GameProgress {
        extract_progress(&self.root())
    }
}

fn looks_like_mhtml(text: &str) -> bool {
    text.lines()
        .take(MIME_HEADER_SCAN_LINES)
        .any(|line| line.to_ascii_lowercase().starts_with("mime-version:"))
}

/// Decode quoted-printable text: soft line breaks are removed and `=XX`
/// escapes become the byte they name. Anything else is passed through.
#[must_use]
pub fn decode_quoted_printable(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'=' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(b'\n'), _) => i += 2,
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(&hi), Some(&lo)) => match (hex_value(hi), hex_value(lo)) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'=');
                    i += 1;
                }
            },
            _ => {
                out.push(b'=');
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
