//! Next-guess suggestions from a text-generation model.
//!
//! The summary is rendered into a hard-mode prompt, sent to the Gemini
//! `generateContent` endpoint, and the reply is scanned line by line for
//! five-letter words.

use crate::config::SuggestConfig;
use crate::debug_log;
use crate::summary::{ConstraintSummary, format_letters};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Most guesses kept from a single reply.
pub const MAX_SUGGESTIONS: usize = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("suggestions unavailable: {0}")]
    NotConfigured(String),
    #[error("could not build HTTP client: {source}")]
    ClientBuild { source: reqwest::Error },
    #[error("request to {model} failed: {source}")]
    Network {
        model: String,
        source: reqwest::Error,
    },
    #[error("{model} returned HTTP {status}")]
    HttpStatus { model: String, status: StatusCode },
    #[error("unexpected response from {model}: {message}")]
    InvalidResponse { model: String, message: String },
    #[error("no valid five-letter words in the response")]
    NoValidGuesses,
}

/// Anything that can turn a summary into candidate guesses.
pub trait SuggestionSource {
    /// Short label for status lines, usually the model name.
    fn name(&self) -> &str;

    fn suggest(&self, summary: &ConstraintSummary) -> Result<Vec<String>, SuggestError>;
}

/// Stand-in used when no credential could be found. Every request fails with
/// the reason it was created with.
#[derive(Debug, Clone)]
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SuggestionSource for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn suggest(&self, _summary: &ConstraintSummary) -> Result<Vec<String>, SuggestError> {
        Err(SuggestError::NotConfigured(self.reason.clone()))
    }
}

/// Render the hard-mode prompt for `summary`.
#[must_use]
pub fn build_prompt(summary: &ConstraintSummary) -> String {
    let pattern = summary.pattern_string();
    let floating = format_letters(&summary.floating_letters);
    let excluded = format_letters(&summary.excluded_letters);
    format!(
        "You are playing Wordle in HARD MODE. In hard mode, any revealed hints MUST be used in subsequent guesses.\n\
         - Current word pattern: {pattern} (where _ represents unknown letters)\n\
         - Letters in wrong positions (yellow): {floating}\n\
         - Letters not in word (gray): {excluded}\n\
         \n\
         Suggest the three best next 5-letter words to guess. The words must be valid English words.\n\
         IMPORTANT: In hard mode, your suggestions MUST include all yellow letters ({floating}) and MUST match the current pattern ({pattern}).\n\
         Respond with ONLY the three 5-letter words in uppercase, one per line, nothing else."
    )
}

fn is_guess_token(token: &str) -> bool {
    token.len() == 5 && token.chars().all(|c| c.is_ascii_uppercase())
}

/// Keep at most three lines that are exactly five Latin letters once
/// trimmed and uppercased.
pub fn extract_guesses(text: &str) -> Result<Vec<String>, SuggestError> {
    let guesses: Vec<String> = text
        .lines()
        .map(|line| line.trim().to_uppercase())
        .filter(|token| is_guess_token(token))
        .take(MAX_SUGGESTIONS)
        .collect();
    if guesses.is_empty() {
        Err(SuggestError::NoValidGuesses)
    } else {
        Ok(guesses)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Pull `candidates[0].content.parts[0].text` out of a response body.
pub fn response_text(body: &str) -> Result<String, String> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| format!("malformed JSON: {e}"))?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| "no candidate text".to_string())
}

/// Blocking client for the Gemini `generateContent` API.
pub struct GeminiClient {
    http: Client,
    config: SuggestConfig,
}

impl GeminiClient {
    pub fn new(config: SuggestConfig) -> Result<Self, SuggestError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("wordle-assistant/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| SuggestError::ClientBuild { source })?;
        Ok(Self::with_client(config, http))
    }

    #[must_use]
    pub fn with_client(config: SuggestConfig, http: Client) -> Self {
        Self { http, config }
    }

    #[must_use]
    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }
}

impl SuggestionSource for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn suggest(&self, summary: &ConstraintSummary) -> Result<Vec<String>, SuggestError> {
        let model = self.config.model.clone();
        let prompt = build_prompt(summary);
        debug_log!("GeminiClient::suggest() - model={}, summary: {}", model, summary);

        // The URL carries the key; keep it out of logs and errors.
        let response = self
            .http
            .post(self.config.request_url())
            .json(&GenerateRequest::new(&prompt))
            .send()
            .map_err(|source| SuggestError::Network {
                model: model.clone(),
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuggestError::HttpStatus { model, status });
        }

        let body = response.text().map_err(|source| SuggestError::Network {
            model: model.clone(),
            source: source.without_url(),
        })?;
        let text = response_text(&body)
            .map_err(|message| SuggestError::InvalidResponse { model, message })?;
        debug_log!("GeminiClient::suggest() - raw reply: {:?}", text);
        extract_guesses(&text)
    }
}
