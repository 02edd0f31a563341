//! Data models and structures
//!
//! Defines the inbound request shape, the structured content the model is asked
//! to produce, and the service configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// A mood or language selection: a single value, or an ordered list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    /// Display form used in prompts and for key matching; lists are joined with `" & "`.
    pub fn display(&self) -> String {
        match self {
            TextOrList::Text(text) => text.clone(),
            TextOrList::List(items) => items.join(" & "),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TextOrList::Text(text) => text.is_empty(),
            TextOrList::List(items) => items.is_empty(),
        }
    }
}

/// Raw body of `POST /api/generate`. Every field is required; absence is checked
/// by the normalizer so that it can be reported as a client error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub mood: Option<TextOrList>,
    #[serde(default)]
    pub language: Option<TextOrList>,
}

/// One song suggestion, kept as the JSON object the model produced.
///
/// Fields are not rewritten: unknown keys and explicit `null`s are relayed as
/// given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Song(pub Map<String, Value>);

impl Song {
    pub fn title(&self) -> Option<&str> {
        self.text_field("title")
    }

    pub fn youtube_link(&self) -> Option<&str> {
        self.text_field("youtube_link")
    }

    fn text_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Captions and song suggestions parsed from model output.
///
/// Only `captions` (strings) and `songs` (objects) are required; any other
/// top-level keys ride along in `extra` and are serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub captions: Vec<String>,
    pub songs: Vec<Song>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeneratedContent {
    pub const EXPECTED_CAPTIONS: usize = 5;
    pub const EXPECTED_SONGS: usize = 5;

    /// Describes every way this content departs from the 5 captions / 5 songs
    /// the prompt asks for. Empty when the model complied.
    pub fn cardinality_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.captions.len() != Self::EXPECTED_CAPTIONS {
            issues.push(format!(
                "expected {} captions, got {}",
                Self::EXPECTED_CAPTIONS,
                self.captions.len()
            ));
        }
        if self.songs.len() != Self::EXPECTED_SONGS {
            issues.push(format!(
                "expected {} songs, got {}",
                Self::EXPECTED_SONGS,
                self.songs.len()
            ));
        }
        issues
    }
}

/// Response body for `GET /api/styles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleCatalog {
    pub moods: Vec<String>,
    pub languages: Vec<String>,
}

pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.0-flash-exp",
    "gemini-2.0-flash-lite-preview-02-05",
    "gemini-flash-latest",
    "gemini-1.5-flash-latest",
];

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 1000;

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub models: Vec<String>,
    pub rate_limit_delay: Duration,
    pub strict_output: bool,
    pub gemini_base_url: String,
    pub bind_addr: String,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_AI_API_KEY").filter(|key| !key.trim().is_empty());

        let models = match lookup("GENERATION_MODELS") {
            Some(list) => {
                let models: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect();
                if models.is_empty() {
                    return Err(crate::Error::Config(
                        "GENERATION_MODELS is set but lists no models".to_string(),
                    ));
                }
                models
            }
            None => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        };

        let rate_limit_delay_ms = match lookup("RATE_LIMIT_DELAY_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                crate::Error::Config(format!("RATE_LIMIT_DELAY_MS is not a number: {}", raw))
            })?,
            None => DEFAULT_RATE_LIMIT_DELAY_MS,
        };

        let strict_output = match lookup("STRICT_OUTPUT") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                crate::Error::Config(format!("STRICT_OUTPUT is not a boolean: {}", raw))
            })?,
            None => false,
        };

        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                crate::Error::Config(format!("MAX_BODY_BYTES is not a number: {}", raw))
            })?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            api_key,
            models,
            rate_limit_delay: Duration::from_millis(rate_limit_delay_ms),
            strict_output,
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            max_body_bytes,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
