//! Input errors: everything that stops a run before any PDF is written.
//!
//! Problems with a single field are not errors at this level; the
//! generator draws a fallback box for them and carries on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {source}{}", hint_suffix(.hint))]
    MalformedJson {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    #[error("no `fields` array found in the form document")]
    MissingFields,

    #[error("field #{index} is invalid: {reason}")]
    InvalidField { index: usize, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for InputError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but a value has the wrong type. Check field names and types."
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        InputError::MalformedJson { source: e, hint }
    }
}

impl InputError {
    /// Map a failed read of `path` to `NotFound` or `Read`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            InputError::NotFound(path)
        } else {
            InputError::Read { path, source }
        }
    }
}
