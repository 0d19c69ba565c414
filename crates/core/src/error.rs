use serde::{Deserialize, Serialize};

/// A formula parse error.
///
/// `position` is the zero-based character offset of the offending token
/// (the formula length when input ended early).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        ParseError {
            position,
            message: message.into(),
        }
    }

    /// Serialize for `--output json` consumers. Always includes both fields.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": "ParseError",
            "message": self.message,
            "position": self.position,
        })
    }

    /// Render the formula with a caret under the failing position.
    pub fn format_with_source(&self, source: &str) -> String {
        format!(
            "{}\n{}\n{}^",
            self,
            source,
            " ".repeat(self.position.min(source.chars().count()))
        )
    }
}
