//! Robot-mode output: a stable JSON envelope around each command's data.
//!
//! Envelope keys are camelCase. Payloads under `data` keep the snake_case
//! field names of the persisted config document.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

/// Envelope schema identifier.
pub const SCHEMA_VERSION: &str = "nudge.v1";

/// Top-level JSON envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,
    pub errors: Vec<String>,
}

impl<T> RobotOutput<T> {
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            command: command.into(),
            data,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}

impl<T: Serialize> RobotOutput<T> {
    /// Serialize, optionally pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, pretty: bool) -> Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let out = RobotOutput::new("usage", serde_json::json!({"total_calls": 3}))
            .with_errors(vec!["oops".to_string()]);
        let json: serde_json::Value = serde_json::from_str(&out.render(false).unwrap()).unwrap();
        assert_eq!(json["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(json["command"], "usage");
        assert_eq!(json["data"]["total_calls"], 3);
        assert_eq!(json["errors"][0], "oops");
    }

    #[test]
    fn pretty_is_indented() {
        let out = RobotOutput::new("cache", 1);
        assert!(out.render(true).unwrap().contains("\n  "));
        assert!(!out.render(false).unwrap().contains('\n'));
    }
}
