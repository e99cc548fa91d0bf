//! Error rendering for the `nudge` binary.
//!
//! JSON mode gets a structured object on stderr; human mode gets a colored
//! header line plus an optional hint.

use colored::Colorize;
use serde::Serialize;

use crate::error::NudgeError;

#[derive(Debug, Serialize)]
struct ErrorJson {
    error_code: &'static str,
    category: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl ErrorJson {
    fn from_error(error: &NudgeError) -> Self {
        let provider_error_code = match error {
            NudgeError::NoProviderAvailable { code, .. } => code.clone(),
            _ => None,
        };
        Self {
            error_code: error.error_code(),
            category: error.category().to_string(),
            message: error.to_string(),
            provider_error_code,
            hint: error.hint(),
        }
    }
}

/// Render an error for stderr.
#[must_use]
pub fn render_error(error: &NudgeError, json: bool, pretty: bool) -> String {
    if json {
        render_error_json(error, pretty)
    } else {
        render_error_human(error)
    }
}

/// Structured JSON error.
#[must_use]
pub fn render_error_json(error: &NudgeError, pretty: bool) -> String {
    let body = ErrorJson::from_error(error);
    let rendered = if pretty {
        serde_json::to_string_pretty(&body)
    } else {
        serde_json::to_string(&body)
    };
    rendered.unwrap_or_else(|_| render_error_human(error))
}

fn render_error_human(error: &NudgeError) -> String {
    let mut out = format!(
        "{} {}",
        format!("error[{}]:", error.error_code()).red().bold(),
        error
    );
    if let Some(hint) = error.hint() {
        out.push_str(&format!("\n  {} {hint}", "hint:".cyan()));
    }
    out
}
