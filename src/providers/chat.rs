//! Chat-completions wire format shared by DeepSeek, GLM-4 and OpenAI.

use serde::{Deserialize, Serialize};

use crate::core::client::{ClientSettings, decode_body, error_object, http_failure, text_field};
use crate::core::response::{ERR_UNKNOWN, LlmResponse};

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: [ChatMessage<'a>; 1],
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    /// Single user-turn request.
    #[must_use]
    pub const fn user(model: &'a str, prompt: &'a str, max_tokens: u32, temperature: f64) -> Self {
        Self {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub total_tokens: u64,
}

/// Read `choices[0].message.content` and `usage.total_tokens`.
pub fn parse_success(settings: &ClientSettings, body: &str) -> LlmResponse {
    let completion: ChatCompletion = match decode_body(settings, body) {
        Ok(c) => c,
        Err(failure) => return failure,
    };
    let Some(first) = completion.choices.into_iter().next() else {
        return settings.failure(ERR_UNKNOWN, "response contained no choices");
    };
    settings.success(
        first.message.content.unwrap_or_default(),
        completion.usage.total_tokens,
    )
}

/// How the `error.code` field is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCodeField {
    /// `error.code` only.
    Code,
    /// `error.code`, else `error.type`.
    CodeOrType,
}

/// Map a non-200 `{"error": {"code", "message"}}` envelope.
pub fn parse_error(
    settings: &ClientSettings,
    status: u16,
    body: &str,
    field: ErrorCodeField,
) -> LlmResponse {
    let Some(root) = error_object(body) else {
        return http_failure(settings, status);
    };
    let error = root
        .get("error")
        .and_then(|e| e.as_object())
        .cloned()
        .unwrap_or_default();

    let code = match field {
        ErrorCodeField::Code => text_field(&error, "code"),
        ErrorCodeField::CodeOrType => {
            text_field(&error, "code").or_else(|| text_field(&error, "type"))
        }
    }
    .unwrap_or_else(|| "unknown".to_string());
    let message = text_field(&error, "message").unwrap_or_else(|| "unknown error".to_string());

    settings.failure(code, message)
}
