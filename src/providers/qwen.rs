//! Alibaba DashScope (Qwen) text generation.
//!
//! The request nests messages under `input` and sampling options under
//! `parameters`; errors use top-level `code` / `message`, sometimes inside a
//! 200 response.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::client::{
    ClientSettings, LlmClient, decode_body, error_object, http_failure, post_json, probe_key,
    text_field,
};
use crate::core::provider::ProviderId;
use crate::core::response::{CallOptions, KeyStatus, LlmResponse};
use crate::providers::chat::{ChatMessage, Usage};

/// Qwen client (bearer key, DashScope envelope).
#[derive(Debug, Clone)]
pub struct QwenClient {
    settings: ClientSettings,
    http: Client,
}

impl QwenClient {
    #[must_use]
    pub const fn new(settings: ClientSettings, http: Client) -> Self {
        Self { settings, http }
    }
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    input: GenerationInput<'a>,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationInput<'a> {
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    output: GenerationOutput,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Default, Deserialize)]
struct GenerationOutput {
    #[serde(default)]
    text: String,
}

impl QwenClient {
    fn parse_success(&self, body: &str) -> LlmResponse {
        let s = &self.settings;
        let parsed: GenerationResponse = match decode_body(s, body) {
            Ok(p) => p,
            Err(failure) => return failure,
        };
        if let Some(code) = parsed.code.filter(|c| !c.is_empty()) {
            let message = parsed.message.unwrap_or_else(|| "unknown error".to_string());
            return s.failure(code, message);
        }
        s.success(parsed.output.text, parsed.usage.total_tokens)
    }

    fn parse_error(&self, status: u16, body: &str) -> LlmResponse {
        let s = &self.settings;
        let Some(root) = error_object(body) else {
            return http_failure(s, status);
        };
        let code = text_field(&root, "code").unwrap_or_else(|| "unknown".to_string());
        let message = text_field(&root, "message").unwrap_or_else(|| "unknown error".to_string());
        s.failure(code, message)
    }
}

impl LlmClient for QwenClient {
    fn provider(&self) -> ProviderId {
        ProviderId::Qwen
    }

    async fn call(&self, prompt: &str, options: CallOptions) -> LlmResponse {
        let s = &self.settings;
        if !s.has_key() {
            return s.missing_key();
        }

        let (max_tokens, temperature) = s.merged(options);
        let body = GenerationRequest {
            model: &s.model,
            input: GenerationInput {
                messages: [ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            },
            parameters: GenerationParameters {
                max_tokens,
                temperature,
            },
        };

        match post_json(&self.http, s, &s.api_key, &body).await {
            Ok(reply) if reply.is_ok() => self.parse_success(&reply.body),
            Ok(reply) => self.parse_error(reply.status, &reply.body),
            Err(failure) => failure,
        }
    }

    async fn check_key_status(&self) -> KeyStatus {
        probe_key(self, &self.settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::build_client;
    use crate::storage::config::ProviderConfig;

    fn client() -> QwenClient {
        let settings = ClientSettings::from_config(
            ProviderId::Qwen,
            &ProviderConfig::defaults_for(ProviderId::Qwen),
        );
        let http = build_client(settings.timeout).unwrap();
        QwenClient::new(settings, http)
    }

    #[test]
    fn ok_body_with_code_is_failure() {
        let resp = client().parse_success(r#"{"code":"Arrearage","message":"overdue"}"#);
        assert!(!resp.success);
        assert_eq!(resp.code(), Some("Arrearage"));
        assert_eq!(resp.error_message.as_deref(), Some("overdue"));
    }

    #[test]
    fn ok_body_with_empty_code_is_success() {
        let resp = client().parse_success(
            r#"{"code":"","output":{"text":"hi"},"usage":{"total_tokens":7}}"#,
        );
        assert!(resp.success);
        assert_eq!(resp.content, "hi");
        assert_eq!(resp.tokens_used, 7);
    }

    #[test]
    fn error_body_uses_top_level_fields() {
        let resp = client().parse_error(401, r#"{"code":"InvalidApiKey","message":"bad key"}"#);
        assert_eq!(resp.code(), Some("InvalidApiKey"));

        let resp = client().parse_error(500, "oops");
        assert_eq!(resp.code(), Some("http_500"));
    }
}
