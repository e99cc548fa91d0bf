//! OpenAI chat completions.

use reqwest::Client;

use crate::core::client::{ClientSettings, LlmClient, post_json, probe_key};
use crate::core::provider::ProviderId;
use crate::core::response::{CallOptions, KeyStatus, LlmResponse};
use crate::providers::chat::{self, ChatRequest, ErrorCodeField};

/// OpenAI client. Error codes fall back to `error.type`, which is where
/// OpenAI puts `insufficient_quota` and friends when `code` is null.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    settings: ClientSettings,
    http: Client,
}

impl OpenAiClient {
    #[must_use]
    pub const fn new(settings: ClientSettings, http: Client) -> Self {
        Self { settings, http }
    }
}

impl LlmClient for OpenAiClient {
    fn provider(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    async fn call(&self, prompt: &str, options: CallOptions) -> LlmResponse {
        let s = &self.settings;
        if !s.has_key() {
            return s.missing_key();
        }

        let (max_tokens, temperature) = s.merged(options);
        let body = ChatRequest::user(&s.model, prompt, max_tokens, temperature);
        match post_json(&self.http, s, &s.api_key, &body).await {
            Ok(reply) if reply.is_ok() => chat::parse_success(s, &reply.body),
            Ok(reply) => {
                chat::parse_error(s, reply.status, &reply.body, ErrorCodeField::CodeOrType)
            }
            Err(failure) => failure,
        }
    }

    async fn check_key_status(&self) -> KeyStatus {
        probe_key(self, &self.settings).await
    }
}
