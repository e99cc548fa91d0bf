//! Zhipu GLM-4 chat completions.
//!
//! Keys have the form `id.secret`. Each call signs a fresh one-hour token and
//! sends it as the bearer credential.

use chrono::Utc;
use reqwest::Client;

use crate::core::client::{ClientSettings, LlmClient, post_json, probe_key};
use crate::core::credential_hash::fingerprint;
use crate::core::provider::ProviderId;
use crate::core::response::{
    CallOptions, ERR_INVALID_FORMAT, ERR_MISSING_API_KEY, ERR_TOKEN_GENERATION, KeyStatus,
    LlmResponse,
};
use crate::core::token;
use crate::providers::chat::{self, ChatRequest, ErrorCodeField};

/// GLM-4 client (signed-token auth, OpenAI-compatible body).
#[derive(Debug, Clone)]
pub struct Glm4Client {
    settings: ClientSettings,
    http: Client,
}

impl Glm4Client {
    #[must_use]
    pub const fn new(settings: ClientSettings, http: Client) -> Self {
        Self { settings, http }
    }
}

impl LlmClient for Glm4Client {
    fn provider(&self) -> ProviderId {
        ProviderId::Glm4
    }

    async fn call(&self, prompt: &str, options: CallOptions) -> LlmResponse {
        let s = &self.settings;
        if !s.has_key() {
            return s.missing_key();
        }

        let signed = match token::split_key(&s.api_key)
            .and_then(|(id, secret)| token::sign(id, secret, Utc::now()))
        {
            Ok(signed) => signed,
            Err(e) => {
                tracing::warn!(key = %fingerprint(&s.api_key), error = %e, "GLM-4 token signing failed");
                return s.failure(ERR_TOKEN_GENERATION, format!("token generation failed: {e}"));
            }
        };

        let (max_tokens, temperature) = s.merged(options);
        let body = ChatRequest::user(&s.model, prompt, max_tokens, temperature);
        match post_json(&self.http, s, &signed.token, &body).await {
            Ok(reply) if reply.is_ok() => chat::parse_success(s, &reply.body),
            Ok(reply) => chat::parse_error(s, reply.status, &reply.body, ErrorCodeField::Code),
            Err(failure) => failure,
        }
    }

    async fn check_key_status(&self) -> KeyStatus {
        let s = &self.settings;
        if !s.has_key() {
            return KeyStatus::invalid_now(ERR_MISSING_API_KEY, "API key is not configured");
        }
        if token::split_key(&s.api_key).is_err() {
            return KeyStatus::invalid_now(
                ERR_INVALID_FORMAT,
                "API key format is invalid, expected 'id.secret'",
            );
        }
        probe_key(self, s).await
    }
}
