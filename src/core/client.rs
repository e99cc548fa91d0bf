//! Provider client capability and the pieces every client shares.
//!
//! A client never returns `Err` for a failed call: transport errors, HTTP
//! errors and malformed bodies all become a failed [`LlmResponse`].

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::http::{build_client, classify_transport_error};
use crate::core::provider::ProviderId;
use crate::core::response::{
    CallOptions, ERR_MISSING_API_KEY, ERR_UNKNOWN, KeyStatus, LlmResponse, http_error_code,
};
use crate::error::Result;
use crate::providers::{DeepSeekClient, Glm4Client, OpenAiClient, QwenClient};
use crate::storage::config::ProviderConfig;

/// Prompt sent by a key health check.
pub const HEALTH_CHECK_PROMPT: &str = "Hi";
/// Token cap for a key health check.
pub const HEALTH_CHECK_MAX_TOKENS: u32 = 5;

// =============================================================================
// Capability
// =============================================================================

/// What every provider client can do.
#[allow(async_fn_in_trait)]
pub trait LlmClient {
    /// Which provider this client talks to.
    fn provider(&self) -> ProviderId;

    /// Run one completion.
    async fn call(&self, prompt: &str, options: CallOptions) -> LlmResponse;

    /// Probe the configured key with a minimal real call.
    async fn check_key_status(&self) -> KeyStatus;

    /// Remaining account balance, when the provider exposes one.
    fn get_balance(&self) -> Option<f64> {
        None
    }
}

// =============================================================================
// Registry
// =============================================================================

/// A live client for one of the supported providers.
#[derive(Debug, Clone)]
pub enum ProviderClient {
    DeepSeek(DeepSeekClient),
    Glm4(Glm4Client),
    Qwen(QwenClient),
    OpenAi(OpenAiClient),
}

impl ProviderClient {
    /// Construct the client for `provider` from its stored config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn for_provider(provider: ProviderId, config: &ProviderConfig) -> Result<Self> {
        let settings = ClientSettings::from_config(provider, config);
        let http = build_client(settings.timeout)?;
        Ok(match provider {
            ProviderId::DeepSeek => Self::DeepSeek(DeepSeekClient::new(settings, http)),
            ProviderId::Glm4 => Self::Glm4(Glm4Client::new(settings, http)),
            ProviderId::Qwen => Self::Qwen(QwenClient::new(settings, http)),
            ProviderId::OpenAi => Self::OpenAi(OpenAiClient::new(settings, http)),
        })
    }
}

impl LlmClient for ProviderClient {
    fn provider(&self) -> ProviderId {
        match self {
            Self::DeepSeek(c) => c.provider(),
            Self::Glm4(c) => c.provider(),
            Self::Qwen(c) => c.provider(),
            Self::OpenAi(c) => c.provider(),
        }
    }

    async fn call(&self, prompt: &str, options: CallOptions) -> LlmResponse {
        match self {
            Self::DeepSeek(c) => c.call(prompt, options).await,
            Self::Glm4(c) => c.call(prompt, options).await,
            Self::Qwen(c) => c.call(prompt, options).await,
            Self::OpenAi(c) => c.call(prompt, options).await,
        }
    }

    async fn check_key_status(&self) -> KeyStatus {
        match self {
            Self::DeepSeek(c) => c.check_key_status().await,
            Self::Glm4(c) => c.check_key_status().await,
            Self::Qwen(c) => c.check_key_status().await,
            Self::OpenAi(c) => c.check_key_status().await,
        }
    }

    fn get_balance(&self) -> Option<f64> {
        match self {
            Self::DeepSeek(c) => c.get_balance(),
            Self::Glm4(c) => c.get_balance(),
            Self::Qwen(c) => c.get_balance(),
            Self::OpenAi(c) => c.get_balance(),
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Resolved per-client settings: stored config with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub provider: ProviderId,
    /// Label reported in [`LlmResponse::provider`].
    pub name: String,
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl ClientSettings {
    /// Resolve settings, falling back to provider defaults for blank fields.
    #[must_use]
    pub fn from_config(provider: ProviderId, config: &ProviderConfig) -> Self {
        let or_default = |value: &str, default: &str| {
            let value = value.trim();
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            provider,
            name: or_default(&config.name, provider.display_name()),
            api_key: config.api_key.trim().to_string(),
            api_base: or_default(&config.api_base, provider.default_api_base()),
            model: or_default(&config.model, provider.default_model()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.timeout(provider),
        }
    }

    /// Whether a key is configured.
    #[must_use]
    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Full completion URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.api_base.trim_end_matches('/'),
            self.provider.completion_path()
        )
    }

    /// Per-call overrides merged over configured defaults.
    #[must_use]
    pub fn merged(&self, options: CallOptions) -> (u32, f64) {
        (
            options.max_tokens.unwrap_or(self.max_tokens),
            options.temperature.unwrap_or(self.temperature),
        )
    }

    #[must_use]
    pub fn success(&self, content: impl Into<String>, tokens_used: u64) -> LlmResponse {
        LlmResponse::success(&self.name, &self.model, content, tokens_used)
    }

    #[must_use]
    pub fn failure(&self, code: impl Into<String>, message: impl Into<String>) -> LlmResponse {
        LlmResponse::failure(&self.name, &self.model, code, message)
    }

    /// Failure returned before any network activity when no key is set.
    #[must_use]
    pub fn missing_key(&self) -> LlmResponse {
        self.failure(ERR_MISSING_API_KEY, "API key is not configured")
    }
}

// =============================================================================
// HTTP helpers
// =============================================================================

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// POST a JSON body with bearer auth to the completion endpoint.
///
/// Transport failures come back as a ready-made failed response.
pub async fn post_json<B: Serialize + ?Sized>(
    http: &Client,
    settings: &ClientSettings,
    bearer: &str,
    body: &B,
) -> std::result::Result<RawReply, LlmResponse> {
    let url = settings.endpoint();
    tracing::debug!(provider = %settings.provider, %url, model = %settings.model, "POST completion");

    let response = http
        .post(&url)
        .bearer_auth(bearer)
        .json(body)
        .send()
        .await
        .map_err(|e| transport_failure(settings, &e))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| transport_failure(settings, &e))?;

    tracing::debug!(provider = %settings.provider, status, bytes = body.len(), "completion reply");
    Ok(RawReply { status, body })
}

fn transport_failure(settings: &ClientSettings, err: &reqwest::Error) -> LlmResponse {
    let (code, message) = classify_transport_error(err);
    tracing::debug!(provider = %settings.provider, code, error = %err, "transport failure");
    settings.failure(code, message)
}

/// Decode a success body, mapping shape mismatches to `unknown_error`.
pub fn decode_body<T: DeserializeOwned>(
    settings: &ClientSettings,
    body: &str,
) -> std::result::Result<T, LlmResponse> {
    serde_json::from_str(body)
        .map_err(|e| settings.failure(ERR_UNKNOWN, format!("unexpected response: {e}")))
}

/// Parse a non-200 body as a JSON object; `None` when it is anything else.
#[must_use]
pub fn error_object(body: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Read a code/message field that may be a string or a number.
#[must_use]
pub fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Failure for a non-200 reply whose body could not be interpreted.
#[must_use]
pub fn http_failure(settings: &ClientSettings, status: u16) -> LlmResponse {
    settings.failure(http_error_code(status), format!("HTTP error: {status}"))
}

// =============================================================================
// Health check
// =============================================================================

/// Shared key probe: minimal call, classified per provider.
pub async fn probe_key<C: LlmClient>(client: &C, settings: &ClientSettings) -> KeyStatus {
    if !settings.has_key() {
        return KeyStatus::invalid_now(ERR_MISSING_API_KEY, "API key is not configured");
    }

    let options = CallOptions::default().with_max_tokens(HEALTH_CHECK_MAX_TOKENS);
    let response = client.call(HEALTH_CHECK_PROMPT, options).await;
    classify_probe(settings.provider, response)
}

/// Turn a probe call's response into a key status.
#[must_use]
pub fn classify_probe(provider: ProviderId, response: LlmResponse) -> KeyStatus {
    if response.success {
        return KeyStatus::valid_now();
    }

    let message = response.error_message.unwrap_or_default();
    if provider.health_check_invalidates(response.error_code.as_deref()) {
        let code = response.error_code.unwrap_or_else(|| ERR_UNKNOWN.to_string());
        tracing::info!(%provider, %code, "key check failed");
        KeyStatus::invalid_now(code, message)
    } else {
        tracing::info!(%provider, code = ?response.error_code, "key check inconclusive");
        KeyStatus::inconclusive_now(response.error_code, message)
    }
}
