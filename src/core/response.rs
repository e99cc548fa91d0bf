//! Uniform call and key-status results shared by every provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::time::lenient_timestamp;

/// Provider/model label used when no provider could serve a call.
pub const NONE_PROVIDER: &str = "none";

// =============================================================================
// Error codes
// =============================================================================

/// No credential configured; no network attempted.
pub const ERR_MISSING_API_KEY: &str = "missing_api_key";
/// Credential is structurally malformed.
pub const ERR_INVALID_FORMAT: &str = "invalid_format";
/// Signed short-lived token could not be derived.
pub const ERR_TOKEN_GENERATION: &str = "token_generation_failed";
/// Request exceeded its timeout.
pub const ERR_TIMEOUT: &str = "timeout";
/// Connection could not be established.
pub const ERR_NETWORK: &str = "network_error";
/// Anything unexpected; message carries the error text.
pub const ERR_UNKNOWN: &str = "unknown_error";
/// Health check asked for a provider that has no live client.
pub const ERR_PROVIDER_NOT_FOUND: &str = "provider_not_found";

/// `http_<status>` code for non-2xx responses with an unparseable body.
#[must_use]
pub fn http_error_code(status: u16) -> String {
    format!("http_{status}")
}

// =============================================================================
// Call options
// =============================================================================

/// Per-call overrides merged over the provider's configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CallOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl CallOptions {
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

// =============================================================================
// LLM Response
// =============================================================================

/// The single result shape every provider client and the manager return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub success: bool,
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
}

impl LlmResponse {
    /// Successful completion.
    #[must_use]
    pub fn success(
        provider: impl Into<String>,
        model: impl Into<String>,
        content: impl Into<String>,
        tokens_used: u64,
    ) -> Self {
        Self {
            success: true,
            content: content.into(),
            provider: provider.into(),
            model: model.into(),
            tokens_used,
            error_message: None,
            error_code: None,
        }
    }

    /// Failed completion with a machine code and human message.
    #[must_use]
    pub fn failure(
        provider: impl Into<String>,
        model: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            content: String::new(),
            provider: provider.into(),
            model: model.into(),
            tokens_used: 0,
            error_message: Some(message.into()),
            error_code: Some(code.into()),
        }
    }

    /// Synthetic failure returned when every provider has been exhausted.
    #[must_use]
    pub fn none_available() -> Self {
        Self {
            success: false,
            content: String::new(),
            provider: NONE_PROVIDER.to_string(),
            model: NONE_PROVIDER.to_string(),
            tokens_used: 0,
            error_message: Some("no provider available".to_string()),
            error_code: None,
        }
    }

    /// Error code as `&str`, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }
}

// =============================================================================
// Key Status
// =============================================================================

/// Result of the last explicit credential check for a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyStatus {
    pub valid: bool,
    #[serde(with = "lenient_timestamp")]
    pub checked_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    /// Kept as the raw string so malformed values survive a load/save cycle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl KeyStatus {
    /// A key that answered a real call.
    #[must_use]
    pub fn valid_now() -> Self {
        Self {
            valid: true,
            checked_at: Some(Utc::now()),
            error: None,
            message: "API key is valid".to_string(),
            balance: None,
            expires_at: None,
        }
    }

    /// A key that failed with `code`.
    #[must_use]
    pub fn invalid_now(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            checked_at: Some(Utc::now()),
            error: Some(code.into()),
            message: message.into(),
            balance: None,
            expires_at: None,
        }
    }

    /// A failed check that does not condemn the key (transient error).
    #[must_use]
    pub fn inconclusive_now(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            valid: true,
            checked_at: Some(Utc::now()),
            error: code,
            message: message.into(),
            balance: None,
            expires_at: None,
        }
    }
}
