//! Provider identities and their built-in defaults.
//!
//! Every backend is a closed enum variant; endpoint, model, timeout and
//! credential-error vocabulary hang off it as `const fn`s.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::NudgeError;

// =============================================================================
// Provider Enum
// =============================================================================

/// Supported text-completion backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    DeepSeek,
    Glm4,
    Qwen,
    OpenAi,
}

impl ProviderId {
    /// All providers in default fallback order.
    pub const ALL: &'static [Self] = &[Self::DeepSeek, Self::Glm4, Self::Qwen, Self::OpenAi];

    /// Stable identifier used in config files and on the command line.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::Glm4 => "glm4",
            Self::Qwen => "qwen",
            Self::OpenAi => "openai",
        }
    }

    /// Display name for human output.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::DeepSeek => "DeepSeek",
            Self::Glm4 => "GLM-4",
            Self::Qwen => "Qwen",
            Self::OpenAi => "OpenAI",
        }
    }

    /// Default API base URL.
    #[must_use]
    pub const fn default_api_base(self) -> &'static str {
        match self {
            Self::DeepSeek => "https://api.deepseek.com/v1",
            Self::Glm4 => "https://open.bigmodel.cn/api/paas/v4",
            Self::Qwen => "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Default model name.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek-chat",
            Self::Glm4 => "glm-4",
            Self::Qwen => "qwen-turbo",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    /// Path appended to the API base for a completion request.
    #[must_use]
    pub const fn completion_path(self) -> &'static str {
        match self {
            Self::Qwen => "/generation",
            _ => "/chat/completions",
        }
    }

    /// Default timeout for a single completion request.
    #[must_use]
    pub const fn default_timeout(self) -> Duration {
        match self {
            Self::DeepSeek => Duration::from_secs(30),
            Self::Glm4 | Self::Qwen | Self::OpenAi => Duration::from_secs(60),
        }
    }

    /// Whether the default config enables this provider.
    #[must_use]
    pub const fn enabled_by_default(self) -> bool {
        matches!(self, Self::DeepSeek)
    }

    /// Error codes a health check treats as "the key itself is bad".
    ///
    /// GLM-4 returns an empty list because its health check treats every
    /// failure as invalidating; see [`Self::health_check_invalidates`].
    #[must_use]
    pub const fn credential_error_codes(self) -> &'static [&'static str] {
        match self {
            Self::DeepSeek => &[
                "invalid_api_key",
                "authentication_error",
                "insufficient_quota",
                "invalid_request_error",
            ],
            Self::OpenAi => &[
                "invalid_api_key",
                "insufficient_quota",
                "invalid_request_error",
            ],
            Self::Qwen => &["InvalidApiKey", "Arrearage", "InvalidParameter"],
            Self::Glm4 => &[],
        }
    }

    /// Whether a failed health-check call with `code` marks the key invalid.
    #[must_use]
    pub fn health_check_invalidates(self, code: Option<&str>) -> bool {
        match self {
            Self::Glm4 => true,
            _ => code.is_some_and(|c| self.credential_error_codes().contains(&c)),
        }
    }

    /// Parse from a config key or CLI argument.
    ///
    /// # Errors
    ///
    /// Returns [`NudgeError::InvalidProvider`] for unknown names.
    pub fn from_id(name: &str) -> crate::error::Result<Self> {
        let lower = name.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|p| p.id() == lower)
            .copied()
            .ok_or_else(|| NudgeError::InvalidProvider(name.to_string()))
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderId {
    type Err = NudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s)
    }
}

/// Error codes that make the manager invalidate the active provider's key
/// during a regular call, without waiting for an explicit health check.
pub const CALL_INVALIDATING_CODES: &[&str] = &[
    "invalid_api_key",
    "insufficient_quota",
    "missing_api_key",
    "InvalidApiKey",
    "Arrearage",
];

/// Whether a failed call with `code` should invalidate the stored key status.
#[must_use]
pub fn is_call_invalidating(code: Option<&str>) -> bool {
    code.is_some_and(|c| CALL_INVALIDATING_CODES.contains(&c))
}
