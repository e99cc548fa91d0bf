//! Error types for nudge.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! Errors are categorized into five categories:
//! - **Authentication**: Credential format or token signing problems
//! - **Network**: HTTP client setup problems outside a provider call
//! - **Configuration**: Config file parsing, validation, or unknown providers
//! - **Provider**: Every provider in the fallback chain failed
//! - **Internal**: I/O, JSON, or unclassified issues
//!
//! Provider calls themselves never return `Err`: they are converted into a
//! failed [`LlmResponse`](crate::core::response::LlmResponse). This type covers
//! everything around them (storage, CLI, token signing).

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential problems detected locally.
    Authentication,
    /// Transport problems.
    Network,
    /// Configuration issues (parse errors, invalid values, unknown providers).
    Configuration,
    /// Provider-level failures.
    Provider,
    /// Internal errors (I/O, serialization, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Authentication => "Authentication error",
            Self::Network => "Network error",
            Self::Configuration => "Configuration error",
            Self::Provider => "Provider error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Authentication => "A",
            Self::Network => "N",
            Self::Configuration => "C",
            Self::Provider => "P",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes for the `nudge` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Bad configuration or arguments
    ConfigError = 2,
    /// No provider could serve the request
    ProviderError = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as Self
    }
}

// =============================================================================
// Token Errors
// =============================================================================

/// Failure while deriving a signed short-lived token from an `id.secret` key.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The key does not split into exactly two non-empty parts.
    #[error("invalid API key format, expected 'id.secret'")]
    InvalidFormat,

    /// The signing backend rejected the input.
    #[error("signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

// =============================================================================
// Main Error
// =============================================================================

/// Main error type for nudge operations.
#[derive(Error, Debug)]
pub enum NudgeError {
    // ==========================================================================
    // Authentication errors
    // ==========================================================================
    /// Signed token could not be generated.
    #[error("token generation failed for {provider}: {source}")]
    TokenGeneration {
        provider: String,
        #[source]
        source: TokenError,
    },

    // ==========================================================================
    // Network errors
    // ==========================================================================
    /// HTTP client could not be built.
    #[error("network error: {0}")]
    Network(String),

    // ==========================================================================
    // Configuration errors
    // ==========================================================================
    /// Error parsing a persisted document.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unknown provider id.
    #[error("invalid provider: {0}")]
    InvalidProvider(String),

    // ==========================================================================
    // Provider errors
    // ==========================================================================
    /// All providers failed for a call.
    #[error("no provider available: {message}")]
    NoProviderAvailable {
        code: Option<String>,
        message: String,
    },

    // ==========================================================================
    // Internal errors
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NudgeError {
    /// Map error to a process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::ConfigParse { .. }
            | Self::Config(_)
            | Self::InvalidProvider(_)
            | Self::TokenGeneration { .. } => ExitCode::ConfigError,

            Self::NoProviderAvailable { .. } => ExitCode::ProviderError,

            Self::Network(_) | Self::Io(_) | Self::Json(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::TokenGeneration { .. } => ErrorCategory::Authentication,
            Self::Network(_) => ErrorCategory::Network,
            Self::ConfigParse { .. } | Self::Config(_) | Self::InvalidProvider(_) => {
                ErrorCategory::Configuration
            }
            Self::NoProviderAvailable { .. } => ErrorCategory::Provider,
            Self::Io(_) | Self::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `NUDGE-{category}{number}`.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::TokenGeneration { .. } => "NUDGE-A001",

            Self::Network(_) => "NUDGE-N099",

            Self::ConfigParse { .. } => "NUDGE-C001",
            Self::Config(_) => "NUDGE-C002",
            Self::InvalidProvider(_) => "NUDGE-C010",

            Self::NoProviderAvailable { .. } => "NUDGE-P001",

            Self::Io(_) => "NUDGE-X001",
            Self::Json(_) => "NUDGE-X002",
        }
    }

    /// Short hint printed under the error by the CLI.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::InvalidProvider(_) => Some(format!(
                "Valid providers: {}",
                crate::core::provider::ProviderId::ALL
                    .iter()
                    .map(|p| p.id())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            Self::NoProviderAvailable { .. } => {
                Some("Run `nudge keys set <provider> <key>` and `nudge keys check`".to_string())
            }
            Self::TokenGeneration { .. } => {
                Some("GLM-4 keys must look like '<id>.<secret>'".to_string())
            }
            Self::ConfigParse { path, .. } => Some(format!("Check or remove {path}")),
            _ => None,
        }
    }
}

/// Result type alias for nudge operations.
pub type Result<T> = std::result::Result<T, NudgeError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn error_category_code_prefix() {
        assert_eq!(ErrorCategory::Authentication.code_prefix(), "A");
        assert_eq!(ErrorCategory::Network.code_prefix(), "N");
        assert_eq!(ErrorCategory::Configuration.code_prefix(), "C");
        assert_eq!(ErrorCategory::Provider.code_prefix(), "P");
        assert_eq!(ErrorCategory::Internal.code_prefix(), "X");
    }

    #[test]
    fn error_codes_match_category_prefix() {
        let errors = vec![
            NudgeError::TokenGeneration {
                provider: "glm4".to_string(),
                source: TokenError::InvalidFormat,
            },
            NudgeError::Network("reset".to_string()),
            NudgeError::ConfigParse {
                path: "/tmp/x.json".to_string(),
                message: "eof".to_string(),
            },
            NudgeError::Config("bad".to_string()),
            NudgeError::InvalidProvider("ollama".to_string()),
            NudgeError::NoProviderAvailable {
                code: None,
                message: "none".to_string(),
            },
            NudgeError::Io(std::io::Error::other("disk")),
            NudgeError::Json(serde_json::from_str::<u8>("x").unwrap_err()),
        ];

        let mut seen = HashSet::new();
        for err in &errors {
            let code = err.error_code();
            let expected = format!("NUDGE-{}", err.category().code_prefix());
            assert!(code.starts_with(&expected), "{code} should start with {expected}");
            assert!(seen.insert(code), "duplicate code {code}");
        }
    }

    #[test]
    fn exit_codes_are_correct() {
        assert_eq!(
            NudgeError::InvalidProvider("x".to_string()).exit_code(),
            ExitCode::ConfigError
        );
        assert_eq!(
            NudgeError::TokenGeneration {
                provider: "glm4".to_string(),
                source: TokenError::InvalidFormat,
            }
            .exit_code(),
            ExitCode::ConfigError
        );
        assert_eq!(
            NudgeError::NoProviderAvailable {
                code: Some("network_error".to_string()),
                message: "down".to_string(),
            }
            .exit_code(),
            ExitCode::ProviderError
        );
        assert_eq!(i32::from(ExitCode::Success), 0);
    }

    #[test]
    fn invalid_provider_hint_lists_providers() {
        let hint = NudgeError::InvalidProvider("ollama".to_string())
            .hint()
            .unwrap();
        assert!(hint.contains("deepseek"));
        assert!(hint.contains("openai"));
    }
}
