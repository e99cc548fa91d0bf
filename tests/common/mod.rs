//! Shared helpers for integration tests.
//!
//! - `logger`: structured per-test logging
//! - mock provider fixtures that point a provider at a wiremock server
#![allow(dead_code)]

pub mod logger;

use std::path::Path;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nudge::core::manager::{ProviderConfigUpdate, ProviderManager};
use nudge::core::provider::ProviderId;
use nudge::storage::config::ProviderConfig;
use nudge::storage::paths::AppPaths;

/// Well-formed `id.secret` key for GLM-4.
pub const GLM_KEY: &str = "glm-id.glm-secret";

/// Config for `provider` pointed at `base` with `key`.
pub fn provider_config(provider: ProviderId, base: &str, key: &str) -> ProviderConfig {
    ProviderConfig {
        enabled: true,
        api_key: key.to_string(),
        api_base: base.to_string(),
        ..ProviderConfig::defaults_for(provider)
    }
}

/// Manager rooted in `root` with `provider` keyed and pointed at `base`.
pub fn configure(manager: &mut ProviderManager, provider: ProviderId, base: &str, key: &str) {
    assert!(manager.update_provider_config(
        provider.id(),
        ProviderConfigUpdate {
            api_key: Some(key.to_string()),
            api_base: Some(base.to_string()),
            enabled: Some(true),
            ..ProviderConfigUpdate::default()
        },
    ));
}

/// Fresh manager with its state under `root`.
pub fn manager_at(root: &Path) -> ProviderManager {
    ProviderManager::open(&AppPaths::with_root(root)).expect("open manager")
}

/// Chat-completions success body.
pub fn chat_ok(content: &str, total_tokens: u64) -> Value {
    json!({
        "id": "cmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 3, "completion_tokens": 5, "total_tokens": total_tokens}
    })
}

/// Chat-completions error envelope.
pub fn chat_error(code: &str, message: &str) -> Value {
    json!({"error": {"code": code, "message": message, "type": "invalid_request_error"}})
}

/// Qwen generation success body.
pub fn qwen_ok(text: &str, total_tokens: u64) -> Value {
    json!({
        "output": {"text": text, "finish_reason": "stop"},
        "usage": {"input_tokens": 2, "output_tokens": 4, "total_tokens": total_tokens},
        "request_id": "req-1"
    })
}

/// Mount a chat-completions responder on `server`.
pub async fn mount_chat(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Mount a Qwen generation responder on `server`.
pub async fn mount_generation(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/generation"))
        .respond_with(template)
        .mount(server)
        .await;
}
