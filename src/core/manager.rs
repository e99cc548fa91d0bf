//! Provider manager: owns the persisted state and the live client pool.
//!
//! Calls go to the active provider first and, when `auto_fallback` is on, to
//! the rest of `fallback_order` one at a time. Every mutation is written to
//! disk immediately.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;
use serde_json::Value;

use crate::core::client::{LlmClient, ProviderClient};
use crate::core::credential_hash::{KeyChange, fingerprint};
use crate::core::provider::{ProviderId, is_call_invalidating};
use crate::core::response::{CallOptions, ERR_PROVIDER_NOT_FOUND, KeyStatus, LlmResponse};
use crate::error::Result;
use crate::storage::cache::{CacheContext, ContentCache};
use crate::storage::config::{DailyStats, ManagerState, ProviderConfig, StateSource, UsageStats};
use crate::storage::paths::AppPaths;
use crate::util::time::today_key;

/// Read-only projection of one provider for status views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSummary {
    pub id: ProviderId,
    pub name: String,
    pub enabled: bool,
    pub has_key: bool,
    pub key_valid: bool,
    pub is_active: bool,
}

/// Partial update for a provider's stored config. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfigUpdate {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub timeout_seconds: Option<u64>,
}

impl ProviderConfigUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.enabled.is_none()
            && self.api_key.is_none()
            && self.api_base.is_none()
            && self.model.is_none()
            && self.max_tokens.is_none()
            && self.temperature.is_none()
            && self.timeout_seconds.is_none()
    }

    fn apply(self, config: &mut ProviderConfig) {
        if let Some(name) = self.name {
            config.name = name;
        }
        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
            if self.enabled.is_none() {
                config.enabled = config.has_key();
            }
        }
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(api_base) = self.api_base {
            config.api_base = api_base;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = Some(timeout);
        }
    }
}

/// Result of a cache-aside call.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Served from the content cache.
    Cached(Value),
    /// Generated now (successfully or not).
    Generated(LlmResponse),
}

/// Multi-provider front door.
#[derive(Debug)]
pub struct ProviderManager {
    config_path: PathBuf,
    state: ManagerState,
    source: StateSource,
    clients: BTreeMap<ProviderId, ProviderClient>,
}

impl ProviderManager {
    /// Load state (user → bundled → built-in) and build the client pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial config file cannot be written.
    pub fn open(paths: &AppPaths) -> Result<Self> {
        let (state, source) = ManagerState::load(paths)?;
        let mut manager = Self {
            config_path: paths.llm_config_file(),
            state,
            source,
            clients: BTreeMap::new(),
        };
        manager.rebuild_clients();
        Ok(manager)
    }

    /// Where the state was loaded from.
    #[must_use]
    pub const fn source(&self) -> StateSource {
        self.source
    }

    /// The full in-memory state.
    #[must_use]
    pub const fn state(&self) -> &ManagerState {
        &self.state
    }

    /// Providers that currently have a live client.
    pub fn live_providers(&self) -> impl Iterator<Item = ProviderId> + '_ {
        self.clients.keys().copied()
    }

    fn persist(&self) -> bool {
        match self.state.save(&self.config_path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.config_path.display(), error = %e, "failed to persist provider config");
                false
            }
        }
    }

    /// Only enabled providers with a key get a client.
    fn rebuild_clients(&mut self) {
        self.clients.clear();
        for (&provider, config) in &self.state.providers {
            if !config.is_callable() {
                continue;
            }
            match ProviderClient::for_provider(provider, config) {
                Ok(client) => {
                    self.clients.insert(provider, client);
                }
                Err(e) => {
                    tracing::warn!(%provider, error = %e, "could not build provider client");
                }
            }
        }
        tracing::debug!(
            live = ?self.clients.keys().collect::<Vec<_>>(),
            "provider clients rebuilt"
        );
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Complete `prompt` with the active provider, falling back if allowed.
    pub async fn call(&mut self, prompt: &str, options: CallOptions) -> LlmResponse {
        let primary = self.state.active_provider;

        if let Some(client) = self.clients.get(&primary) {
            tracing::debug!(provider = %primary, "calling active provider");
            let response = client.call(prompt, options).await;
            if response.success {
                self.record_usage(primary, response.tokens_used);
                return response;
            }

            tracing::warn!(
                provider = %primary,
                code = ?response.error_code,
                message = ?response.error_message,
                "active provider failed"
            );
            if is_call_invalidating(response.code()) {
                self.mark_key_invalid(primary, &response);
            }
        } else {
            tracing::debug!(provider = %primary, "active provider has no live client");
        }

        if self.state.auto_fallback {
            let order: Vec<ProviderId> = self
                .state
                .fallback_order
                .iter()
                .copied()
                .filter(|p| *p != primary)
                .collect();

            for fallback in order {
                let Some(client) = self.clients.get(&fallback) else {
                    continue;
                };
                tracing::info!(provider = %fallback, "trying fallback provider");
                let response = client.call(prompt, options).await;
                if response.success {
                    self.record_usage(fallback, response.tokens_used);
                    return response;
                }
                tracing::warn!(
                    provider = %fallback,
                    code = ?response.error_code,
                    "fallback provider failed"
                );
            }
        }

        tracing::warn!("no provider available");
        LlmResponse::none_available()
    }

    /// Cache-aside call: serve `content_type`/`context` from `cache`, or
    /// generate it and store the content on success.
    pub async fn call_cached(
        &mut self,
        cache: &mut ContentCache,
        content_type: &str,
        context: &CacheContext,
        prompt: &str,
        options: CallOptions,
    ) -> Answer {
        if let Some(hit) = cache.get(content_type, context) {
            tracing::debug!(content_type, "cache hit");
            return Answer::Cached(hit);
        }

        let response = self.call(prompt, options).await;
        if response.success {
            cache.set(content_type, context, Value::String(response.content.clone()));
        }
        Answer::Generated(response)
    }

    fn mark_key_invalid(&mut self, provider: ProviderId, response: &LlmResponse) {
        let Some(config) = self.state.providers.get_mut(&provider) else {
            return;
        };
        let code = response.code().unwrap_or_default();
        config.key_status = KeyStatus::invalid_now(
            code,
            response.error_message.clone().unwrap_or_default(),
        );
        tracing::warn!(%provider, code, key = %fingerprint(&config.api_key), "marked API key invalid");
        self.persist();
    }

    fn record_usage(&mut self, provider: ProviderId, tokens: u64) {
        self.state
            .usage_stats
            .record(provider, tokens, Local::now());
        tracing::debug!(%provider, tokens, "usage recorded");
        self.persist();
    }

    // =========================================================================
    // Key checks
    // =========================================================================

    /// Health-check every live client and store the results.
    pub async fn check_all_keys(&mut self) -> BTreeMap<ProviderId, KeyStatus> {
        let mut results = BTreeMap::new();
        for (&provider, client) in &self.clients {
            let status = client.check_key_status().await;
            results.insert(provider, status);
        }

        for (provider, status) in &results {
            if let Some(config) = self.state.providers.get_mut(provider) {
                config.key_status = status.clone();
            }
        }
        self.persist();
        results
    }

    /// Health-check one provider and store the result.
    ///
    /// Unknown ids and providers without a live client report
    /// `provider_not_found` and change nothing.
    pub async fn check_key(&mut self, id: &str) -> KeyStatus {
        let client = ProviderId::from_id(id)
            .ok()
            .and_then(|p| self.clients.get(&p).map(|c| (p, c)));
        let Some((provider, client)) = client else {
            return KeyStatus {
                valid: false,
                error: Some(ERR_PROVIDER_NOT_FOUND.to_string()),
                message: format!("no configured client for provider '{id}'"),
                ..KeyStatus::default()
            };
        };

        let status = client.check_key_status().await;
        if let Some(config) = self.state.providers.get_mut(&provider) {
            config.key_status = status.clone();
        }
        self.persist();
        status
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Store a key; the provider is enabled exactly when the key is non-empty.
    pub fn set_api_key(&mut self, id: &str, api_key: &str) -> bool {
        let Ok(provider) = ProviderId::from_id(id) else {
            return false;
        };
        let Some(config) = self.state.providers.get_mut(&provider) else {
            return false;
        };

        let change = KeyChange::between(&config.api_key, api_key);
        config.api_key = api_key.trim().to_string();
        config.enabled = config.has_key();
        tracing::info!(
            %provider,
            change = change.as_str(),
            key = %fingerprint(api_key),
            "API key updated"
        );

        self.persist();
        self.rebuild_clients();
        true
    }

    /// Apply a partial config update.
    pub fn update_provider_config(&mut self, id: &str, update: ProviderConfigUpdate) -> bool {
        let Ok(provider) = ProviderId::from_id(id) else {
            return false;
        };
        let Some(config) = self.state.providers.get_mut(&provider) else {
            return false;
        };

        update.apply(config);
        config.fill_defaults(provider);
        tracing::info!(%provider, enabled = config.enabled, "provider config updated");

        self.persist();
        self.rebuild_clients();
        true
    }

    /// Stored config for `id`.
    #[must_use]
    pub fn get_provider_config(&self, id: &str) -> Option<&ProviderConfig> {
        let provider = ProviderId::from_id(id).ok()?;
        self.state.provider(provider)
    }

    #[must_use]
    pub const fn get_active_provider(&self) -> ProviderId {
        self.state.active_provider
    }

    /// Point calls at `id`. Unknown ids are rejected.
    pub fn set_active_provider(&mut self, id: &str) -> bool {
        let Ok(provider) = ProviderId::from_id(id) else {
            tracing::debug!(id, "rejected unknown active provider");
            return false;
        };
        if !self.state.providers.contains_key(&provider) {
            return false;
        }
        self.state.active_provider = provider;
        tracing::info!(%provider, "active provider changed");
        self.persist();
        true
    }

    /// One summary per configured provider. No network.
    #[must_use]
    pub fn get_available_providers(&self) -> Vec<ProviderSummary> {
        self.state
            .providers
            .iter()
            .map(|(&id, config)| ProviderSummary {
                id,
                name: config.name.clone(),
                enabled: config.enabled,
                has_key: config.has_key(),
                key_valid: config.key_status.valid,
                is_active: id == self.state.active_provider,
            })
            .collect()
    }

    // =========================================================================
    // Usage
    // =========================================================================

    #[must_use]
    pub const fn get_usage_stats(&self) -> &UsageStats {
        &self.state.usage_stats
    }

    /// Today's bucket (local date), zeros if nothing ran today.
    #[must_use]
    pub fn get_today_stats(&self) -> DailyStats {
        self.state.usage_stats.day(&today_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manager(tmp: &TempDir) -> ProviderManager {
        ProviderManager::open(&AppPaths::with_root(tmp.path())).unwrap()
    }

    #[test]
    fn fresh_manager_has_no_live_clients() {
        let tmp = TempDir::new().unwrap();
        let m = manager(&tmp);
        assert_eq!(m.source(), StateSource::BuiltIn);
        assert_eq!(m.live_providers().count(), 0);
        assert_eq!(m.get_active_provider(), ProviderId::DeepSeek);
    }

    #[test]
    fn set_active_rejects_unknown() {
        let tmp = TempDir::new().unwrap();
        let mut m = manager(&tmp);
        assert!(!m.set_active_provider("nonexistent"));
        assert_eq!(m.get_active_provider(), ProviderId::DeepSeek);

        assert!(m.set_active_provider("qwen"));
        assert_eq!(manager(&tmp).get_active_provider(), ProviderId::Qwen);
    }

    #[test]
    fn set_api_key_toggles_enabled_and_client() {
        let tmp = TempDir::new().unwrap();
        let mut m = manager(&tmp);

        assert!(m.set_api_key("openai", "sk-test"));
        assert!(m.get_provider_config("openai").unwrap().enabled);
        assert!(m.live_providers().any(|p| p == ProviderId::OpenAi));

        assert!(m.set_api_key("openai", ""));
        assert!(!m.get_provider_config("openai").unwrap().enabled);
        assert!(!m.live_providers().any(|p| p == ProviderId::OpenAi));

        assert!(!m.set_api_key("ollama", "x"));
    }

    #[test]
    fn update_applies_partial_fields() {
        let tmp = TempDir::new().unwrap();
        let mut m = manager(&tmp);
        let update = ProviderConfigUpdate {
            model: Some("deepseek-reasoner".to_string()),
            max_tokens: Some(1000),
            ..ProviderConfigUpdate::default()
        };
        assert!(m.update_provider_config("deepseek", update));

        let reloaded = manager(&tmp);
        let config = reloaded.get_provider_config("deepseek").unwrap();
        assert_eq!(config.model, "deepseek-reasoner");
        assert_eq!(config.max_tokens, 1000);
        assert!((config.temperature - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn summaries_cover_every_provider() {
        let tmp = TempDir::new().unwrap();
        let mut m = manager(&tmp);
        m.set_api_key("glm4", "id.secret");

        let summaries = m.get_available_providers();
        assert_eq!(summaries.len(), 4);
        let glm = summaries.iter().find(|s| s.id == ProviderId::Glm4).unwrap();
        assert!(glm.enabled && glm.has_key && !glm.key_valid && !glm.is_active);
        assert!(summaries.iter().any(|s| s.is_active && s.id == ProviderId::DeepSeek));
    }

    #[tokio::test]
    async fn call_with_no_clients_is_none() {
        let tmp = TempDir::new().unwrap();
        let mut m = manager(&tmp);
        let resp = m.call("hello", CallOptions::default()).await;
        assert!(!resp.success);
        assert_eq!(resp.provider, "none");
        assert_eq!(m.get_usage_stats().total_calls, 0);
    }

    #[tokio::test]
    async fn check_key_unknown_provider() {
        let tmp = TempDir::new().unwrap();
        let mut m = manager(&tmp);
        let status = m.check_key("nonexistent").await;
        assert!(!status.valid);
        assert_eq!(status.error.as_deref(), Some(ERR_PROVIDER_NOT_FOUND));
    }

    #[test]
    fn today_stats_default_to_zero() {
        let tmp = TempDir::new().unwrap();
        let m = manager(&tmp);
        assert_eq!(m.get_today_stats(), DailyStats::default());
    }
}
