//! Persisted provider configuration, active-provider pointer and usage stats.
//!
//! The whole state is one JSON document (`llm_config.json`). Every field has a
//! serde default so partial or older documents still load; missing providers
//! and blank name/endpoint/model are filled from the built-in table. Provider
//! ids this build does not know are dropped with a warning wherever they
//! appear, so a stray entry never costs the user their stored keys.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::core::provider::ProviderId;
use crate::core::response::KeyStatus;
use crate::error::Result;
use crate::storage::files::{read_json, write_json};
use crate::storage::paths::AppPaths;
use crate::util::time::lenient_timestamp;

/// Document format version written to disk.
pub const STATE_VERSION: &str = "1.0";
/// Default completion token cap.
pub const DEFAULT_MAX_TOKENS: u32 = 500;
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Active provider when the document names none (or one this build lacks).
pub const DEFAULT_ACTIVE_PROVIDER: ProviderId = ProviderId::DeepSeek;

// =============================================================================
// Provider config
// =============================================================================

/// Stored settings for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: String,
    pub enabled: bool,
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Overrides the provider's default request timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    pub key_status: KeyStatus,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: false,
            api_key: String::new(),
            api_base: String::new(),
            model: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_seconds: None,
            key_status: KeyStatus::default(),
        }
    }
}

impl ProviderConfig {
    /// Built-in config for `provider`.
    #[must_use]
    pub fn defaults_for(provider: ProviderId) -> Self {
        Self {
            name: provider.display_name().to_string(),
            enabled: provider.enabled_by_default(),
            api_base: provider.default_api_base().to_string(),
            model: provider.default_model().to_string(),
            ..Self::default()
        }
    }

    /// Replace blank identity fields with the provider's defaults.
    pub fn fill_defaults(&mut self, provider: ProviderId) {
        if self.name.trim().is_empty() {
            self.name = provider.display_name().to_string();
        }
        if self.api_base.trim().is_empty() {
            self.api_base = provider.default_api_base().to_string();
        }
        if self.model.trim().is_empty() {
            self.model = provider.default_model().to_string();
        }
    }

    /// Whether a non-blank key is stored.
    #[must_use]
    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Whether the manager should build a live client for this provider.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.enabled && self.has_key()
    }

    /// Effective request timeout.
    #[must_use]
    pub fn timeout(&self, provider: ProviderId) -> Duration {
        self.timeout_seconds
            .filter(|s| *s > 0)
            .map_or_else(|| provider.default_timeout(), Duration::from_secs)
    }
}

// =============================================================================
// Usage stats
// =============================================================================

/// Call/token counters for one provider on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderUsage {
    pub calls: u64,
    pub tokens: u64,
}

/// One day's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyStats {
    pub calls: u64,
    pub tokens: u64,
    #[serde(deserialize_with = "known_providers::map")]
    pub by_provider: BTreeMap<ProviderId, ProviderUsage>,
}

/// Lifetime counters plus day buckets keyed `YYYY-MM-DD` (local date).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageStats {
    pub total_calls: u64,
    pub total_tokens: u64,
    #[serde(with = "lenient_timestamp")]
    pub last_call_at: Option<DateTime<Utc>>,
    pub daily_stats: BTreeMap<String, DailyStats>,
}

impl UsageStats {
    /// Count one successful call.
    pub fn record(&mut self, provider: ProviderId, tokens: u64, at: DateTime<Local>) {
        self.total_calls += 1;
        self.total_tokens += tokens;
        self.last_call_at = Some(at.with_timezone(&Utc));

        let day = self
            .daily_stats
            .entry(at.format("%Y-%m-%d").to_string())
            .or_default();
        day.calls += 1;
        day.tokens += tokens;

        let per_provider = day.by_provider.entry(provider).or_default();
        per_provider.calls += 1;
        per_provider.tokens += tokens;
    }

    /// Bucket for `day`, zeros if absent.
    #[must_use]
    pub fn day(&self, day: &str) -> DailyStats {
        self.daily_stats.get(day).cloned().unwrap_or_default()
    }
}

// =============================================================================
// Manager state
// =============================================================================

/// The complete persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerState {
    pub version: String,
    #[serde(deserialize_with = "known_providers::active")]
    pub active_provider: ProviderId,
    pub auto_fallback: bool,
    #[serde(deserialize_with = "known_providers::list")]
    pub fallback_order: Vec<ProviderId>,
    #[serde(deserialize_with = "known_providers::map")]
    pub providers: BTreeMap<ProviderId, ProviderConfig>,
    pub usage_stats: UsageStats,
}

impl Default for ManagerState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            active_provider: DEFAULT_ACTIVE_PROVIDER,
            auto_fallback: true,
            fallback_order: ProviderId::ALL.to_vec(),
            providers: ProviderId::ALL
                .iter()
                .map(|&p| (p, ProviderConfig::defaults_for(p)))
                .collect(),
            usage_stats: UsageStats::default(),
        }
    }
}

/// Where the loaded state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSource {
    /// The user's own config file.
    UserFile,
    /// The bundled default file (now copied to the user path).
    Bundled,
    /// Built-in defaults (now written to the user path).
    BuiltIn,
}

impl std::fmt::Display for StateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserFile => write!(f, "user config"),
            Self::Bundled => write!(f, "bundled default config"),
            Self::BuiltIn => write!(f, "built-in defaults"),
        }
    }
}

impl ManagerState {
    /// Load with precedence user file → bundled file → built-in defaults.
    ///
    /// A corrupt document at either path is skipped with a warning. When the
    /// user file was not usable, the chosen state is written to it; an
    /// existing but unreadable user file is first copied to `<file>.bak`.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing the initial user file fails.
    pub fn load(paths: &AppPaths) -> Result<(Self, StateSource)> {
        let user_path = paths.llm_config_file();

        match read_json::<Self>(&user_path) {
            Ok(Some(mut state)) => {
                state.normalize();
                tracing::debug!(path = %user_path.display(), "loaded provider config");
                return Ok((state, StateSource::UserFile));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(path = %user_path.display(), error = %e, "ignoring unreadable provider config");
                keep_backup(&user_path);
            }
        }

        let (mut state, source) = match paths.bundled_config.as_deref().and_then(Self::try_read) {
            Some(state) => (state, StateSource::Bundled),
            None => (Self::default(), StateSource::BuiltIn),
        };
        state.normalize();
        state.save(&user_path)?;
        tracing::info!(path = %user_path.display(), %source, "initialized provider config");
        Ok((state, source))
    }

    fn try_read(path: &Path) -> Option<Self> {
        match read_json::<Self>(path) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable provider config");
                None
            }
        }
    }

    /// Write the document (pretty JSON, atomic).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)?;
        tracing::debug!(path = %path.display(), "provider config saved");
        Ok(())
    }

    /// Ensure every provider is present with non-blank identity fields.
    pub fn normalize(&mut self) {
        if self.version.trim().is_empty() {
            self.version = STATE_VERSION.to_string();
        }
        for &provider in ProviderId::ALL {
            self.providers
                .entry(provider)
                .or_insert_with(|| ProviderConfig::defaults_for(provider))
                .fill_defaults(provider);
        }
    }

    /// Config for `provider`. Always present after [`Self::normalize`].
    #[must_use]
    pub fn provider(&self, provider: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(&provider)
    }
}

/// Path an unreadable config is copied to before it is replaced.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

fn keep_backup(path: &Path) {
    let backup = backup_path(path);
    match std::fs::copy(path, &backup) {
        Ok(_) => tracing::warn!(backup = %backup.display(), "kept unreadable provider config"),
        Err(e) => {
            tracing::warn!(backup = %backup.display(), error = %e, "failed to back up provider config");
        }
    }
}

/// Deserializers for provider-keyed fields that skip unknown ids.
mod known_providers {
    use std::collections::BTreeMap;

    use serde::de::{DeserializeOwned, Error as _};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::DEFAULT_ACTIVE_PROVIDER;
    use crate::core::provider::ProviderId;

    fn known(raw: &str) -> Option<ProviderId> {
        let id = ProviderId::from_id(raw).ok();
        if id.is_none() {
            tracing::warn!(provider = raw, "skipping unknown provider in config");
        }
        id
    }

    pub fn active<'de, D>(deserializer: D) -> Result<ProviderId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(known).unwrap_or(DEFAULT_ACTIVE_PROVIDER))
    }

    pub fn list<'de, D>(deserializer: D) -> Result<Vec<ProviderId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw.iter().filter_map(|id| known(id)).collect())
    }

    pub fn map<'de, D, V>(deserializer: D) -> Result<BTreeMap<ProviderId, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: DeserializeOwned,
    {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        raw.into_iter()
            .filter_map(|(id, value)| known(&id).map(|id| (id, value)))
            .map(|(id, value)| {
                serde_json::from_value(value)
                    .map(|v| (id, v))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}
