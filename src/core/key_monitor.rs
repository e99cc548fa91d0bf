//! Derived key-health views over a [`ProviderManager`].
//!
//! Only [`KeyStatusMonitor::check_on_startup`] touches the network, and it is
//! the only entry point that needs the manager mutably. Every other view
//! borrows it shared and reads the persisted
//! [`KeyStatus`](crate::core::response::KeyStatus).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::manager::ProviderManager;
use crate::core::provider::ProviderId;
use crate::util::time::parse_timestamp;

/// Remind when a key expires within this many days.
pub const EXPIRY_WARNING_DAYS: i64 = 7;
/// Remind when the balance drops below this.
pub const LOW_BALANCE_THRESHOLD: f64 = 10.0;

/// Per-provider status row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStatus {
    pub id: ProviderId,
    pub name: String,
    pub enabled: bool,
    pub has_key: bool,
    pub is_active: bool,
    pub valid: bool,
    pub error: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub balance: Option<f64>,
    pub needs_attention: bool,
}

/// Read-only key-health views over a borrowed manager.
pub struct KeyStatusMonitor<'a> {
    manager: &'a ProviderManager,
}

impl<'a> KeyStatusMonitor<'a> {
    pub const fn new(manager: &'a ProviderManager) -> Self {
        Self { manager }
    }

    /// Live-check every enabled, keyed provider; one warning per invalid key.
    ///
    /// Results are persisted through the manager, so views built afterwards
    /// see them.
    pub async fn check_on_startup(manager: &mut ProviderManager) -> Vec<String> {
        let mut warnings = Vec::new();
        for summary in manager.get_available_providers() {
            if !(summary.enabled && summary.has_key) {
                continue;
            }
            let status = manager.check_key(summary.id.id()).await;
            if !status.valid {
                let error = status.error.unwrap_or_else(|| "unknown error".to_string());
                warnings.push(format!("{} API key is invalid: {error}", summary.name));
            }
        }
        warnings
    }

    /// Whether the stored status warrants an expiry or low-balance reminder.
    #[must_use]
    pub fn should_remind_expiry(&self, id: &str) -> bool {
        self.should_remind_expiry_at(id, Utc::now())
    }

    /// [`Self::should_remind_expiry`] evaluated at `now`.
    #[must_use]
    pub fn should_remind_expiry_at(&self, id: &str, now: DateTime<Utc>) -> bool {
        let Some(config) = self.manager.get_provider_config(id) else {
            return false;
        };
        let status = &config.key_status;

        let expiring = status
            .expires_at
            .as_deref()
            .and_then(parse_timestamp)
            .is_some_and(|expiry| (expiry - now).num_days() <= EXPIRY_WARNING_DAYS);

        let low_balance = status
            .balance
            .is_some_and(|balance| balance < LOW_BALANCE_THRESHOLD);

        expiring || low_balance
    }

    /// One-line status of the active provider. No network.
    #[must_use]
    pub fn get_status_summary(&self) -> String {
        let active = self.manager.get_active_provider();
        let Some(config) = self.manager.get_provider_config(active.id()) else {
            return "No AI provider configured".to_string();
        };
        let status = &config.key_status;

        if status.valid {
            match status.balance {
                Some(balance) => format!("{} OK (balance {balance:.2})", config.name),
                None => format!("{} OK", config.name),
            }
        } else {
            let error = status.error.as_deref().unwrap_or("unknown error");
            format!("{} unavailable: {error}", config.name)
        }
    }

    /// Status row for every provider.
    #[must_use]
    pub fn get_all_status(&self) -> Vec<ProviderStatus> {
        self.manager
            .get_available_providers()
            .into_iter()
            .filter_map(|summary| {
                let config = self.manager.get_provider_config(summary.id.id())?;
                let status = &config.key_status;
                let needs_attention = summary.enabled
                    && summary.has_key
                    && (!status.valid || self.should_remind_expiry(summary.id.id()));

                Some(ProviderStatus {
                    id: summary.id,
                    name: summary.name,
                    enabled: summary.enabled,
                    has_key: summary.has_key,
                    is_active: summary.is_active,
                    valid: status.valid,
                    error: status.error.clone(),
                    checked_at: status.checked_at,
                    expires_at: status.expires_at.as_deref().and_then(parse_timestamp),
                    balance: status.balance,
                    needs_attention,
                })
            })
            .collect()
    }

    /// Suggestions derived from which keys are usable.
    #[must_use]
    pub fn get_recommendations(&self) -> Vec<String> {
        let usable: Vec<_> = self
            .manager
            .get_available_providers()
            .into_iter()
            .filter(|p| p.enabled && p.has_key && p.key_valid)
            .collect();

        let mut recommendations = Vec::new();
        match usable.len() {
            0 => recommendations.push("Configure an API key for at least one AI provider".to_string()),
            1 => recommendations.push(
                "Configure a backup AI provider in case the primary one becomes unavailable"
                    .to_string(),
            ),
            _ => {}
        }

        let active = self.manager.get_active_provider();
        let active_valid = self
            .manager
            .get_provider_config(active.id())
            .is_some_and(|c| c.key_status.valid);
        if !active_valid && !usable.is_empty() {
            let names: Vec<&str> = usable.iter().map(|p| p.name.as_str()).collect();
            recommendations.push(format!(
                "The current provider is unavailable; consider switching to: {}",
                names.join(", ")
            ));
        }

        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manager::ProviderConfigUpdate;
    use crate::storage::paths::AppPaths;
    use chrono::Duration;
    use tempfile::TempDir;

    fn write_status(tmp: &TempDir, provider: &str, status: serde_json::Value) {
        let path = AppPaths::with_root(tmp.path()).llm_config_file();
        let mut doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        doc["providers"][provider]["key_status"] = status;
        std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    }

    fn open(tmp: &TempDir) -> ProviderManager {
        ProviderManager::open(&AppPaths::with_root(tmp.path())).unwrap()
    }

    #[test]
    fn expiry_window() {
        let tmp = TempDir::new().unwrap();
        open(&tmp);
        let now = Utc::now();

        write_status(
            &tmp,
            "deepseek",
            serde_json::json!({"valid": true, "expires_at": (now + Duration::days(3)).to_rfc3339()}),
        );
        let m = open(&tmp);
        assert!(KeyStatusMonitor::new(&m).should_remind_expiry_at("deepseek", now));

        write_status(
            &tmp,
            "deepseek",
            serde_json::json!({"valid": true, "expires_at": (now + Duration::days(30)).to_rfc3339()}),
        );
        let m = open(&tmp);
        assert!(!KeyStatusMonitor::new(&m).should_remind_expiry_at("deepseek", now));

        write_status(
            &tmp,
            "deepseek",
            serde_json::json!({"valid": true, "expires_at": "not-a-date"}),
        );
        let m = open(&tmp);
        assert!(!KeyStatusMonitor::new(&m).should_remind_expiry_at("deepseek", now));
    }

    #[test]
    fn low_balance_reminds() {
        let tmp = TempDir::new().unwrap();
        open(&tmp);
        write_status(&tmp, "qwen", serde_json::json!({"valid": true, "balance": 3.5}));

        let m = open(&tmp);
        let monitor = KeyStatusMonitor::new(&m);
        assert!(monitor.should_remind_expiry("qwen"));
        assert!(!monitor.should_remind_expiry("openai"));
        assert!(!monitor.should_remind_expiry("nonexistent"));
    }

    #[test]
    fn summary_reflects_active_status() {
        let tmp = TempDir::new().unwrap();
        open(&tmp);
        write_status(
            &tmp,
            "deepseek",
            serde_json::json!({"valid": false, "error": "invalid_api_key"}),
        );
        let m = open(&tmp);
        assert_eq!(
            KeyStatusMonitor::new(&m).get_status_summary(),
            "DeepSeek unavailable: invalid_api_key"
        );

        write_status(&tmp, "deepseek", serde_json::json!({"valid": true, "balance": 42.0}));
        let m = open(&tmp);
        assert_eq!(
            KeyStatusMonitor::new(&m).get_status_summary(),
            "DeepSeek OK (balance 42.00)"
        );
    }

    #[test]
    fn recommendations() {
        let tmp = TempDir::new().unwrap();
        let mut m = open(&tmp);
        let recs = KeyStatusMonitor::new(&m).get_recommendations();
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("at least one"));

        m.set_api_key("qwen", "sk-q");
        drop(m);
        write_status(&tmp, "qwen", serde_json::json!({"valid": true}));
        let m = open(&tmp);
        let recs = KeyStatusMonitor::new(&m).get_recommendations();
        assert_eq!(recs.len(), 2);
        assert!(recs[0].contains("backup"));
        assert!(recs[1].contains("Qwen"));
    }

    #[test]
    fn attention_flags_invalid_keyed_providers() {
        let tmp = TempDir::new().unwrap();
        let mut m = open(&tmp);
        m.update_provider_config(
            "openai",
            ProviderConfigUpdate {
                api_key: Some("sk-o".to_string()),
                ..ProviderConfigUpdate::default()
            },
        );

        let rows = KeyStatusMonitor::new(&m).get_all_status();
        assert_eq!(rows.len(), 4);
        let openai = rows.iter().find(|r| r.id == ProviderId::OpenAi).unwrap();
        assert!(openai.enabled && openai.has_key && openai.needs_attention);
        let glm = rows.iter().find(|r| r.id == ProviderId::Glm4).unwrap();
        assert!(!glm.needs_attention);
    }
}
