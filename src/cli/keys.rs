//! `nudge keys`: live key checks and key storage.

use chrono::Utc;
use serde::Serialize;

use crate::cli::args::{KeysCommand, Output};
use crate::cli::emit;
use crate::core::credential_hash::fingerprint;
use crate::core::manager::ProviderManager;
use crate::core::provider::ProviderId;
use crate::core::response::KeyStatus;
use crate::core::token;
use crate::error::{NudgeError, Result};
use crate::render::human;
use crate::storage::paths::AppPaths;

#[derive(Debug, Serialize)]
struct KeySet {
    provider: ProviderId,
    enabled: bool,
    fingerprint: String,
}

/// Execute a keys subcommand.
///
/// # Errors
///
/// Returns an error for unknown provider ids, an unreadable config, or a GLM-4
/// key that cannot be signed.
pub async fn execute(cmd: &KeysCommand, paths: &AppPaths, out: Output) -> Result<()> {
    let mut manager = ProviderManager::open(paths)?;

    match cmd {
        KeysCommand::Check { provider: None } => {
            let results: Vec<(ProviderId, KeyStatus)> =
                manager.check_all_keys().await.into_iter().collect();
            let data: Vec<_> = results
                .iter()
                .map(|(id, status)| serde_json::json!({ "provider": id, "status": status }))
                .collect();
            emit(out, "keys check", &data, || human::render_key_checks(&results))
        }
        KeysCommand::Check {
            provider: Some(name),
        } => {
            let id = ProviderId::from_id(name)?;
            let status = manager.check_key(id.id()).await;
            let results = [(id, status)];
            let data = serde_json::json!({ "provider": id, "status": &results[0].1 });
            emit(out, "keys check", &data, || human::render_key_checks(&results))
        }
        KeysCommand::Set { provider, key } => {
            let id = ProviderId::from_id(provider)?;
            if id == ProviderId::Glm4 && !key.trim().is_empty() {
                ensure_signable(id, key.trim())?;
            }
            manager.set_api_key(id.id(), key);
            let enabled = manager
                .get_provider_config(id.id())
                .is_some_and(|c| c.enabled);
            let data = KeySet {
                provider: id,
                enabled,
                fingerprint: fingerprint(key.trim()),
            };
            emit(out, "keys set", &data, || {
                if enabled {
                    format!(
                        "Stored {} key (fingerprint {}). Run `nudge keys check {}` to verify it.",
                        id.display_name(),
                        data.fingerprint,
                        id.id()
                    )
                } else {
                    format!("Removed {} key; provider disabled.", id.display_name())
                }
            })
        }
    }
}

fn ensure_signable(id: ProviderId, key: &str) -> Result<()> {
    token::split_key(key)
        .and_then(|(key_id, secret)| token::sign(key_id, secret, Utc::now()))
        .map(|_| ())
        .map_err(|source| NudgeError::TokenGeneration {
            provider: id.id().to_string(),
            source,
        })
}
