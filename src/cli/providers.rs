//! `nudge providers`: list, switch and configure providers.

use crate::cli::args::{Output, ProviderSetArgs, ProvidersCommand};
use crate::cli::emit;
use crate::core::manager::{ProviderConfigUpdate, ProviderManager};
use crate::core::provider::ProviderId;
use crate::error::{NudgeError, Result};
use crate::render::human;
use crate::storage::paths::AppPaths;

/// Execute a providers subcommand.
///
/// # Errors
///
/// Returns an error for unknown ids, invalid settings or an unreadable config.
pub fn execute(cmd: &ProvidersCommand, paths: &AppPaths, out: Output) -> Result<()> {
    let mut manager = ProviderManager::open(paths)?;

    match cmd {
        ProvidersCommand::List => {
            let providers = manager.get_available_providers();
            emit(out, "providers list", &providers, || {
                human::render_providers(&providers)
            })
        }
        ProvidersCommand::Use { provider } => {
            let id = ProviderId::from_id(provider)?;
            manager.set_active_provider(id.id());
            let data = serde_json::json!({ "active_provider": id });
            emit(out, "providers use", &data, || {
                format!("Active provider is now {}.", id.display_name())
            })
        }
        ProvidersCommand::Set(args) => {
            let id = ProviderId::from_id(&args.provider)?;
            let update = build_update(args)?;
            if update.is_empty() {
                return Err(NudgeError::Config(
                    "nothing to change; pass at least one setting".to_string(),
                ));
            }
            manager.update_provider_config(id.id(), update);
            let config = manager
                .get_provider_config(id.id())
                .cloned()
                .ok_or_else(|| NudgeError::InvalidProvider(args.provider.clone()))?;
            let data = serde_json::json!({
                "provider": id,
                "enabled": config.enabled,
                "model": config.model,
                "api_base": config.api_base,
                "max_tokens": config.max_tokens,
                "temperature": config.temperature,
                "timeout_seconds": config.timeout(id).as_secs(),
            });
            emit(out, "providers set", &data, || {
                format!(
                    "Updated {}: model {}, endpoint {}, {} max tokens, temperature {}.",
                    config.name, config.model, config.api_base, config.max_tokens, config.temperature
                )
            })
        }
    }
}

fn build_update(args: &ProviderSetArgs) -> Result<ProviderConfigUpdate> {
    if let Some(base) = args.api_base.as_deref() {
        reqwest::Url::parse(base)
            .map_err(|e| NudgeError::Config(format!("invalid API base '{base}': {e}")))?;
    }
    if let Some(t) = args.temperature
        && !(0.0..=2.0).contains(&t)
    {
        return Err(NudgeError::Config(format!(
            "temperature must be between 0 and 2, got {t}"
        )));
    }
    if args.max_tokens == Some(0) {
        return Err(NudgeError::Config("max tokens must be positive".to_string()));
    }
    if args.timeout == Some(0) {
        return Err(NudgeError::Config("timeout must be positive".to_string()));
    }

    Ok(ProviderConfigUpdate {
        enabled: args.enabled(),
        api_base: args.api_base.clone(),
        model: args.model.clone(),
        max_tokens: args.max_tokens,
        temperature: args.temperature,
        timeout_seconds: args.timeout,
        ..ProviderConfigUpdate::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(provider: &str) -> ProviderSetArgs {
        ProviderSetArgs {
            provider: provider.to_string(),
            model: None,
            api_base: None,
            max_tokens: None,
            temperature: None,
            timeout: None,
            enable: false,
            disable: false,
        }
    }

    #[test]
    fn rejects_bad_values() {
        let mut a = args("qwen");
        a.api_base = Some("not a url".to_string());
        assert!(build_update(&a).is_err());

        let mut a = args("qwen");
        a.temperature = Some(3.5);
        assert!(build_update(&a).is_err());

        let mut a = args("qwen");
        a.timeout = Some(0);
        assert!(build_update(&a).is_err());
    }

    #[test]
    fn empty_update_detected() {
        assert!(build_update(&args("qwen")).unwrap().is_empty());
        let mut a = args("qwen");
        a.disable = true;
        let update = build_update(&a).unwrap();
        assert_eq!(update.enabled, Some(false));
    }
}
