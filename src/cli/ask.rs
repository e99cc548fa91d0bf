//! `nudge ask`: one completion through the manager, optionally cache-aside.

use serde::Serialize;
use serde_json::Value;

use crate::cli::args::{AskArgs, Output};
use crate::cli::{emit, emit_with_errors};
use crate::core::manager::{Answer, ProviderManager};
use crate::core::response::{CallOptions, LlmResponse};
use crate::error::{NudgeError, Result};
use crate::render::human;
use crate::storage::cache::{CacheContext, ContentCache};
use crate::storage::paths::AppPaths;

#[derive(Debug, Serialize)]
struct AskData<'a> {
    cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a LlmResponse>,
}

/// Execute the ask command.
///
/// # Errors
///
/// Returns [`NudgeError::NoProviderAvailable`] when every provider failed.
pub async fn execute(args: &AskArgs, paths: &AppPaths, out: Output) -> Result<()> {
    if args.prompt.trim().is_empty() {
        return Err(NudgeError::Config("prompt must not be empty".to_string()));
    }

    let mut manager = ProviderManager::open(paths)?;
    let options = CallOptions {
        max_tokens: args.max_tokens,
        temperature: args.temperature,
    };

    let answer = match args.cache_type.as_deref() {
        Some(content_type) => {
            let mut cache = ContentCache::open(paths);
            let context = CacheContext {
                week: args.week,
                date: args.date.clone(),
                ..CacheContext::default()
            };
            manager
                .call_cached(&mut cache, content_type, &context, &args.prompt, options)
                .await
        }
        None => Answer::Generated(manager.call(&args.prompt, options).await),
    };

    match &answer {
        Answer::Cached(content) => {
            let data = AskData {
                cached: true,
                content: Some(content),
                response: None,
            };
            emit(out, "ask", &data, || human::render_cached(content))
        }
        Answer::Generated(response) if response.success => {
            let data = AskData {
                cached: false,
                content: None,
                response: Some(response),
            };
            emit(out, "ask", &data, || human::render_response(response))
        }
        Answer::Generated(response) => {
            let message = response
                .error_message
                .clone()
                .unwrap_or_else(|| "no provider available".to_string());
            if out.json {
                let data = AskData {
                    cached: false,
                    content: None,
                    response: Some(response),
                };
                emit_with_errors(out, "ask", &data, vec![message.clone()], String::new)?;
            }
            Err(NudgeError::NoProviderAvailable {
                code: response.error_code.clone(),
                message,
            })
        }
    }
}
