//! `nudge cache`: inspect and prune the content cache.

use serde_json::json;

use crate::cli::args::{CacheCommand, Output};
use crate::cli::emit;
use crate::error::Result;
use crate::render::human;
use crate::storage::cache::ContentCache;
use crate::storage::paths::AppPaths;

/// Execute a cache subcommand.
///
/// # Errors
///
/// Only fails when robot output cannot be serialized.
pub fn execute(cmd: &CacheCommand, paths: &AppPaths, out: Output) -> Result<()> {
    let mut cache = ContentCache::open(paths);

    match cmd {
        CacheCommand::Stats => {
            let stats = cache.get_stats();
            emit(out, "cache stats", &stats, || human::render_cache_stats(&stats))
        }
        CacheCommand::Clear { content_type } => {
            let before = cache.len();
            let saved = cache.clear(content_type.as_deref());
            let removed = before - cache.len();
            let data = json!({ "removed": removed, "saved": saved });
            emit(out, "cache clear", &data, || match content_type {
                Some(t) => format!("Removed {removed} cached {t} item(s)."),
                None => format!("Removed {removed} cached item(s)."),
            })
        }
        CacheCommand::Prune => {
            let removed = cache.clear_expired();
            let data = json!({ "removed": removed, "remaining": cache.len() });
            emit(out, "cache prune", &data, || {
                format!("Removed {removed} expired item(s); {} left.", cache.len())
            })
        }
    }
}
