//! `nudge usage`: call and token counters.

use serde_json::json;

use crate::cli::args::{Output, UsageArgs};
use crate::cli::emit;
use crate::core::manager::ProviderManager;
use crate::error::Result;
use crate::render::human;
use crate::storage::paths::AppPaths;
use crate::util::time::today_key;

/// Execute the usage command.
///
/// # Errors
///
/// Returns an error if the config cannot be read.
pub fn execute(args: &UsageArgs, paths: &AppPaths, out: Output) -> Result<()> {
    let manager = ProviderManager::open(paths)?;
    let stats = manager.get_usage_stats();
    let today = manager.get_today_stats();

    let data = if args.today {
        json!({ "date": today_key(), "today": &today })
    } else {
        json!({ "date": today_key(), "today": &today, "usage": stats })
    };

    emit(out, "usage", &data, || human::render_usage(stats, &today, args.today))
}
