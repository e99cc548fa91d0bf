//! `nudge status`: key health for every provider.

use serde::Serialize;

use crate::cli::args::{Output, StatusArgs};
use crate::cli::emit;
use crate::core::key_monitor::{KeyStatusMonitor, ProviderStatus};
use crate::core::manager::ProviderManager;
use crate::error::Result;
use crate::render::human;
use crate::storage::paths::AppPaths;

#[derive(Debug, Serialize)]
struct StatusData {
    summary: String,
    providers: Vec<ProviderStatus>,
    warnings: Vec<String>,
    recommendations: Vec<String>,
}

/// Execute the status command.
///
/// # Errors
///
/// Returns an error if the config cannot be read.
pub async fn execute(args: &StatusArgs, paths: &AppPaths, out: Output) -> Result<()> {
    let mut manager = ProviderManager::open(paths)?;
    let warnings = if args.check {
        KeyStatusMonitor::check_on_startup(&mut manager).await
    } else {
        Vec::new()
    };
    let monitor = KeyStatusMonitor::new(&manager);

    let data = StatusData {
        summary: monitor.get_status_summary(),
        providers: monitor.get_all_status(),
        warnings,
        recommendations: monitor.get_recommendations(),
    };

    emit(out, "status", &data, || {
        human::render_status(
            &data.summary,
            &data.providers,
            &data.warnings,
            &data.recommendations,
        )
    })
}
