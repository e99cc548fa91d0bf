//! nudge - multi-provider LLM client
//!
//! CLI entry point.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use std::process::ExitCode;

use nudge::cli::{Cli, Commands};
use nudge::core::logging::{self, LogSettings};
use nudge::storage::paths::AppPaths;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = LogSettings::resolve(cli.log_level.as_deref(), cli.json_output, cli.verbose);
    logging::init(&settings);

    if !nudge::util::env::should_use_color(cli.no_color) {
        colored::control::set_override(false);
    }

    let output = cli.output();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, code = e.error_code(), "command failed");
            eprintln!(
                "{}",
                nudge::render::error::render_error(&e, output.json, output.pretty)
            );
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> nudge::Result<()> {
    let output = cli.output();
    let paths = AppPaths::new();
    tracing::debug!(config = %paths.llm_config_file().display(), "resolved paths");

    match cli.command {
        Commands::Ask(args) => nudge::cli::ask::execute(&args, &paths, output).await,
        Commands::Keys(cmd) => nudge::cli::keys::execute(&cmd, &paths, output).await,
        Commands::Providers(cmd) => nudge::cli::providers::execute(&cmd, &paths, output),
        Commands::Status(args) => nudge::cli::status::execute(&args, &paths, output).await,
        Commands::Usage(args) => nudge::cli::usage::execute(&args, &paths, output),
        Commands::Cache(cmd) => nudge::cli::cache::execute(&cmd, &paths, output),
    }
}
