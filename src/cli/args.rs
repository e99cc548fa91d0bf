//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};

/// Multi-provider LLM client for the nudge reminder app.
#[derive(Parser, Debug)]
#[command(name = "nudge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    // === Global flags ===
    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSON logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    pub json: bool,
    pub pretty: bool,
}

impl Cli {
    #[must_use]
    pub const fn output(&self) -> Output {
        Output {
            json: self.json,
            pretty: self.pretty,
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a prompt through the active provider (with fallback)
    Ask(AskArgs),

    /// Manage and verify API keys
    #[command(subcommand)]
    Keys(KeysCommand),

    /// List and configure providers
    #[command(subcommand)]
    Providers(ProvidersCommand),

    /// Show key health for every provider
    Status(StatusArgs),

    /// Show call and token usage
    Usage(UsageArgs),

    /// Inspect and clean the generated-content cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

/// Arguments for `ask`.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Prompt text
    pub prompt: String,

    /// Override the provider's max token setting
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Override the provider's temperature
    #[arg(long, value_name = "T")]
    pub temperature: Option<f64>,

    /// Cache the answer under this content type (e.g. nutrition, daily_tips)
    #[arg(long, value_name = "TYPE")]
    pub cache_type: Option<String>,

    /// Pregnancy week for week-grouped content types
    #[arg(long, value_name = "WEEK", requires = "cache_type")]
    pub week: Option<u32>,

    /// Date (YYYY-MM-DD) for date-grouped content types; defaults to today
    #[arg(long, value_name = "DATE", requires = "cache_type")]
    pub date: Option<String>,
}

/// `keys` subcommands.
#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    /// Verify keys with a minimal live call
    Check {
        /// Only check this provider
        provider: Option<String>,
    },

    /// Store a key (an empty string removes it and disables the provider)
    Set {
        /// Provider id
        provider: String,
        /// API key
        key: String,
    },
}

/// `providers` subcommands.
#[derive(Subcommand, Debug)]
pub enum ProvidersCommand {
    /// List providers
    List,

    /// Make a provider the active one
    Use {
        /// Provider id
        provider: String,
    },

    /// Change a provider's settings
    Set(ProviderSetArgs),
}

/// Arguments for `providers set`.
#[derive(Args, Debug)]
pub struct ProviderSetArgs {
    /// Provider id
    pub provider: String,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// API base URL
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Default max tokens
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Default temperature
    #[arg(long, value_name = "T")]
    pub temperature: Option<f64>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Enable the provider
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable the provider
    #[arg(long)]
    pub disable: bool,
}

impl ProviderSetArgs {
    /// `Some(true)` / `Some(false)` when a toggle flag was given.
    #[must_use]
    pub const fn enabled(&self) -> Option<bool> {
        match (self.enable, self.disable) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Arguments for `status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Run live key checks first (network)
    #[arg(long)]
    pub check: bool,
}

/// Arguments for `usage`.
#[derive(Args, Debug)]
pub struct UsageArgs {
    /// Only today's counters
    #[arg(long)]
    pub today: bool,
}

/// `cache` subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Entry counts by content type
    Stats,

    /// Remove entries of one content type, or everything
    Clear {
        /// Content type to clear
        content_type: Option<String>,
    },

    /// Remove expired entries
    Prune,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_with_cache_options() {
        let cli = Cli::try_parse_from([
            "nudge",
            "ask",
            "tips for week 12",
            "--cache-type",
            "nutrition",
            "--week",
            "12",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let Commands::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.week, Some(12));
        assert_eq!(args.cache_type.as_deref(), Some("nutrition"));
    }

    #[test]
    fn week_requires_cache_type() {
        assert!(Cli::try_parse_from(["nudge", "ask", "hi", "--week", "3"]).is_err());
    }

    #[test]
    fn enable_and_disable_conflict() {
        assert!(
            Cli::try_parse_from(["nudge", "providers", "set", "qwen", "--enable", "--disable"])
                .is_err()
        );
        let cli = Cli::try_parse_from(["nudge", "providers", "set", "qwen", "--disable"]).unwrap();
        let Commands::Providers(ProvidersCommand::Set(args)) = cli.command else {
            panic!("expected providers set");
        };
        assert_eq!(args.enabled(), Some(false));
    }
}
