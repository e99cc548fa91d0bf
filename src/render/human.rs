//! Human-readable terminal output.
//!
//! Colors come from `colored`; `main` turns them off globally for
//! `--no-color`, `NO_COLOR` or a non-TTY stdout.

use std::fmt::Write as _;

use colored::Colorize;
use serde_json::Value;

use crate::core::key_monitor::ProviderStatus;
use crate::core::manager::ProviderSummary;
use crate::core::provider::ProviderId;
use crate::core::response::{KeyStatus, LlmResponse};
use crate::storage::cache::CacheStats;
use crate::storage::config::{DailyStats, UsageStats};
use crate::util::format::format_tokens;
use crate::util::time::{format_countdown, format_relative_time};

fn yes_no(flag: bool) -> colored::ColoredString {
    if flag { "yes".green() } else { "no".dimmed() }
}

/// A completion's text with a one-line provenance footer.
#[must_use]
pub fn render_response(response: &LlmResponse) -> String {
    let mut out = response.content.trim_end().to_string();
    let footer = format!(
        "via {} ({}), {} tokens",
        response.provider,
        response.model,
        format_tokens(response.tokens_used)
    );
    let _ = write!(out, "\n\n{}", footer.dimmed());
    out
}

/// Cached content: strings verbatim, anything else as pretty JSON.
#[must_use]
pub fn render_cached(content: &Value) -> String {
    let body = match content {
        Value::String(s) => s.trim_end().to_string(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };
    format!("{body}\n\n{}", "from cache".dimmed())
}

fn status_label(status: &KeyStatus) -> colored::ColoredString {
    match (status.valid, status.error.as_deref()) {
        (true, None) => "valid".green().bold(),
        (true, Some(code)) => format!("unverified ({code})").yellow(),
        (false, code) => format!("invalid ({})", code.unwrap_or("unknown error")).red(),
    }
}

/// Results of `keys check`.
#[must_use]
pub fn render_key_checks(results: &[(ProviderId, KeyStatus)]) -> String {
    if results.is_empty() {
        return format!(
            "{}\nSet one with: nudge keys set <provider> <key>",
            "No provider has a configured key.".yellow()
        );
    }

    let mut out = String::new();
    for (provider, status) in results {
        let _ = write!(
            out,
            "{:<10} {}",
            provider.display_name().bold(),
            status_label(status)
        );
        if !status.message.is_empty() && !status.valid {
            let _ = write!(out, "  {}", status.message.dimmed());
        }
        out.push('\n');
    }
    out
}

/// Provider table for `providers list`.
#[must_use]
pub fn render_providers(providers: &[ProviderSummary]) -> String {
    let mut out = format!(
        "{}\n",
        format!(
            "  {:<10} {:<12} {:<8} {:<8} {}",
            "ID", "NAME", "ENABLED", "KEY", "VALID"
        )
        .bold()
    );
    for p in providers {
        let marker = if p.is_active { "*".green().bold() } else { " ".normal() };
        let _ = writeln!(
            out,
            "{marker} {:<10} {:<12} {:<8} {:<8} {}",
            p.id.id(),
            p.name,
            yes_no(p.enabled),
            yes_no(p.has_key),
            yes_no(p.key_valid)
        );
    }
    out
}

/// `status` view.
#[must_use]
pub fn render_status(
    summary: &str,
    rows: &[ProviderStatus],
    warnings: &[String],
    recommendations: &[String],
) -> String {
    let mut out = format!("{}\n\n", summary.bold());

    for row in rows {
        let state = if !row.enabled {
            "disabled".dimmed()
        } else if !row.has_key {
            "no key".yellow()
        } else if row.valid {
            "valid".green()
        } else {
            format!("invalid ({})", row.error.as_deref().unwrap_or("unknown error")).red()
        };
        let checked = row
            .checked_at
            .map_or_else(|| "never checked".to_string(), |t| format!("checked {}", format_relative_time(t)));
        let active = if row.is_active { " (active)" } else { "" };
        let mut extra = String::new();
        if let Some(expiry) = row.expires_at {
            let _ = write!(extra, ", expires {}", format_countdown(expiry));
        }
        if let Some(balance) = row.balance {
            let _ = write!(extra, ", balance {balance:.2}");
        }
        let flag = if row.needs_attention { " !".red().bold() } else { "".normal() };

        let _ = writeln!(
            out,
            "  {:<10} {state}{active}  {}{flag}",
            row.name,
            format!("{checked}{extra}").dimmed()
        );
    }

    if !warnings.is_empty() {
        out.push('\n');
        for w in warnings {
            let _ = writeln!(out, "{} {w}", "warning:".yellow().bold());
        }
    }
    if !recommendations.is_empty() {
        out.push('\n');
        for r in recommendations {
            let _ = writeln!(out, "{} {r}", "hint:".cyan().bold());
        }
    }
    out
}

fn render_day(out: &mut String, day: &DailyStats) {
    let _ = writeln!(
        out,
        "  calls {}  tokens {}",
        day.calls.to_string().bold(),
        format_tokens(day.tokens).bold()
    );
    for (provider, usage) in &day.by_provider {
        let _ = writeln!(
            out,
            "    {:<10} {} calls, {} tokens",
            provider.display_name(),
            usage.calls,
            format_tokens(usage.tokens)
        );
    }
}

/// `usage` view.
#[must_use]
pub fn render_usage(stats: &UsageStats, today: &DailyStats, today_only: bool) -> String {
    let mut out = String::new();

    if !today_only {
        let _ = writeln!(
            out,
            "{} {} calls, {} tokens",
            "Total:".bold(),
            stats.total_calls,
            format_tokens(stats.total_tokens)
        );
        if let Some(last) = stats.last_call_at {
            let _ = writeln!(out, "{} {}", "Last call:".bold(), format_relative_time(last));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}", "Today".bold());
    render_day(&mut out, today);

    if !today_only && stats.daily_stats.len() > 1 {
        out.push('\n');
        let _ = writeln!(out, "{}", "Recent days".bold());
        for (date, day) in stats.daily_stats.iter().rev().take(7) {
            let _ = writeln!(
                out,
                "  {date}  {} calls, {} tokens",
                day.calls,
                format_tokens(day.tokens)
            );
        }
    }
    out
}

/// `cache stats` view.
#[must_use]
pub fn render_cache_stats(stats: &CacheStats) -> String {
    let mut out = format!("{} {}\n", "Cached items:".bold(), stats.total_items);
    for (content_type, count) in &stats.by_type {
        let _ = writeln!(out, "  {content_type:<14} {count}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[test]
    fn response_footer_names_provider() {
        let resp = LlmResponse::success("DeepSeek", "deepseek-chat", "Drink water.\n", 1_500);
        let out = render_response(&resp);
        assert!(out.starts_with("Drink water."));
        assert!(out.contains("DeepSeek"));
        assert!(out.contains("1.5K"));
    }

    #[test]
    fn cached_json_is_pretty() {
        let out = render_cached(&serde_json::json!({"tip": "stretch"}));
        assert!(out.contains("\"tip\""));
        assert!(out.contains("from cache"));
    }

    #[test]
    fn key_checks_empty_hint() {
        assert!(render_key_checks(&[]).contains("nudge keys set"));
    }

    #[test]
    fn usage_today_only_skips_totals() {
        let mut stats = UsageStats::default();
        stats.record(ProviderId::Qwen, 12, Local::now());
        let today = stats.day(&crate::util::time::today_key());

        let full = render_usage(&stats, &today, false);
        assert!(full.contains("Total:"));
        let short = render_usage(&stats, &today, true);
        assert!(!short.contains("Total:"));
        assert!(short.contains("Qwen"));
    }

    #[test]
    fn cache_stats_lists_types() {
        let mut stats = CacheStats::default();
        stats.total_items = 2;
        stats.by_type.insert("stand_up".to_string(), 2);
        let out = render_cache_stats(&stats);
        assert!(out.contains("stand_up"));
    }
}
