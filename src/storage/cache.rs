//! Generated-content cache.
//!
//! Entries live in one JSON document mapping `<type>_<group>` keys to
//! [`CacheEntry`] values. Each content type has a rule: how entries are grouped
//! (by pregnancy week, by date, or not at all) and how many days they stay
//! fresh. Unknown content types are never cached.
//!
//! # Features
//! - Atomic writes using temp file + rename
//! - Expired entries evicted eagerly on read
//! - Graceful degradation on missing/corrupt cache (starts empty)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::files::{read_json, write_json};
use crate::storage::paths::AppPaths;
use crate::util::time::lenient_timestamp;

// =============================================================================
// Rules
// =============================================================================

/// How entries of a content type are grouped into keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// `<type>_week_<week>`.
    Week,
    /// `<type>_<YYYY-MM-DD>`.
    Date,
    /// Never cached.
    None,
}

/// Grouping and freshness for one content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRule {
    pub content_type: &'static str,
    pub ttl_days: i64,
    pub group_by: GroupBy,
}

/// Registered content types.
pub const CACHE_RULES: &[CacheRule] = &[
    CacheRule {
        content_type: "nutrition",
        ttl_days: 7,
        group_by: GroupBy::Week,
    },
    CacheRule {
        content_type: "relaxation",
        ttl_days: 0,
        group_by: GroupBy::None,
    },
    CacheRule {
        content_type: "stand_up",
        ttl_days: 1,
        group_by: GroupBy::Date,
    },
    CacheRule {
        content_type: "posture",
        ttl_days: 7,
        group_by: GroupBy::Week,
    },
    CacheRule {
        content_type: "daily_tips",
        ttl_days: 1,
        group_by: GroupBy::Date,
    },
    CacheRule {
        content_type: "diet_analysis",
        ttl_days: 1,
        group_by: GroupBy::Date,
    },
];

/// Rule for `content_type`, if registered.
#[must_use]
pub fn rule_for(content_type: &str) -> Option<&'static CacheRule> {
    CACHE_RULES.iter().find(|r| r.content_type == content_type)
}

/// Recover the content type from a key by longest registered prefix.
#[must_use]
pub fn content_type_of(key: &str) -> Option<&'static str> {
    CACHE_RULES
        .iter()
        .filter(|r| {
            key.strip_prefix(r.content_type)
                .is_some_and(|rest| rest.starts_with('_'))
        })
        .max_by_key(|r| r.content_type.len())
        .map(|r| r.content_type)
}

// =============================================================================
// Entries
// =============================================================================

/// Grouping inputs for a lookup. Extra fields are stored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl CacheContext {
    #[must_use]
    pub fn week(week: u32) -> Self {
        Self {
            week: Some(week),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }
}

/// One cached item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub content: Value,
    #[serde(default, with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub context: CacheContext,
}

impl CacheEntry {
    /// Expired when the type is unknown, has a zero TTL, lacks a creation
    /// time, or is older than its TTL.
    #[must_use]
    pub fn is_expired(&self, rule: Option<&CacheRule>, now: DateTime<Utc>) -> bool {
        let Some(rule) = rule.filter(|r| r.ttl_days > 0) else {
            return true;
        };
        let Some(created_at) = self.created_at else {
            return true;
        };
        now > created_at + Duration::days(rule.ttl_days)
    }
}

/// Entry counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_items: usize,
    pub by_type: BTreeMap<String, usize>,
}

/// Label used in stats for keys with no registered type.
pub const UNKNOWN_TYPE: &str = "other";

// =============================================================================
// Cache
// =============================================================================

/// File-backed content cache.
#[derive(Debug)]
pub struct ContentCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl ContentCache {
    /// Open the cache at the default location.
    #[must_use]
    pub fn open(paths: &AppPaths) -> Self {
        Self::open_at(paths.cache_file())
    }

    /// Open the cache at `path`. A missing or corrupt file yields an empty cache.
    #[must_use]
    pub fn open_at(path: PathBuf) -> Self {
        let entries = match read_json(&path) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache unreadable, starting empty");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> bool {
        match write_json(&self.path, &self.entries) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to save cache");
                false
            }
        }
    }

    /// Key for `(content_type, context)`, or `None` when the type is not cached.
    #[must_use]
    pub fn get_cache_key(&self, content_type: &str, context: &CacheContext) -> Option<String> {
        cache_key(content_type, context, Local::now())
    }

    /// Cached content, evicting it if expired.
    pub fn get(&mut self, content_type: &str, context: &CacheContext) -> Option<Value> {
        self.get_at(content_type, context, Utc::now())
    }

    /// [`Self::get`] evaluated at `now`.
    pub fn get_at(
        &mut self,
        content_type: &str,
        context: &CacheContext,
        now: DateTime<Utc>,
    ) -> Option<Value> {
        let key = cache_key(content_type, context, now.with_timezone(&Local))?;
        let entry = self.entries.get(&key)?;

        if entry.is_expired(rule_for(content_type), now) {
            self.entries.remove(&key);
            self.save();
            tracing::debug!(%key, "evicted expired cache entry");
            return None;
        }
        Some(entry.content.clone())
    }

    /// Store `content`. Returns false when the type is not cached or the
    /// write fails.
    pub fn set(&mut self, content_type: &str, context: &CacheContext, content: Value) -> bool {
        self.set_at(content_type, context, content, Utc::now())
    }

    /// [`Self::set`] stamped with `now`.
    pub fn set_at(
        &mut self,
        content_type: &str,
        context: &CacheContext,
        content: Value,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(key) = cache_key(content_type, context, now.with_timezone(&Local)) else {
            return false;
        };
        self.entries.insert(
            key,
            CacheEntry {
                content,
                created_at: Some(now),
                context: context.clone(),
            },
        );
        self.save()
    }

    /// Remove every entry of `content_type`, or everything when `None`.
    pub fn clear(&mut self, content_type: Option<&str>) -> bool {
        match content_type {
            Some(content_type) => {
                let prefix = format!("{content_type}_");
                self.entries.retain(|key, _| !key.starts_with(&prefix));
            }
            None => self.entries.clear(),
        }
        self.save()
    }

    /// Evict every expired entry; returns how many were removed.
    pub fn clear_expired(&mut self) -> usize {
        self.clear_expired_at(Utc::now())
    }

    /// [`Self::clear_expired`] evaluated at `now`.
    pub fn clear_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            let rule = content_type_of(key).and_then(rule_for);
            !entry.is_expired(rule, now)
        });
        let removed = before - self.entries.len();

        if removed > 0 {
            self.save();
            tracing::debug!(removed, "pruned expired cache entries");
        }
        removed
    }

    /// Entry counts, total and per content type.
    #[must_use]
    pub fn get_stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            total_items: self.entries.len(),
            by_type: BTreeMap::new(),
        };
        for key in self.entries.keys() {
            let content_type = content_type_of(key).unwrap_or(UNKNOWN_TYPE);
            *stats.by_type.entry(content_type.to_string()).or_default() += 1;
        }
        stats
    }
}

fn cache_key(content_type: &str, context: &CacheContext, now: DateTime<Local>) -> Option<String> {
    match rule_for(content_type)?.group_by {
        GroupBy::Week => Some(format!(
            "{content_type}_week_{}",
            context.week.unwrap_or(0)
        )),
        GroupBy::Date => {
            let date = context
                .date
                .clone()
                .unwrap_or_else(|| now.format("%Y-%m-%d").to_string());
            Some(format!("{content_type}_{date}"))
        }
        GroupBy::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn cache(tmp: &TempDir) -> ContentCache {
        ContentCache::open_at(tmp.path().join("cache.json"))
    }

    #[test]
    fn key_formats() {
        let tmp = TempDir::new().unwrap();
        let c = cache(&tmp);
        assert_eq!(
            c.get_cache_key("nutrition", &CacheContext::week(12)).as_deref(),
            Some("nutrition_week_12")
        );
        assert_eq!(
            c.get_cache_key("posture", &CacheContext::default()).as_deref(),
            Some("posture_week_0")
        );
        assert_eq!(
            c.get_cache_key("stand_up", &CacheContext::date("2025-03-01"))
                .as_deref(),
            Some("stand_up_2025-03-01")
        );
        assert!(c.get_cache_key("relaxation", &CacheContext::week(3)).is_none());
        assert!(c.get_cache_key("horoscope", &CacheContext::week(3)).is_none());
    }

    #[test]
    fn date_defaults_to_today() {
        let tmp = TempDir::new().unwrap();
        let key = cache(&tmp)
            .get_cache_key("daily_tips", &CacheContext::default())
            .unwrap();
        assert_eq!(key, format!("daily_tips_{}", crate::util::time::today_key()));
    }

    #[test]
    fn set_then_get() {
        let tmp = TempDir::new().unwrap();
        let mut c = cache(&tmp);
        let ctx = CacheContext::week(20);

        assert!(c.set("nutrition", &ctx, json!({"tips": ["eat greens"]})));
        assert_eq!(c.get("nutrition", &ctx), Some(json!({"tips": ["eat greens"]})));

        let reopened = cache(&tmp);
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn uncached_types_are_noops() {
        let tmp = TempDir::new().unwrap();
        let mut c = cache(&tmp);
        let ctx = CacheContext::week(1);

        assert!(!c.set("relaxation", &ctx, json!("breathe")));
        assert!(c.get("relaxation", &ctx).is_none());
        assert!(!c.set("unknown_type", &ctx, json!("x")));
        assert!(c.is_empty());
    }

    #[test]
    fn expired_entry_is_evicted_on_read() {
        let tmp = TempDir::new().unwrap();
        let mut c = cache(&tmp);
        let ctx = CacheContext::date("2025-03-01");
        let created = Utc::now() - Duration::days(2);

        assert!(c.set_at("stand_up", &ctx, json!("stretch"), created));
        assert_eq!(c.get_stats().total_items, 1);

        assert!(c.get("stand_up", &ctx).is_none());
        assert_eq!(c.get_stats().total_items, 0);
    }

    #[test]
    fn entry_within_ttl_is_kept() {
        let tmp = TempDir::new().unwrap();
        let mut c = cache(&tmp);
        let ctx = CacheContext::week(8);
        let created = Utc::now() - Duration::days(6);

        c.set_at("posture", &ctx, json!("sit up"), created);
        assert_eq!(c.get("posture", &ctx), Some(json!("sit up")));
    }

    #[test]
    fn clear_by_type_does_not_touch_longer_names() {
        let tmp = TempDir::new().unwrap();
        let mut c = cache(&tmp);
        let day = CacheContext::date("2025-03-01");
        c.set("daily_tips", &day, json!("a"));
        c.set("diet_analysis", &day, json!("b"));
        c.set("nutrition", &CacheContext::week(1), json!("c"));

        assert!(c.clear(Some("daily_tips")));
        let stats = c.get_stats();
        assert_eq!(stats.total_items, 2);
        assert!(!stats.by_type.contains_key("daily_tips"));

        c.clear(None);
        assert!(c.is_empty());
    }

    #[test]
    fn stats_recover_underscored_types() {
        let tmp = TempDir::new().unwrap();
        let mut c = cache(&tmp);
        let day = CacheContext::date("2025-03-01");
        c.set("stand_up", &day, json!(1));
        c.set("diet_analysis", &day, json!(2));
        c.set("nutrition", &CacheContext::week(4), json!(3));

        let stats = c.get_stats();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.by_type["stand_up"], 1);
        assert_eq!(stats.by_type["diet_analysis"], 1);
        assert_eq!(stats.by_type["nutrition"], 1);
    }

    #[test]
    fn clear_expired_sweeps_by_recovered_type() {
        let tmp = TempDir::new().unwrap();
        let mut c = cache(&tmp);
        let now = Utc::now();
        let old = now - Duration::days(3);

        c.set_at("stand_up", &CacheContext::date("2025-03-01"), json!(1), old);
        c.set_at("nutrition", &CacheContext::week(4), json!(2), old);
        c.set_at("daily_tips", &CacheContext::date("2025-03-04"), json!(3), now);

        assert_eq!(c.clear_expired_at(now), 1);
        let stats = c.get_stats();
        assert_eq!(stats.total_items, 2);
        assert!(!stats.by_type.contains_key("stand_up"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        std::fs::write(&path, "not json at all").unwrap();

        let mut c = ContentCache::open_at(path);
        assert!(c.is_empty());
        assert!(c.set("nutrition", &CacheContext::week(2), json!("ok")));
    }

    #[test]
    fn content_type_prefix_matching() {
        assert_eq!(content_type_of("stand_up_2025-03-01"), Some("stand_up"));
        assert_eq!(content_type_of("nutrition_week_3"), Some("nutrition"));
        assert_eq!(content_type_of("nutritionweek"), None);
        assert_eq!(content_type_of("mystery_1"), None);
    }
}
