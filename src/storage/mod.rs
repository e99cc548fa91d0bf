//! Storage for provider configuration, usage stats and the content cache.

pub mod cache;
pub mod config;
pub mod files;
pub mod paths;

pub use cache::{CacheContext, CacheEntry, CacheRule, CacheStats, ContentCache, GroupBy};
pub use config::{
    DailyStats, ManagerState, ProviderConfig, ProviderUsage, StateSource, UsageStats,
};
pub use paths::AppPaths;
