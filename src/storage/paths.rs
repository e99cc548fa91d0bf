//! Application paths for config and data files.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Overrides the root directory for every nudge file.
pub const ENV_HOME: &str = "NUDGE_HOME";
/// Overrides the bundled default provider config location.
pub const ENV_BUNDLED_CONFIG: &str = "NUDGE_BUNDLED_CONFIG";

const LLM_CONFIG_FILE: &str = "llm_config.json";
const CACHE_FILE: &str = "cache.json";

/// Application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
    /// Data directory.
    pub data: PathBuf,
    /// Bundled read-only default provider config, if one can be located.
    pub bundled_config: Option<PathBuf>,
}

impl AppPaths {
    /// Resolve paths from `NUDGE_HOME` or the platform project directories.
    #[must_use]
    pub fn new() -> Self {
        let bundled_config = Self::default_bundled_config();

        if let Some(home) = std::env::var_os(ENV_HOME).filter(|v| !v.is_empty()) {
            let mut paths = Self::with_root(Path::new(&home));
            paths.bundled_config = bundled_config;
            return paths;
        }

        if let Some(proj_dirs) = ProjectDirs::from("com", "nudge", "nudge") {
            Self {
                config: proj_dirs.config_dir().to_path_buf(),
                data: proj_dirs.data_dir().to_path_buf(),
                bundled_config,
            }
        } else {
            let home = directories::BaseDirs::new()
                .map_or_else(|| PathBuf::from("."), |d| d.home_dir().to_path_buf());
            Self {
                config: home.join(".config/nudge"),
                data: home.join(".local/share/nudge"),
                bundled_config,
            }
        }
    }

    /// Put config and data under a single root (tests, portable installs).
    #[must_use]
    pub fn with_root(root: &Path) -> Self {
        Self {
            config: root.to_path_buf(),
            data: root.to_path_buf(),
            bundled_config: None,
        }
    }

    /// Set the bundled default config path.
    #[must_use]
    pub fn with_bundled_config(mut self, path: Option<PathBuf>) -> Self {
        self.bundled_config = path;
        self
    }

    /// Path to the user-writable provider config.
    #[must_use]
    pub fn llm_config_file(&self) -> PathBuf {
        self.config.join(LLM_CONFIG_FILE)
    }

    /// Path to the generated-content cache.
    #[must_use]
    pub fn cache_file(&self) -> PathBuf {
        self.data.join(CACHE_FILE)
    }

    /// `NUDGE_BUNDLED_CONFIG`, else `<exe dir>/resources/config/llm_config.json`.
    fn default_bundled_config() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(ENV_BUNDLED_CONFIG).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(path));
        }
        let exe = std::env::current_exe().ok()?;
        Some(exe.parent()?.join("resources/config").join(LLM_CONFIG_FILE))
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_root_places_files_under_root() {
        let paths = AppPaths::with_root(Path::new("/tmp/nudge-test"));
        assert_eq!(
            paths.llm_config_file(),
            PathBuf::from("/tmp/nudge-test/llm_config.json")
        );
        assert_eq!(paths.cache_file(), PathBuf::from("/tmp/nudge-test/cache.json"));
        assert!(paths.bundled_config.is_none());
    }
}
