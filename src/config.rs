//! Layered configuration.
//!
//! Sources, later ones winning:
//! - built-in defaults
//! - `.codeintel/settings.toml` (discovered by walking ancestor directories)
//! - environment variables prefixed `CODEINTEL_`, with `__` separating
//!   nested levels: `CODEINTEL_INDEXING__PARALLEL_THREADS=8` sets
//!   `indexing.parallel_threads`.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const SETTINGS_DIR: &str = ".codeintel";
pub const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// File extensions to index (no leading dot).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names pruned before descent.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Extraction worker threads.
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    /// Wall-clock budget for one rebuild, in seconds. On overrun the
    /// rebuild aborts and the previous snapshot stays current.
    #[serde(default = "default_max_index_seconds")]
    pub max_index_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Lines of context attached around each hit, read live from disk.
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,

    /// Results scoring at or below this are discarded.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Max entries in the per-generation (query, scope) result cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Default Jaccard threshold for pattern similarity.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level: error, warn, info, debug, trace.
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module overrides, e.g. `indexing = "debug"`.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_extensions() -> Vec<String> {
    ["py", "pyi", "js", "jsx", "ts", "tsx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    [
        ".git",
        ".hg",
        ".svn",
        "node_modules",
        "target",
        "build",
        "dist",
        "__pycache__",
        ".venv",
        "venv",
        ".tox",
        ".mypy_cache",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_parallel_threads() -> usize {
    num_cpus::get()
}

fn default_max_index_seconds() -> u64 {
    300
}

fn default_max_results() -> usize {
    20
}

fn default_context_lines() -> usize {
    3
}

fn default_score_threshold() -> f32 {
    0.3
}

fn default_cache_capacity() -> usize {
    128
}

fn default_similarity_threshold() -> f32 {
    0.6
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            parallel_threads: default_parallel_threads(),
            max_index_seconds: default_max_index_seconds(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            context_lines: default_context_lines(),
            score_threshold: default_score_threshold(),
            cache_capacity: default_cache_capacity(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_settings_file()
            .unwrap_or_else(|| PathBuf::from(SETTINGS_DIR).join(SETTINGS_FILE));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("CODEINTEL_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Walk from the current directory up to root looking for a settings file.
    fn find_settings_file() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            let candidate = ancestor.join(SETTINGS_DIR).join(SETTINGS_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// Serialize the default settings as commented TOML for `init`.
    pub fn default_toml() -> String {
        let body = toml::to_string_pretty(&Settings::default())
            .unwrap_or_default();
        format!(
            "# codeintel settings\n# Environment overrides: CODEINTEL_SECTION__KEY=value\n\n{body}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let settings = Settings::default();
        assert!(settings.indexing.extensions.contains(&"py".to_string()));
        assert!(settings.indexing.exclude_dirs.contains(&".git".to_string()));
        assert!(settings.indexing.parallel_threads >= 1);
        assert_eq!(settings.search.context_lines, 3);
        assert_eq!(settings.search.score_threshold, 0.3);
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_default_toml_round_trips() {
        let text = Settings::default_toml();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(
            parsed.indexing.extensions,
            Settings::default().indexing.extensions
        );
    }
}
