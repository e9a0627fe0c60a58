//! Layered configuration.
//!
//! Defaults, then `settings.toml`, then `CODEGRAPH_`-prefixed environment
//! variables with double underscores separating nested levels:
//! `CODEGRAPH_INDEXING__WORKERS=4` sets `indexing.workers`.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const SETTINGS_DIR: &str = ".codegraph";
pub const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Schema version of this configuration.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding the graph store and workspace records.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Extra extension → language-key mappings layered over the built-ins,
    /// e.g. `"h" = "c"` or `"vue" = "javascript"`.
    #[serde(default)]
    pub extension_overrides: HashMap<String, String>,

    /// Per-language enablement keyed by language key.
    #[serde(default)]
    pub languages: HashMap<String, LanguageConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Worker threads for the parse pool.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Glob patterns excluded from the walk, in addition to gitignore rules.
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Hard cap on files per project; `None` means unlimited. The
    /// `MAX_FILES` environment variable overrides this at run time.
    #[serde(default)]
    pub max_files: Option<usize>,

    /// File tables buffered before a batched store write.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pending symbol records buffered before a batched store write.
    #[serde(default = "default_symbol_batch_size")]
    pub symbol_batch_size: usize,

    /// Workspaces larger than this skip the load-and-merge step for symbol
    /// occurrences and rebuild them in memory.
    #[serde(default = "default_symbol_load_threshold")]
    pub symbol_load_threshold: usize,

    /// Capacity of the symbol-occurrence LRU cache.
    #[serde(default = "default_symbol_cache_capacity")]
    pub symbol_cache_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LanguageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level filter, e.g. `warn` or `info`.
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}
fn default_index_path() -> PathBuf {
    PathBuf::from(SETTINGS_DIR).join("index")
}
fn default_workers() -> usize {
    num_cpus::get().min(10)
}
fn default_ignore_patterns() -> Vec<String> {
    vec![
        "target/**".to_string(),
        "node_modules/**".to_string(),
        "vendor/**".to_string(),
        ".git/**".to_string(),
        "*.min.js".to_string(),
    ]
}
fn default_batch_size() -> usize {
    100
}
fn default_symbol_batch_size() -> usize {
    500
}
fn default_symbol_load_threshold() -> usize {
    9000
}
fn default_symbol_cache_capacity() -> usize {
    2048
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index_path: default_index_path(),
            indexing: IndexingConfig::default(),
            extension_overrides: HashMap::new(),
            languages: HashMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            ignore_patterns: default_ignore_patterns(),
            max_files: None,
            batch_size: default_batch_size(),
            symbol_batch_size: default_symbol_batch_size(),
            symbol_load_threshold: default_symbol_load_threshold(),
            symbol_cache_capacity: default_symbol_cache_capacity(),
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self { enabled: true }
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
    /// Load configuration from defaults, the nearest `settings.toml`, and
    /// the environment.
    pub fn load() -> Result<Self, figment::Error> {
        let config_path = Self::find_settings_file()
            .unwrap_or_else(|| PathBuf::from(SETTINGS_DIR).join(SETTINGS_FILE));
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("CODEGRAPH_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
    }

    /// Search upward from the current directory for a settings directory.
    fn find_settings_file() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let candidate = dir.join(SETTINGS_DIR).join(SETTINGS_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    /// Effective per-project file cap: `MAX_FILES` beats configuration.
    pub fn effective_max_files(&self) -> Option<usize> {
        if let Ok(raw) = std::env::var("MAX_FILES") {
            if let Ok(value) = raw.trim().parse::<usize>() {
                return Some(value);
            }
        }
        self.indexing.max_files
    }

    pub fn language_enabled(&self, key: &str) -> bool {
        self.languages.get(key).map(|c| c.enabled).unwrap_or(true)
    }

    /// Write a commented default settings file, returning its path.
    pub fn init_file(root: &std::path::Path, force: bool) -> std::io::Result<PathBuf> {
        let dir = root.join(SETTINGS_DIR);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(SETTINGS_FILE);
        if path.exists() && !force {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists (use --force to overwrite)", path.display()),
            ));
        }
        std::fs::write(&path, DEFAULT_SETTINGS_TOML)?;
        Ok(path)
    }
}

const DEFAULT_SETTINGS_TOML: &str = r#"# codegraph settings
version = 1

# Directory holding the graph store and workspace records.
# index_path = ".codegraph/index"

[indexing]
# workers = 8
# max_files is unset by default; the MAX_FILES env var overrides it.
# batch_size = 100
# symbol_load_threshold = 9000
ignore_patterns = ["target/**", "node_modules/**", "vendor/**", ".git/**", "*.min.js"]

[extension_overrides]
# h = "c"
# vue = "javascript"

[logging]
default = "warn"
# [logging.modules]
# codegraph = "debug"
"#;
