/// Configuration system for ast-chunker
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{ChunkerError, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Chunking behaviour
    #[serde(default)]
    pub splitter: SplitterConfig,

    /// Parser pool sizing
    #[serde(default)]
    pub pool: PoolConfig,

    /// Directory walking (CLI and `FileWalker`)
    #[serde(default)]
    pub walk: WalkConfig,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitterConfig {
    /// Maximum characters per fallback window
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters of trailing lines carried into the next fallback window
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Prefix global, ancestor and surrounding-line context to AST chunks
    #[serde(default = "default_include_context")]
    pub include_context: bool,

    /// Non-blank lines preceding a chunk to include as surrounding context
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,

    /// Chunks with fewer characters than this are dropped
    #[serde(default = "default_min_chunk_chars")]
    pub min_chunk_chars: usize,

    /// Upper bound on import/type/constant lines kept as global context
    #[serde(default = "default_max_global_lines")]
    pub max_global_lines: usize,

    /// Use the line-window splitter when the AST pass finds nothing to emit
    #[serde(default = "default_fallback_on_empty")]
    pub fallback_on_empty: bool,

    /// Use the line-window splitter when the tree contains ERROR nodes
    #[serde(default)]
    pub fallback_on_syntax_error: bool,
}

/// Parser pool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolConfig {
    /// Parsers created eagerly at construction
    #[serde(default = "default_pool_initial_size")]
    pub initial_size: usize,

    /// Hard cap on parsers alive at once
    #[serde(default = "default_pool_max_size")]
    pub max_size: usize,

    /// How long `split` may wait for a free parser; unset waits forever
    #[serde(default)]
    pub acquire_timeout_ms: Option<u64>,
}

/// Directory walking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalkConfig {
    /// Maximum file size to split (in bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Default include patterns
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Default exclude patterns
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

// Default value functions
fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_include_context() -> bool {
    true
}

fn default_context_lines() -> usize {
    3
}

fn default_min_chunk_chars() -> usize {
    50
}

fn default_max_global_lines() -> usize {
    20
}

fn default_fallback_on_empty() -> bool {
    true
}

fn default_pool_initial_size() -> usize {
    2
}

fn default_pool_max_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .max(2)
}

fn default_max_file_size() -> u64 {
    1_048_576 // 1 MB
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        "target".to_string(),
        "node_modules".to_string(),
        ".git".to_string(),
        "dist".to_string(),
        "build".to_string(),
    ]
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            include_context: default_include_context(),
            context_lines: default_context_lines(),
            min_chunk_chars: default_min_chunk_chars(),
            max_global_lines: default_max_global_lines(),
            fallback_on_empty: default_fallback_on_empty(),
            fallback_on_syntax_error: false,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: default_pool_initial_size(),
            max_size: default_pool_max_size(),
            acquire_timeout_ms: None,
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ChunkerError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
    .into()
}

impl SplitterConfig {
    /// Validate chunking values
    pub fn validate(&self) -> Result<(), ChunkerError> {
        if self.chunk_size == 0 {
            return Err(invalid("splitter.chunk_size", "must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(invalid(
                "splitter.chunk_overlap",
                format!(
                    "must be smaller than chunk_size ({}), got {}",
                    self.chunk_size, self.chunk_overlap
                ),
            ));
        }

        Ok(())
    }
}

impl PoolConfig {
    /// Validate pool sizing
    pub fn validate(&self) -> Result<(), ChunkerError> {
        if self.max_size == 0 {
            return Err(invalid("pool.max_size", "must be greater than 0"));
        }

        if self.initial_size > self.max_size {
            return Err(invalid(
                "pool.initial_size",
                format!(
                    "must not exceed max_size ({}), got {}",
                    self.max_size, self.initial_size
                ),
            ));
        }

        Ok(())
    }

    /// Acquire timeout as a `Duration`, if configured
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_ms.map(Duration::from_millis)
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, ChunkerError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, ChunkerError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ChunkerError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ChunkerError> {
        self.splitter.validate()?;
        self.pool.validate()?;

        if self.walk.max_file_size == 0 {
            return Err(invalid("walk.max_file_size", "must be greater than 0"));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Some(size) = env_parse("AST_CHUNKER_CHUNK_SIZE") {
            self.splitter.chunk_size = size;
        }

        if let Some(overlap) = env_parse("AST_CHUNKER_CHUNK_OVERLAP") {
            self.splitter.chunk_overlap = overlap;
        }

        if let Some(include) = env_bool("AST_CHUNKER_INCLUDE_CONTEXT") {
            self.splitter.include_context = include;
        }

        if let Some(lines) = env_parse("AST_CHUNKER_CONTEXT_LINES") {
            self.splitter.context_lines = lines;
        }

        if let Some(min) = env_parse("AST_CHUNKER_MIN_CHUNK_CHARS") {
            self.splitter.min_chunk_chars = min;
        }

        if let Some(max) = env_parse("AST_CHUNKER_POOL_MAX") {
            self.pool.max_size = max;
        }

        if let Some(initial) = env_parse("AST_CHUNKER_POOL_INITIAL") {
            self.pool.initial_size = initial;
        }

        if let Some(timeout) = env_parse("AST_CHUNKER_ACQUIRE_TIMEOUT_MS") {
            self.pool.acquire_timeout_ms = Some(timeout);
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, ChunkerError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparsable value for {}: '{}'", key, raw);
            None
        }
    }
}

fn env_bool(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!("Ignoring unparsable boolean for {}: '{}'", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.splitter.chunk_size, 500);
        assert_eq!(config.splitter.chunk_overlap, 100);
        assert!(config.splitter.include_context);
        assert_eq!(config.splitter.context_lines, 3);
        assert_eq!(config.splitter.min_chunk_chars, 50);
        assert!(config.splitter.fallback_on_empty);
        assert!(!config.splitter.fallback_on_syntax_error);
        assert!(config.pool.max_size >= 2);
        assert!(config.pool.acquire_timeout_ms.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_chunk_size() {
        let mut config = Config::default();
        config.splitter.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_overlap_not_smaller_than_size() {
        let mut config = Config::default();
        config.splitter.chunk_size = 100;
        config.splitter.chunk_overlap = 100;
        let err = config.validate().unwrap_err();
        assert!(err.is_user_error());
        assert!(err.to_string().contains("splitter.chunk_overlap"));
    }

    #[test]
    fn test_validate_pool_sizes() {
        let mut config = Config::default();
        config.pool.max_size = 0;
        config.pool.initial_size = 0;
        assert!(config.validate().is_err());

        config.pool.max_size = 2;
        config.pool.initial_size = 3;
        assert!(config.validate().is_err());

        config.pool.initial_size = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        let mut config = Config::default();
        config.splitter.chunk_size = 800;
        config.splitter.include_context = false;
        config.pool.acquire_timeout_ms = Some(250);

        config.save(path).unwrap();
        let loaded = Config::from_file(path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(
            loaded.pool.acquire_timeout(),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[splitter]\nchunk_size = 900\n").unwrap();
        assert_eq!(config.splitter.chunk_size, 900);
        assert_eq!(config.splitter.chunk_overlap, 100);
        assert_eq!(config.walk, WalkConfig::default());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::from_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(
            result.unwrap_err(),
            ChunkerError::Config(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[splitter\nchunk_size = ").unwrap();
        let result = Config::from_file(temp_file.path());
        assert!(matches!(
            result.unwrap_err(),
            ChunkerError::Config(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn test_toml_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("chunk_size"));
        assert!(toml_str.contains("max_size"));
        assert!(toml_str.contains("exclude_patterns"));
    }

    #[test]
    fn test_apply_env_overrides() {
        // Safety: no other test touches these variables
        unsafe {
            std::env::set_var("AST_CHUNKER_CHUNK_SIZE", "750");
            std::env::set_var("AST_CHUNKER_INCLUDE_CONTEXT", "false");
            std::env::set_var("AST_CHUNKER_POOL_MAX", "3");
            std::env::set_var("AST_CHUNKER_ACQUIRE_TIMEOUT_MS", "1500");
            std::env::set_var("AST_CHUNKER_CONTEXT_LINES", "not-a-number");
        }

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.splitter.chunk_size, 750);
        assert!(!config.splitter.include_context);
        assert_eq!(config.pool.max_size, 3);
        assert_eq!(config.pool.acquire_timeout_ms, Some(1500));
        assert_eq!(config.splitter.context_lines, 3);

        // Safety: cleaning up the variables set above
        unsafe {
            std::env::remove_var("AST_CHUNKER_CHUNK_SIZE");
            std::env::remove_var("AST_CHUNKER_INCLUDE_CONTEXT");
            std::env::remove_var("AST_CHUNKER_POOL_MAX");
            std::env::remove_var("AST_CHUNKER_ACQUIRE_TIMEOUT_MS");
            std::env::remove_var("AST_CHUNKER_CONTEXT_LINES");
        }
    }

    #[test]
    fn test_default_exclude_patterns() {
        let config = Config::default();
        assert!(config.walk.exclude_patterns.contains(&"target".to_string()));
        assert!(
            config
                .walk
                .exclude_patterns
                .contains(&"node_modules".to_string())
        );
        assert!(config.walk.exclude_patterns.contains(&".git".to_string()));
    }
}
