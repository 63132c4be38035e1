/// Platform-specific path computation
///
/// Only the configuration file lives on disk; chunking itself keeps no
/// persisted state.
use std::path::PathBuf;

const PROJECT_DIR_NAME: &str = "ast-chunker";

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Get the appropriate config directory for the current platform
    ///
    /// - Windows: %APPDATA%
    /// - macOS: ~/Library/Application Support
    /// - Linux/Unix: $XDG_CONFIG_HOME or ~/.config
    pub fn config_dir() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get default project-specific config directory
    ///
    /// Returns: {config_dir}/ast-chunker
    pub fn project_config_dir() -> PathBuf {
        Self::config_dir().join(PROJECT_DIR_NAME)
    }

    /// Get default config file path
    ///
    /// Returns: {config_dir}/ast-chunker/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::project_config_dir().join("config.toml")
    }
}
