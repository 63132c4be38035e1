//! Source file record handed from the walker to the splitter

use super::language::detect_language;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Language id recorded for files without an extension
const PLAIN_TEXT: &str = "text";

/// A discovered file with its content loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the walk root, `/`-separated
    pub relative_path: String,
    /// Registry id when a grammar exists, otherwise the lowercased extension
    pub language: String,
    pub content: String,
    /// SHA-256 of `content`, lowercase hex
    pub hash: String,
}

impl SourceFile {
    /// Build a record from already-loaded content
    pub fn new(path: impl Into<PathBuf>, relative_path: impl Into<String>, content: String) -> Self {
        let path = path.into();
        let language = language_for(&path);
        let hash = content_hash(&content);
        Self {
            path,
            relative_path: relative_path.into(),
            language,
            content,
            hash,
        }
    }

    /// Read a UTF-8 file from disk
    pub fn load(path: &Path, relative_path: impl Into<String>) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::new(path, relative_path, content))
    }
}

fn language_for(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => detect_language(ext)
            .map(str::to_string)
            .unwrap_or_else(|| ext.to_lowercase()),
        None => PLAIN_TEXT.to_string(),
    }
}

/// SHA-256 of a string, lowercase hex
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
