//! File walking functionality for directory traversal

use super::file_info::SourceFile;
use crate::config::WalkConfig;
use crate::glob_utils::PatternSet;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileWalker {
    pub(crate) root: PathBuf,
    pub(crate) max_file_size: u64,
    pub(crate) include_patterns: Vec<String>,
    pub(crate) exclude_patterns: Vec<String>,
}

impl FileWalker {
    pub fn new(root: impl AsRef<Path>, max_file_size: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_file_size,
            include_patterns: vec![],
            exclude_patterns: vec![],
        }
    }

    pub fn from_config(root: impl AsRef<Path>, config: &WalkConfig) -> Self {
        Self::new(root, config.max_file_size).with_patterns(
            config.include_patterns.clone(),
            config.exclude_patterns.clone(),
        )
    }

    pub fn with_patterns(
        mut self,
        include_patterns: Vec<String>,
        exclude_patterns: Vec<String>,
    ) -> Self {
        self.include_patterns = include_patterns;
        self.exclude_patterns = exclude_patterns;
        self
    }

    /// Walk the directory and load every eligible file
    pub fn walk(&self) -> Result<Vec<SourceFile>> {
        if !self.root.exists() {
            anyhow::bail!("Root directory does not exist: {:?}", self.root);
        }
        if !self.root.is_dir() {
            anyhow::bail!("Root path is not a directory: {:?}", self.root);
        }

        let include = PatternSet::new(&self.include_patterns)?;
        let exclude = PatternSet::new(&self.exclude_patterns)?;
        let mut files = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(true)
            .hidden(false)
            .git_ignore(true)
            .git_exclude(true)
            .git_global(true)
            .require_git(false)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_dir() {
                continue;
            }

            if path.components().any(|c| c.as_os_str() == ".git") {
                continue;
            }

            let relative_path = self.relative_path(path);
            if !Self::matches_patterns(&relative_path, &include, &exclude) {
                tracing::trace!("Skipping filtered file: {}", relative_path);
                continue;
            }

            if let Ok(metadata) = fs::metadata(path)
                && metadata.len() > self.max_file_size
            {
                tracing::debug!("Skipping large file: {:?}", path);
                continue;
            }

            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Failed to read {:?}: {}", path, e);
                    continue;
                }
            };

            if bytes.is_empty() {
                continue;
            }

            if !looks_like_text(&bytes) {
                tracing::debug!("Skipping binary file: {:?}", path);
                continue;
            }

            let content = match String::from_utf8(bytes) {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!("Skipping file that can't be read as UTF-8: {:?}: {}", path, e);
                    continue;
                }
            };

            files.push(SourceFile::new(path, relative_path, content));
        }

        tracing::info!("Found {} files to split", files.len());
        Ok(files)
    }

    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Included when no include pattern is set or one matches, and no
    /// exclude pattern matches
    pub(crate) fn matches_patterns(
        relative_path: &str,
        include: &PatternSet,
        exclude: &PatternSet,
    ) -> bool {
        (include.is_empty() || include.is_match(relative_path)) && !exclude.is_match(relative_path)
    }
}

/// Heuristic binary detection: text when under 30% of bytes are control
/// characters other than newline, carriage return and tab
pub(crate) fn looks_like_text(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return true;
    }

    let non_printable = bytes
        .iter()
        .filter(|&&b| b < 0x20 && b != b'\n' && b != b'\r' && b != b'\t')
        .count();

    (non_printable as f64 / bytes.len() as f64) < 0.3
}
