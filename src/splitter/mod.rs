//! AST-driven chunking engine
//!
//! [`AstSplitter`] resolves a language in the static [`registry`], borrows a
//! parser from the [`ParserPool`], walks the syntax tree for splittable nodes,
//! prefixes context and assembles [`Chunk`]s. Whenever the syntax-tree path is
//! unavailable or fails, the text goes through the [`FallbackSplitter`]
//! instead, so `split` only errors when no parser can be obtained.

mod assembler;
mod context;
mod fallback;
pub mod pool;
pub mod registry;
mod traverser;
pub mod tree_guard;

pub use assembler::{DEFAULT_DESCRIPTION, describe};
pub use fallback::FallbackSplitter;
pub use pool::{ParserPool, PoolStats, PooledParser};
pub use registry::{ContextFamily, LanguageConfig};
pub use tree_guard::{ScopedTree, TreeTracker};

use crate::config::{Config, PoolConfig, SplitterConfig};
use crate::error::{ChunkerError, ParseError, Result, ValidationError};
use crate::indexer::{SourceFile, detect_language};
use crate::types::Chunk;
use assembler::ChunkAssembler;
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// `node_type` carried by chunks produced by the line-window fallback
pub const FALLBACK_NODE_TYPE: &str = "line_window";

/// Language id used for files whose extension maps to nothing
const UNKNOWN_LANGUAGE: &str = "text";

/// Multi-language syntax-tree splitter
///
/// Safe to share across threads; concurrent calls are bounded by the parser
/// pool. Call [`AstSplitter::dispose`] at end of life (dropping does it too).
pub struct AstSplitter {
    config: SplitterConfig,
    pool_config: PoolConfig,
    pool: ParserPool,
    trees: TreeTracker,
    disposed: AtomicBool,
}

impl AstSplitter {
    pub fn new(config: SplitterConfig, pool_config: PoolConfig) -> Result<Self> {
        config.validate()?;
        pool_config.validate()?;

        let pool = ParserPool::new(pool_config.initial_size, pool_config.max_size);
        tracing::debug!(
            "AST splitter ready: chunk_size={}, chunk_overlap={}, include_context={}",
            config.chunk_size,
            config.chunk_overlap,
            config.include_context
        );

        Ok(Self {
            config,
            pool_config,
            pool,
            trees: TreeTracker::new(),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.splitter.clone(), config.pool.clone())
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) -> Result<()> {
        let updated = SplitterConfig {
            chunk_size,
            ..self.config.clone()
        };
        updated.validate()?;
        self.config = updated;
        Ok(())
    }

    pub fn set_chunk_overlap(&mut self, chunk_overlap: usize) -> Result<()> {
        let updated = SplitterConfig {
            chunk_overlap,
            ..self.config.clone()
        };
        updated.validate()?;
        self.config = updated;
        Ok(())
    }

    pub fn set_include_context(&mut self, include_context: bool) {
        self.config.include_context = include_context;
    }

    pub fn set_context_lines(&mut self, context_lines: usize) {
        self.config.context_lines = context_lines;
    }

    /// Split source text into chunks
    ///
    /// Unsupported languages and parse failures are routed to the line-window
    /// fallback. Only pool errors (exhaustion timeout, destroyed pool) reach
    /// the caller.
    pub fn split(
        &self,
        source: &str,
        language_id: &str,
        file_path: Option<&str>,
    ) -> Result<Vec<Chunk>> {
        if source.trim().is_empty() {
            return Ok(Vec::new());
        }

        let fallback = FallbackSplitter::from_config(&self.config);
        let Some(language) = registry::resolve(language_id) else {
            tracing::debug!(
                "No grammar registered for '{}'; splitting into line windows",
                language_id
            );
            return Ok(fallback.split(source, language_id.trim(), file_path));
        };

        match self.split_with_ast(source, language, file_path) {
            Ok(chunks) if chunks.is_empty() && self.config.fallback_on_empty => {
                tracing::debug!(
                    "No {} chunks found in {}; splitting into line windows",
                    language.name,
                    file_path.unwrap_or("<input>")
                );
                Ok(fallback.split(source, language.name, file_path))
            }
            Ok(chunks) => Ok(chunks),
            Err(err @ ChunkerError::Pool(_)) => Err(err),
            Err(err) => {
                tracing::warn!(
                    "AST split of {} as {} failed, falling back to line windows: {}",
                    file_path.unwrap_or("<input>"),
                    language.name,
                    err
                );
                Ok(fallback.split(source, language.name, file_path))
            }
        }
    }

    fn split_with_ast(
        &self,
        source: &str,
        language: &'static LanguageConfig,
        file_path: Option<&str>,
    ) -> Result<Vec<Chunk>> {
        let mut parser = self.pool.acquire(self.pool_config.acquire_timeout())?;
        parser
            .set_language(&language.grammar())
            .map_err(|e| ParseError::GrammarMismatch {
                language: language.name.to_string(),
                reason: e.to_string(),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::NoTree(language.name.to_string()))?;

        // Declared after the parser guard, so unwinding drops the tree first
        let tree = ScopedTree::new(tree, &self.trees);
        let chunks = self.chunks_from_tree(&tree, source, language, file_path);
        tree.dispose();
        chunks
    }

    fn chunks_from_tree(
        &self,
        tree: &ScopedTree<'_>,
        source: &str,
        language: &'static LanguageConfig,
        file_path: Option<&str>,
    ) -> Result<Vec<Chunk>> {
        let root = tree
            .root_node()
            .ok_or_else(|| ParseError::NoTree(language.name.to_string()))?;

        if root.has_error() {
            if self.config.fallback_on_syntax_error {
                return Err(ParseError::SyntaxErrors(language.name.to_string()).into());
            }
            tracing::debug!(
                "Syntax errors in {}; chunking the recovered tree",
                file_path.unwrap_or("<input>")
            );
        }

        let lines: Vec<&str> = source.lines().collect();
        let candidates = traverser::collect_candidates(root, &lines, language);
        let assembler = ChunkAssembler::new(&lines, language, file_path, &self.config);

        let mut chunks = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            if let Some(chunk) = assembler.assemble(candidate)? {
                chunks.push(chunk);
            }
        }

        tracing::debug!(
            "{} of {} {} candidates kept",
            chunks.len(),
            candidates.len(),
            language.name
        );
        Ok(chunks)
    }

    /// Read a file and split it, detecting the language from its extension
    pub fn split_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        if !path.is_file() {
            return Err(ValidationError::PathNotFound(path.display().to_string()).into());
        }

        // Chunks record the path verbatim, so it has to be valid UTF-8
        let file_path = path
            .to_str()
            .ok_or_else(|| ValidationError::InvalidPath(path.display().to_string()))?;

        let content = std::fs::read_to_string(path)?;
        let language = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| detect_language(ext).unwrap_or(ext))
            .unwrap_or(UNKNOWN_LANGUAGE);

        self.split(&content, language, Some(file_path))
    }

    /// Split a file discovered by the walker
    pub fn split_source(&self, file: &SourceFile) -> Result<Vec<Chunk>> {
        self.split(&file.content, &file.language, Some(&file.relative_path))
    }

    /// Split many files in parallel; results keep the input order
    pub fn split_many(&self, files: &[SourceFile]) -> Vec<Result<Vec<Chunk>>> {
        files.par_iter().map(|file| self.split_source(file)).collect()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Trees parsed but not yet released
    pub fn live_trees(&self) -> usize {
        self.trees.live()
    }

    /// Tear down the parser pool
    ///
    /// Later calls to `split` for supported languages fail with
    /// `PoolError::Closed`. Calling this twice only logs a warning.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            tracing::warn!("AST splitter disposed more than once");
            return;
        }
        self.pool.destroy();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Default for AstSplitter {
    fn default() -> Self {
        let pool_config = PoolConfig::default();
        Self {
            config: SplitterConfig::default(),
            pool: ParserPool::new(pool_config.initial_size, pool_config.max_size),
            pool_config,
            trees: TreeTracker::new(),
            disposed: AtomicBool::new(false),
        }
    }
}

impl Drop for AstSplitter {
    fn drop(&mut self) {
        if !self.is_disposed() {
            self.dispose();
        }
    }
}
