//! # AST Chunker - Syntax-Aware Source Code Chunking
//!
//! Turns source files into ordered, overlapping, context-enriched text chunks
//! suitable for embedding and semantic search.
//!
//! ## Overview
//!
//! The engine parses a file with tree-sitter, emits a chunk for every
//! function, class, type or module node, prefixes each chunk with the file's
//! imports and the signature of its enclosing container, and falls back to a
//! line-window splitter whenever no grammar is registered or parsing fails.
//!
//! ## Key Features
//!
//! - **13 Languages**: Rust, Python, JavaScript, TypeScript, TSX, Go, Java, C,
//!   C++, C#, Ruby, PHP and Swift through a static grammar registry
//! - **Nested Chunks**: a class and each of its methods are all emitted
//! - **Context Prefixes**: global imports/constants, ancestor signature and
//!   surrounding lines
//! - **Bounded Parser Pool**: reusable parsers with eager pre-fill, lazy growth
//!   to a cap and optional acquire timeout
//! - **Leak-Free Trees**: every parsed tree is released exactly once, on every
//!   exit path
//! - **Never Fails on Input**: unsupported or malformed input degrades to line
//!   windows
//!
//! ## Architecture
//!
//! ```text
//! source ──► registry ──► parser pool ──► traverser ──► assembler ──► chunks
//!               │              │              │             ▲
//!               │ unsupported  │ no tree      │ context ────┘
//!               ▼              ▼              ▼
//!            fallback (line windows) ◄── any AST failure
//! ```
//!
//! ## Modules
//!
//! - [`splitter`]: the chunking engine ([`AstSplitter`])
//! - [`indexer`]: directory walking and language detection
//! - [`config`]: configuration with TOML files and environment overrides
//! - [`types`]: the [`Chunk`] record
//! - [`error`]: error types and result aliases
//! - [`glob_utils`]: include/exclude pattern matching
//! - [`paths`]: platform configuration paths
//!
//! ## Usage Example
//!
//! ```no_run
//! use ast_chunker::AstSplitter;
//!
//! fn main() -> ast_chunker::error::Result<()> {
//!     let splitter = AstSplitter::default();
//!     let source = std::fs::read_to_string("src/lib.rs")?;
//!
//!     for chunk in splitter.split(&source, "rust", Some("src/lib.rs"))? {
//!         println!("{}-{} {}", chunk.start_line, chunk.end_line, chunk.description);
//!     }
//!
//!     splitter.dispose();
//!     Ok(())
//! }
//! ```

/// Configuration management with environment variable overrides
pub mod config;

/// Error types and utilities
pub mod error;

/// Glob pattern matching utilities for path filtering
pub mod glob_utils;

/// File walking and language detection
pub mod indexer;

/// Platform-specific configuration paths
pub mod paths;

/// Syntax-tree chunking engine, parser pool and fallback splitter
pub mod splitter;

/// Chunk record produced by the splitter
pub mod types;

pub use config::Config;
pub use error::ChunkerError;
pub use splitter::AstSplitter;
pub use types::Chunk;
