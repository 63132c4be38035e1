//! File discovery and language detection feeding the splitter
//!
//! Walks a directory honoring ignore files and include/exclude patterns,
//! detects each file's language from its extension and loads it as a
//! [`SourceFile`] ready for [`crate::splitter::AstSplitter::split_source`].

mod file_info;
mod file_walker;
mod language;

pub use file_info::{SourceFile, content_hash};
pub use file_walker::FileWalker;
pub use language::detect_language;
