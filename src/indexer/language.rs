//! Programming language detection from file extensions

use crate::splitter::registry;

/// Map a file extension to a canonical registry language id
///
/// Returns `None` for extensions without a registered grammar; such files
/// still split, through the line-window fallback.
pub fn detect_language(extension: &str) -> Option<&'static str> {
    let extension = extension.trim_start_matches('.').to_lowercase();
    let id = match extension.as_str() {
        "pyi" | "pyw" => "python",
        "mts" | "cts" => "typescript",
        "rake" | "gemspec" => "ruby",
        "phtml" => "php",
        other => other,
    };
    registry::resolve(id).map(|config| config.name)
}
