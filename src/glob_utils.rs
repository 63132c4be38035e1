//! Include/exclude pattern matching for file walking

use crate::error::ValidationError;
use globset::{Glob, GlobMatcher};

#[derive(Debug, Clone)]
enum Pattern {
    /// No glob metacharacters: matches a whole path component or a path suffix
    Literal(String),
    Glob(GlobMatcher),
}

/// Compiled set of path patterns
///
/// # Examples
///
/// ```
/// use ast_chunker::glob_utils::PatternSet;
///
/// let patterns = PatternSet::new(&["lib/**".to_string(), "target".to_string()]).unwrap();
/// assert!(patterns.is_match("project/lib/utils.ts"));
/// assert!(patterns.is_match("target/debug/build.rs"));
/// assert!(!patterns.is_match("src/main.rs"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '[', '{'])
}

impl PatternSet {
    pub fn new(patterns: &[String]) -> Result<Self, ValidationError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                if is_literal(pattern) {
                    return Ok(Pattern::Literal(pattern.trim_matches('/').to_string()));
                }
                Glob::new(pattern)
                    .map(|glob| Pattern::Glob(glob.compile_matcher()))
                    .map_err(|e| ValidationError::InvalidPattern(format!("{}: {}", pattern, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether any pattern matches `path` (`/`- or `\`-separated)
    pub fn is_match(&self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");
        let path = normalized.trim_start_matches('/');
        self.patterns.iter().any(|pattern| match pattern {
            Pattern::Literal(literal) => {
                path.split('/').any(|component| component == literal) || path.ends_with(literal.as_str())
            }
            Pattern::Glob(matcher) => {
                // "lib/**" should also match "project/lib/file.ts"
                let parts: Vec<&str> = path.split('/').collect();
                (0..parts.len()).any(|i| matcher.is_match(parts[i..].join("/")))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> PatternSet {
        let owned: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        PatternSet::new(&owned).unwrap()
    }

    #[test]
    fn test_matches_directory_glob() {
        let patterns = set(&["lib/**"]);
        assert!(patterns.is_match("/project/lib/utils.ts"));
        assert!(patterns.is_match("lib/nested/file.rs"));
        assert!(!patterns.is_match("/project/src/main.rs"));
    }

    #[test]
    fn test_matches_extension_glob() {
        let patterns = set(&["*.ts"]);
        assert!(patterns.is_match("src/main.ts"));
        assert!(patterns.is_match("lib/utils.ts"));
        assert!(!patterns.is_match("src/main.rs"));
    }

    #[test]
    fn test_matches_multiple_patterns() {
        let patterns = set(&["lib/**", "**/*.tsx"]);
        assert!(patterns.is_match("project/lib/utils.ts"));
        assert!(patterns.is_match("project/src/Component.tsx"));
        assert!(!patterns.is_match("project/src/main.rs"));
    }

    #[test]
    fn test_literal_matches_component_not_substring() {
        let patterns = set(&["dist"]);
        assert!(patterns.is_match("dist/bundle.js"));
        assert!(patterns.is_match("web/dist/bundle.js"));
        assert!(!patterns.is_match("src/distance.rs"));
    }

    #[test]
    fn test_literal_matches_suffix() {
        let patterns = set(&[".rs"]);
        assert!(patterns.is_match("src/main.rs"));
        assert!(!patterns.is_match("src/main.rsx"));
    }

    #[test]
    fn test_windows_separators() {
        let patterns = set(&["node_modules"]);
        assert!(patterns.is_match("web\\node_modules\\pkg\\index.js"));
    }

    #[test]
    fn test_empty_set() {
        let patterns = PatternSet::default();
        assert!(patterns.is_empty());
        assert!(!patterns.is_match("any/path.rs"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = PatternSet::new(&["src/[invalid".to_string()]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPattern(_)));
    }
}
