//! Context prefixes for AST chunks
//!
//! Three best-effort blocks can be prepended to a chunk:
//! - global context: import / type / constant lines from the head of the file
//! - ancestor context: the signature line of the nearest enclosing container
//! - surrounding lines: a few non-blank lines right before the chunk
//!
//! All detection is regex based and approximate. Nothing here can fail; a
//! pattern that matches nothing simply contributes no context.

use super::registry::ContextFamily;
use super::traverser::{Candidate, row_span};
use regex::RegexSet;
use std::collections::HashSet;
use std::sync::LazyLock;
use tree_sitter::Node;

/// Signature of an enclosing container node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    /// Header line, trimmed and cut at the block-opening delimiter
    pub signature: String,
    /// 0-based row of the header line
    pub start_row: usize,
}

impl Ancestor {
    /// Derive the signature from the first header-like line of `node`
    ///
    /// Leading annotation, attribute and comment lines are skipped.
    pub fn from_node(node: &Node<'_>, lines: &[&str], family: ContextFamily) -> Option<Self> {
        let (start_row, end_row) = row_span(node);
        let last_row = end_row.min(lines.len().checked_sub(1)?);

        (start_row..=last_row).find_map(|row| {
            let line = lines[row].trim();
            if line.is_empty() || is_annotation(line) {
                return None;
            }
            let signature = truncate_signature(line, family);
            (!signature.is_empty()).then(|| Ancestor {
                signature,
                start_row: row,
            })
        })
    }
}

fn is_annotation(line: &str) -> bool {
    ["@", "#[", "[", "//", "/*", "*"]
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Cut a header line at its first block-opening delimiter
pub fn truncate_signature(line: &str, family: ContextFamily) -> String {
    let line = line.trim();
    let cut = family
        .block_delimiter()
        .and_then(|delimiter| line.find(delimiter))
        .map_or(line, |index| &line[..index]);
    cut.trim_end().to_string()
}

struct FamilyPatterns {
    /// First line matching any of these ends the global-context scan
    main_start: RegexSet,
    /// Scanned lines matching any of these are kept
    keep: RegexSet,
}

impl FamilyPatterns {
    fn new(main_start: &[&str], keep: &[&str]) -> Self {
        Self {
            main_start: RegexSet::new(main_start).expect("static main-start patterns compile"),
            keep: RegexSet::new(keep).expect("static global-context patterns compile"),
        }
    }
}

static RUST_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| {
    FamilyPatterns::new(
        &[
            r#"^\s*(pub(\([^)]*\))?\s+)?((async|const|unsafe|extern\s+"[^"]*")\s+)*(fn|struct|enum|trait|impl|union)\b"#,
            r"^\s*(pub(\([^)]*\))?\s+)?mod\s+\w+\s*\{",
            r"^\s*macro_rules!",
        ],
        &[
            r"^\s*(pub(\([^)]*\))?\s+)?use\s",
            r"^\s*extern\s+crate\s",
            r"^\s*(pub(\([^)]*\))?\s+)?mod\s+\w+\s*;",
            r"^\s*(pub(\([^)]*\))?\s+)?type\s+\w+",
            r"^\s*(pub(\([^)]*\))?\s+)?(const|static)\s+(mut\s+)?[A-Z_][A-Z0-9_]*\s*:",
        ],
    )
});

static PYTHON_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| {
    FamilyPatterns::new(
        &[r"^(async\s+def|def|class)\s", r"^@\w"],
        &[
            r"^(import|from)\s",
            r"^[A-Z_][A-Z0-9_]*\s*(:[^=]+)?=",
            r"^type\s+\w+\s*=",
            r"^\w+\s*:\s*TypeAlias\b",
        ],
    )
});

static JAVASCRIPT_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| {
    FamilyPatterns::new(
        &[
            r"^\s*(export\s+)?(default\s+)?(declare\s+)?(abstract\s+)?(async\s+)?(class|function|interface|enum|namespace)\b",
        ],
        &[
            r"^\s*import\s",
            r"^\s*(const|let|var)\s+[\w{}\s,]+=\s*require\(",
            r"^\s*(export\s+)?(declare\s+)?type\s+\w+",
            r"^\s*(export\s+)?const\s+[A-Z_][A-Z0-9_]*\s*(:[^=]+)?=",
            r"^\s*export\s+(\*|\{[^}]*\})\s+from\s",
        ],
    )
});

static GO_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| {
    FamilyPatterns::new(
        &[r"^func\s", r"^type\s+\w+\s+(struct|interface)\b"],
        &[
            r"^package\s",
            r"^import\s",
            r#"^\s+(\w+\s+)?"[^"]+"\s*$"#,
            r"^type\s+\w+\s",
            r"^(const|var)\s",
        ],
    )
});

static JVM_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| {
    FamilyPatterns::new(
        &[
            r"^\s*((public|private|protected|internal|static|abstract|final|sealed|partial|readonly|unsafe|strictfp|non-sealed)\s+)*(class|interface|enum|record|struct|@interface)\s",
        ],
        &[
            r"^\s*(import|package)\s",
            r"^\s*(global\s+)?using\s+[\w.=\s]+;",
            r"^\s*namespace\s+[\w.]+",
        ],
    )
});

static C_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| {
    FamilyPatterns::new(
        &[
            r"^\s*(class|struct|union|enum|namespace|template)\b[^;]*$",
            r"^[A-Za-z_][\w\s\*&:<>,]*\s[\*&]*[A-Za-z_][\w:~]*\s*\([^;]*$",
        ],
        &[
            r"^\s*#\s*(include|import|define)\b",
            r"^\s*typedef\s",
            r"^\s*using\s",
            r"^\s*(static\s+)?(const|constexpr)\s",
        ],
    )
});

static RUBY_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| {
    FamilyPatterns::new(
        &[r"^\s*(class|module|def)\s"],
        &[
            r"^\s*require(_relative)?[\s(]",
            r"^\s*(include|extend)\s+[A-Z]",
            r"^\s*[A-Z][A-Z0-9_]*\s*=",
        ],
    )
});

static PHP_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| {
    FamilyPatterns::new(
        &[r"^\s*((abstract|final|readonly)\s+)*(class|interface|trait|enum|function)\s"],
        &[
            r"^\s*namespace\s",
            r"^\s*use\s",
            r"^\s*(require|include)(_once)?\b",
            r"^\s*const\s+\w+",
            r"^\s*define\(",
        ],
    )
});

static SWIFT_PATTERNS: LazyLock<FamilyPatterns> = LazyLock::new(|| {
    FamilyPatterns::new(
        &[
            r"^\s*((public|private|internal|fileprivate|open|final|@\w+)\s+)*(class|struct|enum|protocol|extension|actor|func)\s",
        ],
        &[
            r"^\s*(@testable\s+)?import\s",
            r"^\s*((public|private|internal|fileprivate)\s+)?typealias\s",
            r"^\s*((public|private|internal|fileprivate)\s+)?let\s+\w+",
        ],
    )
});

fn patterns(family: ContextFamily) -> &'static FamilyPatterns {
    match family {
        ContextFamily::Rust => &RUST_PATTERNS,
        ContextFamily::Python => &PYTHON_PATTERNS,
        ContextFamily::JavaScript => &JAVASCRIPT_PATTERNS,
        ContextFamily::Go => &GO_PATTERNS,
        ContextFamily::Jvm => &JVM_PATTERNS,
        ContextFamily::C => &C_PATTERNS,
        ContextFamily::Ruby => &RUBY_PATTERNS,
        ContextFamily::Php => &PHP_PATTERNS,
        ContextFamily::Swift => &SWIFT_PATTERNS,
    }
}

/// Import / type / constant lines collected from the head of a file
#[derive(Debug, Clone, Default)]
pub struct GlobalContext {
    entries: Vec<(usize, String)>,
}

impl GlobalContext {
    pub fn extract(lines: &[&str], family: ContextFamily, max_lines: usize) -> Self {
        let patterns = patterns(family);
        let mut entries = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            if entries.len() >= max_lines || patterns.main_start.is_match(line) {
                break;
            }
            if patterns.keep.is_match(line) {
                entries.push((row, line.trim_end().to_string()));
            }
        }

        Self { entries }
    }

    /// Kept lines located strictly above `row`
    pub fn lines_before(&self, row: usize) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .take_while(move |(line_row, _)| *line_row < row)
            .map(|(_, line)| line.as_str())
    }

    fn rows(&self) -> HashSet<usize> {
        self.entries.iter().map(|(row, _)| *row).collect()
    }
}

/// Up to `count` non-blank lines immediately above `start_row`, in document
/// order, never reaching above `floor_row`
pub fn surrounding_lines<'a>(
    lines: &[&'a str],
    start_row: usize,
    floor_row: usize,
    count: usize,
    skip_rows: &HashSet<usize>,
) -> Vec<&'a str> {
    let upper = start_row.min(lines.len());
    let mut picked: Vec<&'a str> = (floor_row..upper)
        .rev()
        .filter(|row| !skip_rows.contains(row))
        .map(|row| lines[row])
        .filter(|line| !line.trim().is_empty())
        .take(count)
        .collect();
    picked.reverse();
    picked
}

/// Builds context prefixes for the candidates of one split call
pub struct ContextBuilder<'a> {
    lines: &'a [&'a str],
    global: GlobalContext,
    global_rows: HashSet<usize>,
    context_lines: usize,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(
        lines: &'a [&'a str],
        family: ContextFamily,
        context_lines: usize,
        max_global_lines: usize,
    ) -> Self {
        let global = GlobalContext::extract(lines, family, max_global_lines);
        let global_rows = global.rows();
        Self {
            lines,
            global,
            global_rows,
            context_lines,
        }
    }

    /// Prefix lines for a candidate: global, then ancestor, then surrounding
    pub fn prefix<'c>(&'c self, candidate: &'c Candidate) -> Vec<&'c str> {
        let mut prefix: Vec<&'c str> = self.global.lines_before(candidate.start_row).collect();

        let floor_row = match &candidate.ancestor {
            Some(ancestor) => {
                prefix.push(ancestor.signature.as_str());
                ancestor.start_row + 1
            }
            None => 0,
        };

        if self.context_lines > 0 {
            prefix.extend(surrounding_lines(
                self.lines,
                candidate.start_row,
                floor_row,
                self.context_lines,
                &self.global_rows,
            ));
        }

        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn candidate(start_row: usize, ancestor: Option<Ancestor>) -> Candidate {
        Candidate {
            kind: "function_item",
            start_row,
            end_row: start_row,
            ancestor: ancestor.map(Rc::new),
        }
    }

    #[test]
    fn test_truncate_signature() {
        assert_eq!(
            truncate_signature("  class Greeter {", ContextFamily::JavaScript),
            "class Greeter"
        );
        assert_eq!(
            truncate_signature("class Foo(Base):", ContextFamily::Python),
            "class Foo(Base)"
        );
        assert_eq!(
            truncate_signature("class Foo < Bar", ContextFamily::Ruby),
            "class Foo < Bar"
        );
        assert_eq!(
            truncate_signature("impl<T: Clone> Store<T> {", ContextFamily::Rust),
            "impl<T: Clone> Store<T>"
        );
    }

    #[test]
    fn test_rust_global_context() {
        let source = "use std::io;\nuse crate::x::Y;\n\nconst MAX: usize = 3;\ntype Id = u64;\n// note\nfn main() {}\nuse late::Thing;\n";
        let lines: Vec<&str> = source.lines().collect();
        let global = GlobalContext::extract(&lines, ContextFamily::Rust, 20);
        let kept: Vec<&str> = global.lines_before(usize::MAX).collect();
        assert_eq!(
            kept,
            vec![
                "use std::io;",
                "use crate::x::Y;",
                "const MAX: usize = 3;",
                "type Id = u64;"
            ]
        );
    }

    #[test]
    fn test_python_global_context_stops_at_main_content() {
        let source = "import os\nfrom typing import List\nTIMEOUT = 30\n\nclass A:\n    pass\nimport sys\n";
        let lines: Vec<&str> = source.lines().collect();
        let global = GlobalContext::extract(&lines, ContextFamily::Python, 20);
        assert_eq!(global.lines_before(usize::MAX).count(), 3);
        assert!(global.lines_before(usize::MAX).all(|l| !l.contains("sys")));
    }

    #[test]
    fn test_typescript_global_context() {
        let source = "import { a } from './a';\nexport type Id = string;\nconst MAX_RETRIES = 3;\nlet counter = 0;\nexport class Service {\n}\n";
        let lines: Vec<&str> = source.lines().collect();
        let global = GlobalContext::extract(&lines, ContextFamily::JavaScript, 20);
        let kept: Vec<&str> = global.lines_before(usize::MAX).collect();
        assert_eq!(
            kept,
            vec![
                "import { a } from './a';",
                "export type Id = string;",
                "const MAX_RETRIES = 3;"
            ]
        );
    }

    #[test]
    fn test_jvm_and_go_global_context() {
        let java = "package com.example;\n\nimport java.util.List;\n\npublic class App {\n}\n";
        let lines: Vec<&str> = java.lines().collect();
        let global = GlobalContext::extract(&lines, ContextFamily::Jvm, 20);
        assert_eq!(global.lines_before(usize::MAX).count(), 2);

        let go = "package main\n\nimport (\n\t\"fmt\"\n)\n\nfunc main() {}\n";
        let lines: Vec<&str> = go.lines().collect();
        let kept: Vec<String> = GlobalContext::extract(&lines, ContextFamily::Go, 20)
            .lines_before(usize::MAX)
            .map(str::to_string)
            .collect();
        assert_eq!(kept, vec!["package main", "import (", "\t\"fmt\""]);
    }

    #[test]
    fn test_global_context_respects_max_lines() {
        let source: String = (0..10).map(|i| format!("use crate::m{};\n", i)).collect();
        let lines: Vec<&str> = source.lines().collect();
        let global = GlobalContext::extract(&lines, ContextFamily::Rust, 4);
        assert_eq!(global.lines_before(usize::MAX).count(), 4);
    }

    #[test]
    fn test_global_lines_before_row() {
        let source = "use a;\nfn x() {}\n";
        let lines: Vec<&str> = source.lines().collect();
        let global = GlobalContext::extract(&lines, ContextFamily::Rust, 20);
        assert_eq!(global.lines_before(0).count(), 0);
        assert_eq!(global.lines_before(1).count(), 1);
    }

    #[test]
    fn test_surrounding_lines_skip_blanks_and_respect_floor() {
        let lines = vec!["a", "b", "", "c", "   ", "d", "target"];
        let none = HashSet::new();
        assert_eq!(surrounding_lines(&lines, 6, 0, 3, &none), vec!["b", "c", "d"]);
        assert_eq!(surrounding_lines(&lines, 6, 4, 3, &none), vec!["d"]);
        assert!(surrounding_lines(&lines, 0, 0, 3, &none).is_empty());

        let skip: HashSet<usize> = [3].into_iter().collect();
        assert_eq!(surrounding_lines(&lines, 6, 0, 2, &skip), vec!["b", "d"]);
    }

    #[test]
    fn test_prefix_order_global_ancestor_surrounding() {
        let source = "use std::fmt;\n\nimpl Foo {\n    /// Docs\n    fn bar(&self) {}\n}\n";
        let lines: Vec<&str> = source.lines().collect();
        let builder = ContextBuilder::new(&lines, ContextFamily::Rust, 3, 20);
        let ancestor = Ancestor {
            signature: "impl Foo".to_string(),
            start_row: 2,
        };
        let member = candidate(4, Some(ancestor));
        assert_eq!(
            builder.prefix(&member),
            vec!["use std::fmt;", "impl Foo", "    /// Docs"]
        );
    }

    #[test]
    fn test_prefix_does_not_repeat_global_lines() {
        let source = "use std::fmt;\nfn bar() {}\n";
        let lines: Vec<&str> = source.lines().collect();
        let builder = ContextBuilder::new(&lines, ContextFamily::Rust, 3, 20);
        assert_eq!(builder.prefix(&candidate(1, None)), vec!["use std::fmt;"]);
    }

    #[test]
    fn test_prefix_without_surrounding_lines() {
        let source = "// a\n// b\nfn bar() {}\n";
        let lines: Vec<&str> = source.lines().collect();
        let builder = ContextBuilder::new(&lines, ContextFamily::Rust, 0, 20);
        assert!(builder.prefix(&candidate(2, None)).is_empty());
    }
}
