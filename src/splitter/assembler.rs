//! Turns traversal candidates into finished chunks

use super::context::ContextBuilder;
use super::registry::LanguageConfig;
use super::traverser::Candidate;
use crate::config::SplitterConfig;
use crate::error::ParseError;
use crate::types::Chunk;
use regex::Regex;
use std::sync::LazyLock;

/// Description used when no probe recognizes the first line
pub const DEFAULT_DESCRIPTION: &str = "Code chunk";

struct Probe {
    label: &'static str,
    pattern: Regex,
}

impl Probe {
    fn new(label: &'static str, pattern: &str) -> Self {
        Self {
            label,
            pattern: Regex::new(pattern).expect("static description probe compiles"),
        }
    }
}

/// Statement keywords that look like a call followed by a block
const CONTROL_KEYWORDS: &[&str] = &["if", "for", "foreach", "while", "switch", "catch", "return"];

// Ties on match position go to the earlier probe
static PROBES: LazyLock<Vec<Probe>> = LazyLock::new(|| {
    vec![
        Probe::new("Interface", r"\binterface\s+([A-Za-z_$][\w$]*)"),
        Probe::new("Class", r"\bclass\s+([A-Za-z_$][\w$]*)"),
        Probe::new("Struct", r"\bstruct\s+([A-Za-z_]\w*)"),
        Probe::new("Enum", r"\benum\s+([A-Za-z_]\w*)"),
        Probe::new("Trait", r"\btrait\s+([A-Za-z_]\w*)"),
        Probe::new("Implementation", r"\bimpl(?:\s*<[^>]*>)?\s+([A-Za-z_][\w:]*)"),
        Probe::new("Module", r"\b(?:mod|module|namespace)\s+([A-Za-z_][\w.:]*)"),
        Probe::new(
            "Function",
            r"\b(?:fn|function\*?|def|func)\s+(?:\([^)]*\)\s*)?([A-Za-z_$][\w$]*)",
        ),
        Probe::new(
            "Function",
            r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*=>",
        ),
        Probe::new(
            "Method",
            r"^\s*(?:(?:public|private|protected|internal|static|final|abstract|async|override|virtual|synchronized)\s+)+[\w<>\[\],.?\s]*?\b([A-Za-z_]\w*)\s*\(",
        ),
        Probe::new(
            "Method",
            r"^\s*(?:async\s+)?\*?([A-Za-z_$][\w$]*)\s*\([^)]*\)\s*(?::[^{]*)?\{",
        ),
    ]
});

/// One-line heuristic summary of a code fragment
///
/// Only the first non-blank line is inspected. The earliest probe match on
/// that line wins; [`DEFAULT_DESCRIPTION`] is returned when nothing matches.
pub fn describe(text: &str) -> String {
    let Some(first_line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return DEFAULT_DESCRIPTION.to_string();
    };

    PROBES
        .iter()
        .filter_map(|probe| {
            let captures = probe.pattern.captures(first_line)?;
            let position = captures.get(0)?.start();
            let name = captures.get(1)?.as_str();
            if CONTROL_KEYWORDS.contains(&name) {
                return None;
            }
            Some((position, probe.label, name))
        })
        .min_by_key(|(position, _, _)| *position)
        .map(|(_, label, name)| format!("{}: {}", label, name))
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string())
}

/// Assembles chunks for one split call
pub struct ChunkAssembler<'a> {
    lines: &'a [&'a str],
    language: &'static str,
    file_path: Option<&'a str>,
    context: Option<ContextBuilder<'a>>,
    min_chunk_chars: usize,
}

impl<'a> ChunkAssembler<'a> {
    pub fn new(
        lines: &'a [&'a str],
        language: &'static LanguageConfig,
        file_path: Option<&'a str>,
        config: &SplitterConfig,
    ) -> Self {
        let context = config.include_context.then(|| {
            ContextBuilder::new(
                lines,
                language.family,
                config.context_lines,
                config.max_global_lines,
            )
        });

        Self {
            lines,
            language: language.name,
            file_path,
            context,
            min_chunk_chars: config.min_chunk_chars,
        }
    }

    /// Build the chunk for a candidate
    ///
    /// Returns `Ok(None)` when the source slice is below the minimum size; a
    /// context prefix never lifts a declaration-only node over the threshold.
    pub fn assemble(&self, candidate: &Candidate) -> Result<Option<Chunk>, ParseError> {
        let line_count = self.lines.len();
        if candidate.start_row >= line_count || candidate.start_row > candidate.end_row {
            return Err(ParseError::RowOutOfRange {
                start: candidate.start_row,
                end: candidate.end_row,
                line_count,
            });
        }
        let end_row = candidate.end_row.min(line_count - 1);

        let body = self.lines[candidate.start_row..=end_row].join("\n");
        if body.chars().count() < self.min_chunk_chars {
            tracing::trace!(
                "Dropping {} at line {}: below {} characters",
                candidate.kind,
                candidate.start_row + 1,
                self.min_chunk_chars
            );
            return Ok(None);
        }
        let description = describe(&body);

        let prefix = self
            .context
            .as_ref()
            .map(|context| context.prefix(candidate))
            .unwrap_or_default();
        let has_context = !prefix.is_empty();
        let content = if has_context {
            let mut content = prefix.join("\n");
            content.push('\n');
            content.push_str(&body);
            content
        } else {
            body
        };

        Ok(Some(Chunk {
            content,
            start_line: candidate.start_row + 1,
            end_line: end_row + 1,
            language: self.language.to_string(),
            file_path: self.file_path.map(str::to_string),
            node_type: candidate.kind.to_string(),
            has_context,
            description,
        }))
    }
}
