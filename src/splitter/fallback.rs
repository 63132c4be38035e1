//! Language-agnostic line-window splitting
//!
//! Used whenever the syntax-tree path is unavailable: unknown language, no
//! tree, a failing AST step, or an AST pass that found nothing to emit.

use super::FALLBACK_NODE_TYPE;
use super::assembler::describe;
use crate::config::SplitterConfig;
use crate::types::Chunk;

/// Sliding line-window splitter with character budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    min_chunk_chars: usize,
}

fn line_len(line: &str) -> usize {
    line.chars().count()
}

impl FallbackSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize, min_chunk_chars: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
            min_chunk_chars,
        }
    }

    pub fn from_config(config: &SplitterConfig) -> Self {
        Self::new(
            config.chunk_size,
            config.chunk_overlap,
            config.min_chunk_chars,
        )
    }

    /// Split `source` into overlapping line windows
    pub fn split(&self, source: &str, language: &str, file_path: Option<&str>) -> Vec<Chunk> {
        let lines: Vec<&str> = source.lines().collect();
        if source.trim().is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut last_kept_start: Option<usize> = None;

        for (start, end) in self.windows(&lines) {
            let content = lines[start..=end].join("\n");
            if content.trim().is_empty() {
                continue;
            }

            let (start, content) = if line_len(&content) < self.min_chunk_chars {
                let floor = last_kept_start.map_or(0, |row| row + 1);
                let widened = self.widen_backwards(&lines, start, end, floor);
                (widened, lines[widened..=end].join("\n"))
            } else {
                (start, content)
            };

            if line_len(&content) < self.min_chunk_chars {
                continue;
            }

            last_kept_start = Some(start);
            chunks.push(self.chunk(content, start, end, language, file_path));
        }

        if chunks.is_empty() {
            tracing::debug!(
                "No window reached {} characters; emitting the whole input as one chunk",
                self.min_chunk_chars
            );
            chunks.push(self.chunk(lines.join("\n"), 0, lines.len() - 1, language, file_path));
        }

        chunks
    }

    /// Inclusive row ranges of the windows covering `lines`
    ///
    /// Whole lines are packed while the joined length stays within
    /// `chunk_size`; a single longer line forms its own window. Each next
    /// window starts with the trailing lines of the previous one that fit in
    /// `chunk_overlap`, as long as the first unseen line still fits after them.
    fn windows(&self, lines: &[&str]) -> Vec<(usize, usize)> {
        let mut windows = Vec::new();
        let mut start = 0;

        while start < lines.len() {
            let mut end = start;
            let mut len = line_len(lines[start]);
            while end + 1 < lines.len() && len + 1 + line_len(lines[end + 1]) <= self.chunk_size {
                end += 1;
                len += 1 + line_len(lines[end]);
            }
            windows.push((start, end));

            let unseen = end + 1;
            if unseen >= lines.len() {
                break;
            }

            let unseen_len = line_len(lines[unseen]);
            let mut next = unseen;
            let mut carried = 0;
            while next > start + 1 {
                let row = next - 1;
                let grown = if carried == 0 {
                    line_len(lines[row])
                } else {
                    carried + 1 + line_len(lines[row])
                };
                if grown > self.chunk_overlap || grown + 1 + unseen_len > self.chunk_size {
                    break;
                }
                carried = grown;
                next = row;
            }
            start = next;
        }

        windows
    }

    /// Pull `start` back over earlier lines while the window stays within
    /// `chunk_size` and above `floor`
    fn widen_backwards(&self, lines: &[&str], start: usize, end: usize, floor: usize) -> usize {
        let mut start = start;
        let mut len = lines[start..=end].iter().map(|l| line_len(l)).sum::<usize>() + (end - start);
        while start > floor && len + 1 + line_len(lines[start - 1]) <= self.chunk_size {
            start -= 1;
            len += 1 + line_len(lines[start]);
        }
        start
    }

    fn chunk(
        &self,
        content: String,
        start: usize,
        end: usize,
        language: &str,
        file_path: Option<&str>,
    ) -> Chunk {
        Chunk {
            description: describe(&content),
            content,
            start_line: start + 1,
            end_line: end + 1,
            language: language.to_string(),
            file_path: file_path.map(str::to_string),
            node_type: FALLBACK_NODE_TYPE.to_string(),
            has_context: false,
        }
    }
}

impl Default for FallbackSplitter {
    fn default() -> Self {
        Self::from_config(&SplitterConfig::default())
    }
}
