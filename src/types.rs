use serde::{Deserialize, Serialize};

/// A contiguous line range of source text paired with metadata
///
/// Produced by the splitter and never mutated afterwards. Line numbers are
/// 1-based and inclusive. When `has_context` is true, `content` is the
/// context prefix followed by the source lines; otherwise it is exactly the
/// source lines `start_line..=end_line` joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Text handed to the embedding pipeline
    pub content: String,
    /// First source line covered (1-based)
    pub start_line: usize,
    /// Last source line covered (1-based, inclusive)
    pub end_line: usize,
    /// Canonical language id, or the requested id when it is unsupported
    pub language: String,
    /// Path of the originating file, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Syntax node kind, or `line_window` for fallback chunks
    pub node_type: String,
    /// Whether a context prefix was prepended to `content`
    pub has_context: bool,
    /// One-line heuristic summary
    pub description: String,
}

impl Chunk {
    /// Number of source lines covered by this chunk
    pub fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }

    /// True for chunks produced by the line-window fallback
    pub fn is_fallback(&self) -> bool {
        self.node_type == crate::splitter::FALLBACK_NODE_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Chunk {
        Chunk {
            content: "fn main() {}".to_string(),
            start_line: 3,
            end_line: 7,
            language: "rust".to_string(),
            file_path: None,
            node_type: "function_item".to_string(),
            has_context: false,
            description: "Function: main".to_string(),
        }
    }

    #[test]
    fn test_line_count() {
        assert_eq!(sample().line_count(), 5);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["startLine"], 3);
        assert_eq!(json["endLine"], 7);
        assert_eq!(json["nodeType"], "function_item");
        assert_eq!(json["hasContext"], false);
        assert!(json.get("filePath").is_none());
    }

    #[test]
    fn test_deserializes_without_file_path() {
        let json = r#"{
            "content": "x",
            "startLine": 1,
            "endLine": 1,
            "language": "python",
            "nodeType": "line_window",
            "hasContext": false,
            "description": "Code chunk"
        }"#;
        let chunk: Chunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.file_path, None);
        assert!(chunk.is_fallback());
    }
}
