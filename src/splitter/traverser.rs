//! Pre-order syntax tree walk that emits chunk candidates
//!
//! Every node whose kind is splittable yields a candidate, and the walk always
//! descends into children, so a class and each of its methods all appear.
//! The walk uses a `TreeCursor` with an explicit scope stack instead of
//! recursion, which keeps deeply nested input off the call stack.

use super::context::Ancestor;
use super::registry::LanguageConfig;
use std::rc::Rc;
use tree_sitter::Node;

/// A splittable node located in the source, before assembly
#[derive(Debug, Clone)]
pub struct Candidate {
    pub kind: &'static str,
    /// 0-based first row
    pub start_row: usize,
    /// 0-based last row (inclusive)
    pub end_row: usize,
    /// Nearest enclosing container, if any
    pub ancestor: Option<Rc<Ancestor>>,
}

/// Collect candidates in traversal order
pub fn collect_candidates(
    root: Node<'_>,
    lines: &[&str],
    language: &LanguageConfig,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut cursor = root.walk();
    // scopes[d] is the ancestor context in effect for nodes at depth d
    let mut scopes: Vec<Option<Rc<Ancestor>>> = vec![None];

    loop {
        let node = cursor.node();
        let inherited = scopes.last().cloned().flatten();
        let kind = node.kind();

        if language.is_splittable(kind) {
            let (start_row, end_row) = row_span(&node);
            candidates.push(Candidate {
                kind,
                start_row,
                end_row,
                ancestor: inherited.clone(),
            });
        }

        let for_children = if language.is_container(kind) {
            Ancestor::from_node(&node, lines, language.family)
                .map(Rc::new)
                .or(inherited)
        } else {
            inherited
        };

        if cursor.goto_first_child() {
            scopes.push(for_children);
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return candidates;
            }
            scopes.pop();
        }
    }
}

/// 0-based inclusive row range of a node
///
/// A node that ends at column 0 stops on the previous row; the trailing
/// newline is not part of its text.
pub fn row_span(node: &Node<'_>) -> (usize, usize) {
    let start = node.start_position();
    let end = node.end_position();
    let end_row = if end.column == 0 && end.row > start.row {
        end.row - 1
    } else {
        end.row
    };
    (start.row, end_row)
}
