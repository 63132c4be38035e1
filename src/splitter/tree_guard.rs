//! Scoped ownership of parsed syntax trees
//!
//! A [`ScopedTree`] is the sole owner of the tree produced by one parse. The
//! tree is released exactly once: either through [`ScopedTree::dispose`] or,
//! on early returns and unwinding, through `Drop`. A [`TreeTracker`] counts
//! live trees so leaks are observable.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use tree_sitter::{Node, Tree};

/// Counts trees currently owned by scoped guards
#[derive(Debug, Default)]
pub struct TreeTracker {
    live: AtomicUsize,
    disposed: AtomicUsize,
}

impl TreeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trees parsed but not yet disposed
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Trees disposed since the tracker was created
    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::Acquire)
    }
}

pub struct ScopedTree<'t> {
    tree: Option<Tree>,
    tracker: &'t TreeTracker,
}

impl<'t> ScopedTree<'t> {
    pub fn new(tree: Tree, tracker: &'t TreeTracker) -> Self {
        tracker.live.fetch_add(1, Ordering::AcqRel);
        Self {
            tree: Some(tree),
            tracker,
        }
    }

    /// Root node of the owned tree; `None` only after disposal
    pub fn root_node(&self) -> Option<Node<'_>> {
        self.tree.as_ref().map(Tree::root_node)
    }

    /// Release the tree now instead of at scope end
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(tree) = self.tree.take() else {
            return;
        };

        // Bookkeeping proceeds even if the native release fails
        if panic::catch_unwind(AssertUnwindSafe(move || drop(tree))).is_err() {
            tracing::warn!("Releasing a syntax tree panicked; continuing");
        }
        self.tracker.live.fetch_sub(1, Ordering::AcqRel);
        self.tracker.disposed.fetch_add(1, Ordering::AcqRel);
    }
}

impl Drop for ScopedTree<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse_rust(source: &str) -> Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_dispose_releases_once() {
        let tracker = TreeTracker::new();
        let tree = ScopedTree::new(parse_rust("fn a() {}"), &tracker);
        assert_eq!(tracker.live(), 1);
        assert_eq!(tree.root_node().unwrap().kind(), "source_file");

        tree.dispose();
        assert_eq!(tracker.live(), 0);
        assert_eq!(tracker.disposed(), 1);
    }

    #[test]
    fn test_drop_releases_on_early_return() {
        fn failing(tracker: &TreeTracker) -> Result<(), String> {
            let _tree = ScopedTree::new(parse_rust("struct S;"), tracker);
            Err("traversal failed".to_string())
        }

        let tracker = TreeTracker::new();
        assert!(failing(&tracker).is_err());
        assert_eq!(tracker.live(), 0);
        assert_eq!(tracker.disposed(), 1);
    }

    #[test]
    fn test_drop_releases_on_panic() {
        let tracker = TreeTracker::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _tree = ScopedTree::new(parse_rust("enum E { A }"), &tracker);
            panic!("boom");
        }));
        assert!(outcome.is_err());
        assert_eq!(tracker.live(), 0);
        assert_eq!(tracker.disposed(), 1);
    }

    #[test]
    fn test_many_trees_tracked_independently() {
        let tracker = TreeTracker::new();
        let first = ScopedTree::new(parse_rust("fn a() {}"), &tracker);
        let second = ScopedTree::new(parse_rust("fn b() {}"), &tracker);
        assert_eq!(tracker.live(), 2);
        drop(first);
        assert_eq!(tracker.live(), 1);
        second.dispose();
        assert_eq!(tracker.live(), 0);
        assert_eq!(tracker.disposed(), 2);
    }
}
