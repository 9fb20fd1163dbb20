//! Pre-order traversal of an accessible tree.
//!
//! Every visited node is paired with the [`TreePath`] that leads to it from
//! the traversal root. Traversal uses an explicit worklist, so arbitrarily
//! deep trees never grow the call stack.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::Accessible;
use crate::result::E2eResult;

/// Position of a node among its siblings: the `index`-th of `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NthOf {
    /// Zero-based position
    pub index: usize,
    /// Number of siblings, including this node
    pub count: usize,
}

impl NthOf {
    /// Synthetic marker for the traversal root
    pub const ROOT: Self = Self { index: 0, count: 1 };

    /// Create a new position
    #[must_use]
    pub const fn new(index: usize, count: usize) -> Self {
        Self { index, count }
    }

    /// Whether this is the last sibling
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }
}

impl fmt::Display for NthOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.count)
    }
}

/// Sequence of positions from the traversal root down to a node.
///
/// The first segment is always [`NthOf::ROOT`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreePath(Vec<NthOf>);

impl TreePath {
    /// Path of the traversal root
    #[must_use]
    pub fn root() -> Self {
        Self(vec![NthOf::ROOT])
    }

    /// Path of the `index`-th of `count` children of this path's node
    #[must_use]
    pub fn child(&self, index: usize, count: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(NthOf::new(index, count));
        Self(segments)
    }

    /// Position of the node among its siblings
    #[must_use]
    pub fn last(&self) -> NthOf {
        self.0.last().copied().unwrap_or(NthOf::ROOT)
    }

    /// All segments, root first
    #[must_use]
    pub fn segments(&self) -> &[NthOf] {
        &self.0
    }

    /// Depth below the traversal root (the root itself is depth 0)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Iterator over `(path, node)` pairs in pre-order.
///
/// A backend failure is yielded once as `Err`, after which the iterator is
/// exhausted.
#[derive(Debug)]
pub struct TreeWalker<N> {
    stack: Vec<(TreePath, N)>,
    failed: bool,
}

impl<N: Accessible> TreeWalker<N> {
    /// Start a traversal at `root`
    #[must_use]
    pub fn new(root: &N) -> Self {
        Self {
            stack: vec![(TreePath::root(), root.clone())],
            failed: false,
        }
    }

    fn expand(&mut self, path: &TreePath, node: &N) -> E2eResult<()> {
        let count = node.child_count()?;
        let mut kids = Vec::with_capacity(count);
        for index in 0..count {
            kids.push((path.child(index, count), node.child_at(index)?));
        }
        // reversed so the first child is popped next
        self.stack.extend(kids.into_iter().rev());
        Ok(())
    }
}

impl<N: Accessible> Iterator for TreeWalker<N> {
    type Item = E2eResult<(TreePath, N)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (path, node) = self.stack.pop()?;
        if let Err(e) = self.expand(&path, &node) {
            self.failed = true;
            self.stack.clear();
            return Some(Err(e));
        }
        Some(Ok((path, node)))
    }
}

/// Visit `root` and all its descendants in pre-order.
///
/// Each call builds a fresh worklist; nothing is cached between walks.
pub fn walk<N: Accessible>(root: &N) -> TreeWalker<N> {
    TreeWalker::new(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockNode;
    use proptest::prelude::*;

    fn sample() -> MockNode {
        MockNode::new("frame", "root")
            .with_child(
                MockNode::new("panel", "a")
                    .with_child(MockNode::new("label", "a1"))
                    .with_child(MockNode::new("label", "a2")),
            )
            .with_child(MockNode::new("push button", "b"))
    }

    mod nth_of_tests {
        use super::*;

        #[test]
        fn test_root_marker() {
            assert_eq!(NthOf::ROOT, NthOf::new(0, 1));
            assert!(NthOf::ROOT.is_last());
        }

        #[test]
        fn test_display() {
            assert_eq!(NthOf::new(2, 5).to_string(), "2/5");
        }

        #[test]
        fn test_is_last() {
            assert!(!NthOf::new(0, 2).is_last());
            assert!(NthOf::new(1, 2).is_last());
        }
    }

    mod path_tests {
        use super::*;

        #[test]
        fn test_child_appends_segment() {
            let p = TreePath::root().child(1, 3).child(0, 2);
            assert_eq!(
                p.segments(),
                &[NthOf::ROOT, NthOf::new(1, 3), NthOf::new(0, 2)]
            );
            assert_eq!(p.last(), NthOf::new(0, 2));
            assert_eq!(p.depth(), 2);
            assert_eq!(p.to_string(), "0/1 1/3 0/2");
        }
    }

    mod walker_tests {
        use super::*;

        #[test]
        fn test_preorder_order() {
            let names: Vec<String> = walk(&sample())
                .map(|r| r.unwrap().1.name().unwrap())
                .collect();
            assert_eq!(names, vec!["root", "a", "a1", "a2", "b"]);
        }

        #[test]
        fn test_paths_are_tagged() {
            let paths: Vec<TreePath> = walk(&sample()).map(|r| r.unwrap().0).collect();
            assert_eq!(paths[0], TreePath::root());
            assert_eq!(paths[1], TreePath::root().child(0, 2));
            assert_eq!(paths[3], TreePath::root().child(0, 2).child(1, 2));
            assert_eq!(paths[4], TreePath::root().child(1, 2));
        }

        #[test]
        fn test_subtree_root_is_always_root_marker() {
            let root = sample();
            let panel = root.child_at(0).unwrap();
            let (path, _) = walk(&panel).next().unwrap().unwrap();
            assert_eq!(path, TreePath::root());
        }

        #[test]
        fn test_restartable() {
            let root = sample();
            assert_eq!(walk(&root).count(), walk(&root).count());
        }

        #[test]
        fn test_deep_tree_does_not_overflow() {
            let root = MockNode::new("panel", "0");
            let mut tip = root.clone();
            for i in 1..2_000 {
                let next = MockNode::new("panel", &i.to_string());
                tip.add_child(next.clone());
                tip = next;
            }
            assert_eq!(walk(&root).count(), 2_000);
        }

        #[test]
        fn test_backend_failure_ends_walk() {
            let root = sample();
            root.child_at(0).unwrap().set_unreachable(true);
            let items: Vec<_> = walk(&root).collect();
            assert_eq!(items.len(), 2);
            assert!(items[0].is_ok());
            assert!(items[1].is_err());
        }
    }

    fn arb_tree() -> impl Strategy<Value = MockNode> {
        let leaf = "[a-z]{1,4}".prop_map(|n| MockNode::new("label", &n));
        leaf.prop_recursive(4, 40, 4, |inner| {
            ("[a-z]{1,4}", prop::collection::vec(inner, 0..4))
                .prop_map(|(n, kids)| MockNode::new("panel", &n).with_children(kids))
        })
    }

    fn count_nodes(node: &MockNode) -> usize {
        1 + crate::node::children(node)
            .unwrap()
            .iter()
            .map(count_nodes)
            .sum::<usize>()
    }

    proptest! {
        #[test]
        fn prop_walk_visits_every_node_once(tree in arb_tree()) {
            let visited: Vec<MockNode> = walk(&tree).map(|r| r.unwrap().1).collect();
            prop_assert_eq!(visited.len(), count_nodes(&tree));
            for (i, a) in visited.iter().enumerate() {
                for b in &visited[i + 1..] {
                    prop_assert!(a != b);
                }
            }
        }

        #[test]
        fn prop_paths_respect_index_bound(tree in arb_tree()) {
            for item in walk(&tree) {
                let (path, _) = item.unwrap();
                for seg in path.segments() {
                    prop_assert!(seg.index < seg.count);
                }
            }
        }
    }
}
