#![forbid(unsafe_code)]

//! Per-invocation traversal scope.
//!
//! A [`TraversalContext`] binds an algorithm invocation to a scope root in a
//! [`SceneTree`]. It enumerates the eligible targets under that root, maps
//! nodes to scene-space bounds, and offers escape hatches that re-run the
//! default algorithm on a sub-root. The escape hatches build fresh,
//! stateless algorithm instances, so a custom algorithm can delegate part of
//! its scope without disturbing the cache of the engine that invoked it.

use fovea_core::{NodeId, Rect, SceneTree};

use crate::direction::Direction;
use crate::engine::Algorithm;
use crate::order::DocumentOrder;
use crate::spatial::SpatialNav;

/// A scope-bound view of the scene used by traversal algorithms.
#[derive(Debug, Clone, Copy)]
pub struct TraversalContext<'a> {
    tree: &'a SceneTree,
    root: NodeId,
}

impl<'a> TraversalContext<'a> {
    /// Bind a context to `root`'s subtree.
    #[must_use]
    pub fn new(tree: &'a SceneTree, root: NodeId) -> Self {
        Self { tree, root }
    }

    /// The scope root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The underlying scene tree.
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &'a SceneTree {
        self.tree
    }

    /// All eligible focus targets under the scope root, in document order,
    /// excluding `exclude` (the node traversal starts from).
    #[must_use]
    pub fn targets(&self, exclude: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![self.root];
        while let Some(n) = pending.pop() {
            // Hidden or disabled containers bar their whole subtree.
            if !self.tree.is_tree_visible(n) || self.tree.is_disabled(n) {
                continue;
            }
            if n != exclude && self.tree.is_eligible(n) {
                out.push(n);
            }
            // Depth-first pre-order: push children in reverse.
            for child in self.tree.children(n).iter().rev() {
                pending.push(*child);
            }
        }
        out
    }

    /// Bounding box of a node in scene space. `None` for stale ids.
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.tree.bounds(id)
    }

    /// Run the default directional algorithm on a sub-root of this scope.
    ///
    /// Uses a fresh algorithm instance; the caller's traversal cache is
    /// never touched by the nested computation.
    #[must_use]
    pub fn select_in_subtree(
        &self,
        sub_root: NodeId,
        from: NodeId,
        dir: Direction,
    ) -> Option<NodeId> {
        if !self.tree.contains(self.root, sub_root) {
            return None;
        }
        let sub = TraversalContext::new(self.tree, sub_root);
        SpatialNav::new().select(from, dir, &sub)
    }

    /// First eligible node under a sub-root, in document order.
    #[must_use]
    pub fn select_first_in_subtree(&self, sub_root: NodeId) -> Option<NodeId> {
        if !self.tree.contains(self.root, sub_root) {
            return None;
        }
        let sub = TraversalContext::new(self.tree, sub_root);
        DocumentOrder.select_first(&sub)
    }

    /// Last eligible node under a sub-root, in document order.
    #[must_use]
    pub fn select_last_in_subtree(&self, sub_root: NodeId) -> Option<NodeId> {
        if !self.tree.contains(self.root, sub_root) {
            return None;
        }
        let sub = TraversalContext::new(self.tree, sub_root);
        DocumentOrder.select_last(&sub)
    }
}
