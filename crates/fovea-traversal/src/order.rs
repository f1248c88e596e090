#![forbid(unsafe_code)]

//! Document-order (tab-order) traversal.
//!
//! Walks the containment tree in depth-first pre-order. `Next` starts from
//! the siblings *after* the current node (never descending back into the
//! current node's own subtree), climbing to ancestor scopes as sibling lists
//! run out, and wraps around to the start of the scope when the root is
//! reached without a hit. `Previous` is the exact reverse sequence, with one
//! intentional asymmetry: when no eligible preceding sibling exists, the
//! containing parent itself is returned if it is traversable, mimicking
//! conventional tab-order semantics where backing out of a container lands
//! on the container.

use fovea_core::{NodeId, SceneTree};

use crate::context::TraversalContext;
use crate::direction::Direction;
use crate::engine::Algorithm;

/// The tab-order algorithm. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentOrder;

impl Algorithm for DocumentOrder {
    fn select(
        &mut self,
        current: NodeId,
        dir: Direction,
        ctx: &TraversalContext<'_>,
    ) -> Option<NodeId> {
        // Arrow keys on a document-order scope step through the same
        // sequence: Down/Right advance, Up/Left back up.
        if dir.is_forward() {
            next_from(ctx, current)
        } else {
            previous_from(ctx, current)
        }
    }

    fn select_first(&mut self, ctx: &TraversalContext<'_>) -> Option<NodeId> {
        let tree = ctx.tree();
        let root = ctx.root();
        if tree.is_disabled(root) || !tree.is_tree_visible(root) {
            return None;
        }
        if tree.is_eligible(root) {
            return Some(root);
        }
        find_next_in_list(tree, tree.children(root))
    }

    fn select_last(&mut self, ctx: &TraversalContext<'_>) -> Option<NodeId> {
        let tree = ctx.tree();
        let root = ctx.root();
        if tree.is_disabled(root) || !tree.is_tree_visible(root) {
            return None;
        }
        find_previous_in_list(tree, tree.children(root))
            .or_else(|| tree.is_eligible(root).then_some(root))
    }
}

/// Forward step: following siblings, then ancestors' following siblings,
/// then wrap to the start of the scope.
fn next_from(ctx: &TraversalContext<'_>, current: NodeId) -> Option<NodeId> {
    let tree = ctx.tree();
    let mut start = current;
    let mut found = None;
    while found.is_none() && start != ctx.root() {
        let Some(parent) = tree.parent(start) else {
            break;
        };
        let peers = tree.children(parent);
        let idx = peers.iter().position(|p| *p == start)?;
        found = find_next_in_list(tree, &peers[idx + 1..]);
        start = parent;
    }
    if found.is_none() {
        found = find_next_in_list(tree, tree.children(ctx.root()));
    }
    found
}

/// Backward step: preceding siblings in reverse pre-order, the parent
/// itself when its subtree is exhausted, then wrap to the end of the scope.
fn previous_from(ctx: &TraversalContext<'_>, current: NodeId) -> Option<NodeId> {
    let tree = ctx.tree();
    let mut start = current;
    let mut found = None;
    while found.is_none() && start != ctx.root() {
        let Some(parent) = tree.parent(start) else {
            break;
        };
        let peers = tree.children(parent);
        let idx = peers.iter().position(|p| *p == start)?;
        found = find_previous_in_list(tree, &peers[..idx]);
        if found.is_none() && tree.is_eligible(parent) {
            found = Some(parent);
        }
        start = parent;
    }
    if found.is_none() {
        found = find_previous_in_list(tree, tree.children(ctx.root()));
    }
    found
}

/// First eligible node in `list` (or inside a container in `list`), in
/// document order. Disabled or invisible nodes bar their whole subtree.
fn find_next_in_list(tree: &SceneTree, list: &[NodeId]) -> Option<NodeId> {
    for &n in list {
        if tree.is_disabled(n) || !tree.is_tree_visible(n) {
            continue;
        }
        if tree.is_focus_traversable(n) {
            return Some(n);
        }
        if let Some(found) = find_next_in_list(tree, tree.children(n)) {
            return Some(found);
        }
    }
    None
}

/// Last eligible node in `list`, scanning in reverse document order:
/// deepest-last descendants are visited before their containers.
fn find_previous_in_list(tree: &SceneTree, list: &[NodeId]) -> Option<NodeId> {
    for &n in list.iter().rev() {
        if tree.is_disabled(n) || !tree.is_tree_visible(n) {
            continue;
        }
        if let Some(found) = find_previous_in_list(tree, tree.children(n)) {
            return Some(found);
        }
        if tree.is_focus_traversable(n) {
            return Some(n);
        }
    }
    None
}
