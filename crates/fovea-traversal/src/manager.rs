#![forbid(unsafe_code)]

//! Focus application.
//!
//! [`FocusManager`] is the thin side-effecting shell around
//! [`FocusTraversal`]: it tracks the focus owner, flips the `FOCUSED` flag
//! on the scene tree when a traversal selects a target, and delivers
//! [`FocusEvent`] notifications to every engine in scope. All selection
//! logic lives in the engines; the manager never second-guesses a result.

use fovea_core::{NodeFlags, NodeId, SceneTree};

use crate::direction::Direction;
use crate::engine::{FocusEvent, FocusTraversal, TraversalPolicy};

/// Tracks and applies keyboard focus for one window root.
#[derive(Debug)]
pub struct FocusManager {
    traversal: FocusTraversal,
    focused: Option<NodeId>,
}

impl FocusManager {
    #[must_use]
    pub fn new(root: NodeId, policy: TraversalPolicy) -> Self {
        Self {
            traversal: FocusTraversal::new(root, policy),
            focused: None,
        }
    }

    /// The current focus owner.
    #[inline]
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// The traversal engine stack, e.g. to install per-container overrides.
    #[must_use]
    pub fn traversal_mut(&mut self) -> &mut FocusTraversal {
        &mut self.traversal
    }

    /// Move focus in `dir` from the current owner. Returns the new owner,
    /// or `None` when focus did not change (callers treat that as a no-op,
    /// never as an error).
    pub fn traverse(&mut self, tree: &mut SceneTree, dir: Direction) -> Option<NodeId> {
        let current = self.focused?;
        let target = self.traversal.compute_target(tree, current, dir)?;
        self.apply(tree, Some(target));
        Some(target)
    }

    /// Give focus to a specific node, e.g. from a pointer press. Returns
    /// `false` when the node is not an eligible focus target.
    ///
    /// Focus changes entering through here (rather than through
    /// [`traverse`](Self::traverse)) start a fresh directional run: the
    /// directional algorithm notices the unexpected focus owner on its next
    /// selection and drops its cache.
    pub fn set_focus(&mut self, tree: &mut SceneTree, id: NodeId) -> bool {
        if !tree.is_eligible(id) {
            return false;
        }
        if self.focused != Some(id) {
            self.apply(tree, Some(id));
        }
        true
    }

    /// Drop focus entirely.
    pub fn clear_focus(&mut self, tree: &mut SceneTree) {
        if self.focused.is_some() {
            self.apply(tree, None);
        }
    }

    /// Focus the first eligible node under the root (initial placement).
    pub fn focus_first(&mut self, tree: &mut SceneTree) -> Option<NodeId> {
        let target = self.traversal.select_first(tree)?;
        self.apply(tree, Some(target));
        Some(target)
    }

    /// Focus the last eligible node under the root.
    pub fn focus_last(&mut self, tree: &mut SceneTree) -> Option<NodeId> {
        let target = self.traversal.select_last(tree)?;
        self.apply(tree, Some(target));
        Some(target)
    }

    fn apply(&mut self, tree: &mut SceneTree, target: Option<NodeId>) {
        let previous = self.focused;
        if let Some(old) = previous {
            // The old owner may have left the tree; nothing to un-mark then.
            let _ = tree.set_flag(old, NodeFlags::FOCUSED, false);
        }
        if let Some(new) = target {
            let _ = tree.set_flag(new, NodeFlags::FOCUSED, true);
        }
        self.focused = target;
        let event = FocusEvent {
            previous,
            current: target,
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(message = "focus.change", previous = ?previous, current = ?target);
        self.traversal.notify(&event);
    }
}
