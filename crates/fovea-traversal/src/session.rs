#![forbid(unsafe_code)]

//! Directional traversal session cache.
//!
//! A continuous run of arrow-key moves forms a *session*. The session pins
//! an anchor node (the bounds the run started from) so that repeated moves
//! along one axis stay visually aligned to the starting column or row, and
//! records the visited nodes so that reversing direction retraces the exact
//! path instead of re-scoring.
//!
//! # Invariants
//!
//! 1. The session is cleared by any `Next`/`Previous` traversal.
//! 2. The session is cleared when focus moved by any means other than this
//!    engine's own directional selection (detected by comparing the incoming
//!    node against the last selected node).
//! 3. The history never exceeds [`HISTORY_LIMIT`] entries; the oldest entry
//!    is dropped first.

use std::collections::VecDeque;

use fovea_core::NodeId;

use crate::direction::Direction;

/// Upper bound on retrace history. Beyond this, a reversal falls back to
/// fresh geometric scoring, which is also what a cleared cache does.
pub const HISTORY_LIMIT: usize = 64;

/// Cache state for one continuous arrow-key navigation run.
#[derive(Debug, Clone, Default)]
pub struct TraversalSession {
    anchor: Option<NodeId>,
    anchor_direction: Option<Direction>,
    reversing: bool,
    history: VecDeque<NodeId>,
    last_selected: Option<NodeId>,
}

impl TraversalSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The anchor node whose bounds bias same-direction runs.
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    /// The direction that established the anchor.
    #[inline]
    #[must_use]
    pub fn anchor_direction(&self) -> Option<Direction> {
        self.anchor_direction
    }

    /// Whether the most recent [`advance`](Self::advance) detected a
    /// reversal (opposite axis sense with retraceable history).
    #[inline]
    #[must_use]
    pub fn is_reversing(&self) -> bool {
        self.reversing
    }

    /// The node selected by the previous directional move, if any.
    #[inline]
    #[must_use]
    pub fn last_selected(&self) -> Option<NodeId> {
        self.last_selected
    }

    #[inline]
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drop all session state.
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Transition the session for a move from `current` in `dir`.
    ///
    /// Returns `true` when the move reverses the anchor direction and a
    /// retrace is possible. `Next`/`Previous` invalidate the session and
    /// never retrace.
    pub fn advance(&mut self, current: NodeId, dir: Direction) -> bool {
        // Focus moved without us: the recorded path no longer applies.
        if !self.history.is_empty() && self.last_selected != Some(current) {
            self.history.clear();
        }

        if !dir.is_directional() {
            self.invalidate();
            return false;
        }

        if self.anchor.is_some() && self.anchor_direction == Some(dir) {
            // Same direction as the run: keep the anchor.
            self.reversing = false;
        } else if self.anchor_direction.map(Direction::opposite) == Some(dir)
            && !self.history.is_empty()
        {
            self.reversing = true;
        } else {
            self.reanchor(current, dir);
        }
        self.reversing
    }

    /// Restart the session with `current` as the anchor.
    pub fn reanchor(&mut self, current: NodeId, dir: Direction) {
        self.anchor = Some(current);
        self.anchor_direction = Some(dir);
        self.reversing = false;
        self.history.clear();
    }

    /// Record a completed move from `from` to `to`.
    ///
    /// When reversing, the path is being consumed rather than extended, so
    /// only the selection marker is updated.
    pub fn record(&mut self, from: NodeId, to: NodeId) {
        if !self.reversing {
            if self.history.len() == HISTORY_LIMIT {
                self.history.pop_front();
            }
            self.history.push_back(from);
        }
        self.last_selected = Some(to);
    }

    /// The node a reversal would retrace to, without consuming it.
    #[must_use]
    pub fn peek_retrace(&self) -> Option<NodeId> {
        self.history.back().copied()
    }

    /// Consume the top of the retrace path.
    pub fn pop_retrace(&mut self) -> Option<NodeId> {
        self.history.pop_back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(tree: &mut fovea_core::SceneTree) -> NodeId {
        tree.insert(None, fovea_core::Rect::default(), fovea_core::NodeFlags::TRAVERSABLE)
            .unwrap()
    }

    fn ids(n: usize) -> Vec<NodeId> {
        let mut tree = fovea_core::SceneTree::new();
        (0..n).map(|_| id(&mut tree)).collect()
    }

    #[test]
    fn first_move_sets_anchor() {
        let n = ids(1);
        let mut s = TraversalSession::new();
        assert!(!s.advance(n[0], Direction::Down));
        assert_eq!(s.anchor(), Some(n[0]));
        assert_eq!(s.anchor_direction(), Some(Direction::Down));
    }

    #[test]
    fn same_direction_keeps_anchor() {
        let n = ids(2);
        let mut s = TraversalSession::new();
        s.advance(n[0], Direction::Down);
        s.record(n[0], n[1]);
        assert!(!s.advance(n[1], Direction::Down));
        assert_eq!(s.anchor(), Some(n[0]));
    }

    #[test]
    fn opposite_direction_with_history_reverses() {
        let n = ids(2);
        let mut s = TraversalSession::new();
        s.advance(n[0], Direction::Down);
        s.record(n[0], n[1]);
        assert!(s.advance(n[1], Direction::Up));
        assert!(s.is_reversing());
        assert_eq!(s.peek_retrace(), Some(n[0]));
    }

    #[test]
    fn opposite_direction_without_history_reanchors() {
        let n = ids(1);
        let mut s = TraversalSession::new();
        s.advance(n[0], Direction::Down);
        // No record() — nothing to retrace.
        assert!(!s.advance(n[0], Direction::Up));
        assert_eq!(s.anchor_direction(), Some(Direction::Up));
    }

    #[test]
    fn perpendicular_direction_reanchors() {
        let n = ids(2);
        let mut s = TraversalSession::new();
        s.advance(n[0], Direction::Down);
        s.record(n[0], n[1]);
        assert!(!s.advance(n[1], Direction::Right));
        assert_eq!(s.anchor(), Some(n[1]));
        assert_eq!(s.anchor_direction(), Some(Direction::Right));
        assert_eq!(s.history_len(), 0);
    }

    #[test]
    fn tab_invalidates() {
        let n = ids(2);
        let mut s = TraversalSession::new();
        s.advance(n[0], Direction::Down);
        s.record(n[0], n[1]);
        assert!(!s.advance(n[1], Direction::Next));
        assert_eq!(s.anchor(), None);
        assert_eq!(s.history_len(), 0);
        assert_eq!(s.last_selected(), None);
    }

    #[test]
    fn external_focus_change_clears_history() {
        let n = ids(3);
        let mut s = TraversalSession::new();
        s.advance(n[0], Direction::Down);
        s.record(n[0], n[1]);
        // Next move arrives from n[2], not from the node we selected.
        s.advance(n[2], Direction::Down);
        assert_eq!(s.history_len(), 0);
        assert!(!s.is_reversing());
    }

    #[test]
    fn history_is_bounded() {
        let n = ids(HISTORY_LIMIT + 10);
        let mut s = TraversalSession::new();
        s.advance(n[0], Direction::Down);
        for w in n.windows(2) {
            s.record(w[0], w[1]);
            s.advance(w[1], Direction::Down);
        }
        assert_eq!(s.history_len(), HISTORY_LIMIT);
        // The most recent entry is still on top.
        assert_eq!(s.peek_retrace(), Some(n[n.len() - 2]));
    }
}
