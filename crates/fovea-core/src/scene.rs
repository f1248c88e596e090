#![forbid(unsafe_code)]

//! Scene-tree node arena.
//!
//! # Design
//!
//! [`SceneTree`] is an arena of nodes addressed by copyable [`NodeId`]
//! handles. Each node carries the attributes the traversal layer consumes: a
//! containment parent, an ordered child list, a [`NodeFlags`] set, and a
//! bounding box in scene space. The traversal algorithms only ever *read*
//! these attributes; mutation happens at the toolkit edge (layout, input).
//!
//! # Invariants
//!
//! 1. A live node's parent link and the parent's child list agree.
//! 2. Child order is insertion order and is the document order used by
//!    tab traversal.
//! 3. A removed node's id is never reused; stale ids degrade gracefully:
//!    every predicate returns `false`, every lookup returns `None`.
//!
//! # Failure Modes
//!
//! - **Stale id passed to a mutator**: returns [`SceneError::StaleNode`],
//!   the tree is unchanged.
//! - **Reparenting under a descendant**: returns [`SceneError::WouldCycle`]
//!   (the containment graph must stay a forest).

use bitflags::bitflags;

use crate::geometry::Rect;

bitflags! {
    /// Per-node attribute flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// Eligible to receive keyboard focus via traversal.
        const TRAVERSABLE = 1 << 0;
        /// Disabled nodes (and their subtrees) are skipped by traversal.
        const DISABLED = 1 << 1;
        /// Hidden nodes (and their subtrees) are skipped by traversal.
        const HIDDEN = 1 << 2;
        /// Currently holds keyboard focus. Managed by the focus layer.
        const FOCUSED = 1 << 3;
    }
}

/// Handle to a node in a [`SceneTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Error returned by [`SceneTree`] mutators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The id refers to a node that was removed (or never existed).
    StaleNode(NodeId),
    /// The operation would make a node an ancestor of itself.
    WouldCycle,
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "stale node id {id}"),
            Self::WouldCycle => write!(f, "operation would create a containment cycle"),
        }
    }
}

impl std::error::Error for SceneError {}

#[derive(Debug, Clone)]
struct Slot {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    flags: NodeFlags,
    bounds: Rect,
    alive: bool,
}

/// Arena-owned containment tree.
#[derive(Debug, Clone, Default)]
pub struct SceneTree {
    slots: Vec<Slot>,
}

impl SceneTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.alive).count()
    }

    /// Whether the tree holds no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| !s.alive)
    }

    /// Insert a node. `parent = None` makes it a root.
    ///
    /// The node is appended to its parent's child list, i.e. it comes last
    /// in document order among its siblings.
    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        bounds: Rect,
        flags: NodeFlags,
    ) -> Result<NodeId, SceneError> {
        if let Some(p) = parent {
            self.slot(p).ok_or(SceneError::StaleNode(p))?;
        }
        let id = NodeId(u32::try_from(self.slots.len()).expect("scene tree exceeds u32 ids"));
        self.slots.push(Slot {
            parent,
            children: Vec::new(),
            flags,
            bounds,
            alive: true,
        });
        if let Some(p) = parent {
            self.slots[p.index()].children.push(id);
        }
        Ok(id)
    }

    /// Detach `id` and its whole subtree. Stale afterwards.
    pub fn remove(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.slot(id).ok_or(SceneError::StaleNode(id))?;
        if let Some(p) = self.slots[id.index()].parent {
            self.slots[p.index()].children.retain(|c| *c != id);
        }
        let mut pending = vec![id];
        while let Some(n) = pending.pop() {
            let slot = &mut self.slots[n.index()];
            slot.alive = false;
            slot.parent = None;
            pending.extend(std::mem::take(&mut slot.children));
        }
        Ok(())
    }

    /// Move `id` under a new parent (appended to its child list).
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        self.slot(id).ok_or(SceneError::StaleNode(id))?;
        self.slot(new_parent).ok_or(SceneError::StaleNode(new_parent))?;
        if id == new_parent || self.is_ancestor_of(id, new_parent) {
            return Err(SceneError::WouldCycle);
        }
        if let Some(p) = self.slots[id.index()].parent {
            self.slots[p.index()].children.retain(|c| *c != id);
        }
        self.slots[id.index()].parent = Some(new_parent);
        self.slots[new_parent.index()].children.push(id);
        Ok(())
    }

    /// Containment parent, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id)?.parent
    }

    /// Ordered child list. Empty for leaves and stale ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map_or(&[], |s| s.children.as_slice())
    }

    /// Bounding box in scene space. `None` for stale ids.
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.slot(id).map(|s| s.bounds)
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) -> Result<(), SceneError> {
        self.slot(id).ok_or(SceneError::StaleNode(id))?;
        self.slots[id.index()].bounds = bounds;
        Ok(())
    }

    /// Current flag set. Empty for stale ids.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.slot(id).map_or(NodeFlags::empty(), |s| s.flags)
    }

    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) -> Result<(), SceneError> {
        self.slot(id).ok_or(SceneError::StaleNode(id))?;
        self.slots[id.index()].flags = flags;
        Ok(())
    }

    /// Set or clear a single flag.
    pub fn set_flag(&mut self, id: NodeId, flag: NodeFlags, on: bool) -> Result<(), SceneError> {
        self.slot(id).ok_or(SceneError::StaleNode(id))?;
        self.slots[id.index()].flags.set(flag, on);
        Ok(())
    }

    /// Whether the node may receive focus via traversal.
    #[must_use]
    pub fn is_focus_traversable(&self, id: NodeId) -> bool {
        self.flags(id).contains(NodeFlags::TRAVERSABLE)
    }

    #[must_use]
    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.flags(id).contains(NodeFlags::DISABLED)
    }

    #[must_use]
    pub fn is_focused(&self, id: NodeId) -> bool {
        self.flags(id).contains(NodeFlags::FOCUSED)
    }

    /// Visible in the tree: neither the node nor any ancestor is hidden.
    #[must_use]
    pub fn is_tree_visible(&self, id: NodeId) -> bool {
        let Some(slot) = self.slot(id) else {
            return false;
        };
        if slot.flags.contains(NodeFlags::HIDDEN) {
            return false;
        }
        let mut up = slot.parent;
        while let Some(p) = up {
            let Some(pslot) = self.slot(p) else {
                return false;
            };
            if pslot.flags.contains(NodeFlags::HIDDEN) {
                return false;
            }
            up = pslot.parent;
        }
        true
    }

    /// The traversal eligibility predicate: traversable, enabled, visible.
    #[must_use]
    pub fn is_eligible(&self, id: NodeId) -> bool {
        self.is_focus_traversable(id) && !self.is_disabled(id) && self.is_tree_visible(id)
    }

    /// Whether `id` is `root` or a descendant of `root`.
    #[must_use]
    pub fn contains(&self, root: NodeId, id: NodeId) -> bool {
        if self.slot(id).is_none() || self.slot(root).is_none() {
            return false;
        }
        let mut cursor = Some(id);
        while let Some(n) = cursor {
            if n == root {
                return true;
            }
            cursor = self.parent(n);
        }
        false
    }

    fn is_ancestor_of(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut cursor = self.parent(node);
        while let Some(n) = cursor {
            if n == candidate {
                return true;
            }
            cursor = self.parent(n);
        }
        false
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.index()).filter(|s| s.alive)
    }
}
