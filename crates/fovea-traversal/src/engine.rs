#![forbid(unsafe_code)]

//! Traversal engines and scope delegation.
//!
//! A [`TraversalEngine`] binds one algorithm to one scope root, or no
//! algorithm at all (observer engines only receive focus-change
//! notifications). [`FocusTraversal`] is the top-most engine for a window
//! root: it walks the focused node's ancestor chain looking for containers
//! with overriding engines, tries the innermost override first, rewrites
//! `Next` to `NextInLine` when an override scope is exhausted, and falls
//! back to the top-level algorithm — wrapping to the globally first/last
//! eligible node for tab traversal that found nothing.

use fovea_core::{NodeId, SceneTree};
use rustc_hash::FxHashMap;

use crate::context::TraversalContext;
use crate::direction::Direction;
use crate::order::DocumentOrder;
use crate::spatial::SpatialNav;

/// A pluggable traversal algorithm bound to a scope by a
/// [`TraversalContext`] per invocation.
pub trait Algorithm {
    /// The node that should receive focus when moving from `current` in
    /// `dir`, or `None` when no eligible target exists in this scope.
    fn select(
        &mut self,
        current: NodeId,
        dir: Direction,
        ctx: &TraversalContext<'_>,
    ) -> Option<NodeId>;

    /// The first eligible node of the scope, in document order.
    fn select_first(&mut self, ctx: &TraversalContext<'_>) -> Option<NodeId>;

    /// The last eligible node of the scope, in document order.
    fn select_last(&mut self, ctx: &TraversalContext<'_>) -> Option<NodeId>;
}

/// Which default algorithm a scope uses.
///
/// An explicit constructor input: hosts that want tab-order-only semantics
/// (e.g. embedded or form-like surfaces) opt in here instead of the engine
/// consulting any global platform state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraversalPolicy {
    /// 2D geometric navigation for arrows, document order for tabs.
    #[default]
    Directional,
    /// Document order for everything; arrows map onto the tab sequence.
    DocumentOrder,
}

impl TraversalPolicy {
    fn instantiate(self) -> Box<dyn Algorithm> {
        match self {
            Self::Directional => Box::new(SpatialNav::new()),
            Self::DocumentOrder => Box::new(DocumentOrder),
        }
    }
}

/// A focus change notification delivered to engine listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    /// The node that lost focus, if any.
    pub previous: Option<NodeId>,
    /// The node that gained focus, if any.
    pub current: Option<NodeId>,
}

type Listener = Box<dyn FnMut(&FocusEvent)>;

/// One algorithm bound to one scope root, plus focus-change listeners.
pub struct TraversalEngine {
    root: NodeId,
    algorithm: Option<Box<dyn Algorithm>>,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for TraversalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalEngine")
            .field("root", &self.root)
            .field("has_algorithm", &self.algorithm.is_some())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TraversalEngine {
    /// Engine with the default algorithm for `policy`.
    #[must_use]
    pub fn new(root: NodeId, policy: TraversalPolicy) -> Self {
        Self {
            root,
            algorithm: Some(policy.instantiate()),
            listeners: Vec::new(),
        }
    }

    /// Engine with a custom algorithm.
    #[must_use]
    pub fn with_algorithm(root: NodeId, algorithm: Box<dyn Algorithm>) -> Self {
        Self {
            root,
            algorithm: Some(algorithm),
            listeners: Vec::new(),
        }
    }

    /// Engine without an algorithm: it observes focus changes but never
    /// influences selection.
    #[must_use]
    pub fn observer(root: NodeId) -> Self {
        Self {
            root,
            algorithm: None,
            listeners: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether this engine can take part in target selection.
    #[inline]
    #[must_use]
    pub fn can_traverse(&self) -> bool {
        self.algorithm.is_some()
    }

    /// Register a focus-change listener.
    pub fn on_focus_change(&mut self, listener: impl FnMut(&FocusEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Deliver a focus-change notification to this engine's listeners.
    pub fn notify(&mut self, event: &FocusEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    /// Select within this engine's scope.
    pub fn select(&mut self, tree: &SceneTree, from: NodeId, dir: Direction) -> Option<NodeId> {
        let ctx = TraversalContext::new(tree, self.root);
        self.algorithm.as_mut()?.select(from, dir, &ctx)
    }

    /// First eligible node of this engine's scope.
    pub fn select_first(&mut self, tree: &SceneTree) -> Option<NodeId> {
        let ctx = TraversalContext::new(tree, self.root);
        self.algorithm.as_mut()?.select_first(&ctx)
    }

    /// Last eligible node of this engine's scope.
    pub fn select_last(&mut self, tree: &SceneTree) -> Option<NodeId> {
        let ctx = TraversalContext::new(tree, self.root);
        self.algorithm.as_mut()?.select_last(&ctx)
    }
}

/// The top-most traversal engine for a window root.
///
/// Owns the default engine and any per-container overriding engines keyed
/// by their container node.
#[derive(Debug)]
pub struct FocusTraversal {
    root: NodeId,
    default_engine: TraversalEngine,
    overrides: FxHashMap<NodeId, TraversalEngine>,
}

impl FocusTraversal {
    #[must_use]
    pub fn new(root: NodeId, policy: TraversalPolicy) -> Self {
        Self {
            root,
            default_engine: TraversalEngine::new(root, policy),
            overrides: FxHashMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Install an overriding engine for a container. Traversal requested
    /// from inside the container consults it before any outer scope.
    ///
    /// The engine is re-rooted at `container`.
    pub fn set_override(&mut self, container: NodeId, mut engine: TraversalEngine) {
        engine.root = container;
        self.overrides.insert(container, engine);
    }

    /// Remove a container's overriding engine.
    pub fn remove_override(&mut self, container: NodeId) -> Option<TraversalEngine> {
        self.overrides.remove(&container)
    }

    /// Register a listener on the top-level engine.
    pub fn on_focus_change(&mut self, listener: impl FnMut(&FocusEvent) + 'static) {
        self.default_engine.on_focus_change(listener);
    }

    /// Deliver a focus-change notification to every engine in this scope.
    pub fn notify(&mut self, event: &FocusEvent) {
        self.default_engine.notify(event);
        for engine in self.overrides.values_mut() {
            engine.notify(event);
        }
    }

    /// Compute the node that should receive focus when moving from
    /// `current` in `dir`. Returns `None` when focus should not change.
    ///
    /// A `current` that is not attached under the scope root (e.g. removed
    /// between focus and key event) short-circuits to `None`.
    pub fn compute_target(
        &mut self,
        tree: &SceneTree,
        current: NodeId,
        dir: Direction,
    ) -> Option<NodeId> {
        if !tree.contains(self.root, current) {
            #[cfg(feature = "tracing")]
            tracing::trace!(message = "traversal.detached", node = %current);
            return None;
        }

        // Innermost override scope first; climb on failure.
        let mut dir = dir;
        let mut scope = tree.parent(current);
        while let Some(container) = scope {
            if let Some(engine) = self.overrides.get_mut(&container) {
                if engine.can_traverse() {
                    if let Some(found) = engine.select(tree, current, dir) {
                        return Some(found);
                    }
                    // The override scope is exhausted: do not re-descend
                    // into it from the outer scope.
                    if dir == Direction::Next {
                        dir = Direction::NextInLine;
                    }
                }
            }
            if container == self.root {
                break;
            }
            scope = tree.parent(container);
        }

        if let Some(found) = self.default_engine.select(tree, current, dir) {
            return Some(found);
        }

        // Tab traversal wraps around the whole scope; arrows do not.
        match dir {
            Direction::Next | Direction::NextInLine => self.default_engine.select_first(tree),
            Direction::Previous => self.default_engine.select_last(tree),
            _ => None,
        }
    }

    /// First eligible node under the scope root.
    pub fn select_first(&mut self, tree: &SceneTree) -> Option<NodeId> {
        self.default_engine.select_first(tree)
    }

    /// Last eligible node under the scope root.
    pub fn select_last(&mut self, tree: &SceneTree) -> Option<NodeId> {
        self.default_engine.select_last(tree)
    }
}
