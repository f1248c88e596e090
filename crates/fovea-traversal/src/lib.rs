#![forbid(unsafe_code)]

//! Focus traversal: document-order and directional (2D) navigation engines.
//!
//! The core contract is [`FocusTraversal::compute_target`]: given the
//! focused node and a [`Direction`], return the node that should receive
//! focus next, or `None` for "no focus change". [`FocusManager`] wraps that
//! with focus application and change notifications.
//!
//! Traversal is synchronous and allocation-light: one selection call scans
//! the eligible nodes of the active scope once. The only mutable state is
//! the directional algorithm's [`TraversalSession`] cache, exclusively
//! owned by its engine.

pub mod context;
pub mod direction;
pub mod engine;
pub mod manager;
pub mod metrics;
pub mod order;
pub mod session;
pub mod spatial;

pub use context::TraversalContext;
pub use direction::Direction;
pub use engine::{Algorithm, FocusEvent, FocusTraversal, TraversalEngine, TraversalPolicy};
pub use manager::FocusManager;
pub use order::DocumentOrder;
pub use session::TraversalSession;
pub use spatial::SpatialNav;
