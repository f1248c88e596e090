#![forbid(unsafe_code)]

//! Fovea public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use fovea_core as core;
    pub use fovea_traversal as traversal;

    pub use fovea_core::{NodeFlags, NodeId, Point, Rect, SceneTree};
    pub use fovea_traversal::{
        Direction, FocusManager, FocusTraversal, TraversalEngine, TraversalPolicy,
    };
}
