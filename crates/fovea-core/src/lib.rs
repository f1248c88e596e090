#![forbid(unsafe_code)]

//! Core: scene-space geometry and the scene-tree node arena.

pub mod geometry;
pub mod scene;

pub use geometry::{Point, Rect};
pub use scene::{NodeFlags, NodeId, SceneError, SceneTree};
