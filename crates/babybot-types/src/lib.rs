//! Shared type definitions for the `BabyBot` grid-world planner.
//!
//! This crate is the vocabulary shared by the world model, the planner, and
//! the episode driver. It owns no behavior beyond small helpers on the types
//! themselves.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for object identities
//! - [`enums`] -- Colors, object kinds, and primitive actions
//! - [`geometry`] -- Grid positions, offsets, and compass directions
//! - [`objects`] -- World objects and object descriptors
//! - [`instruction`] -- Mission instruction trees
//! - [`view`] -- The read-only [`WorldView`] trait consumed by the planner

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod instruction;
pub mod objects;
pub mod view;

// Re-export all public types at crate root for convenience.
pub use enums::{Action, Color, ObjectKind};
pub use geometry::{Direction, GridPosition, Offset};
pub use ids::ObjectId;
pub use instruction::Instruction;
pub use objects::{ObjectDescriptor, WorldObject, carries_key_for, is_steppable};
pub use view::WorldView;
