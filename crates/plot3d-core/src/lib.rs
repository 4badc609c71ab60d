//! Core abstractions for plot3d-rs.
//!
//! This crate holds the GPU-free half of the scene compositor:
//! - [`BoundsTracker`] for padded scene-bounds aggregation
//! - [`pack_pick_slots`] for first-fit pick-ID packing
//! - [`SelectionState`] for pointer-derived hit results
//! - [`CameraParams`] and the matrix derivations behind them
//! - Configuration options and the shared error type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod bounds;
pub mod camera;
pub mod error;
pub mod options;
pub mod pick;
pub mod selection;

pub use bounds::{pow10_ceil, Aabb, BoundsTracker};
pub use camera::{
    fit_model_matrix, perspective_projection, CameraController, CameraParams, StaticCamera,
};
pub use error::{PlotError, Result};
pub use options::SceneOptions;
pub use pick::{pack_pick_slots, PickLayout, SlotRange, PICK_SLOTS_PER_BUFFER};
pub use selection::{ObjectId, PickHit, PickSample, SelectionState};

// Re-export glam types for convenience
pub use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};
