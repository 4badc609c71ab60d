//! Rendering backend for plot3d-rs.
//!
//! This crate provides the wgpu-facing half of the scene compositor:
//! - [`GraphicsContext`] owning the device, queue, and frame target
//! - The [`Drawable`] / [`AxesOverlay`] / [`HighlightMarker`] draw
//!   contracts and the [`DrawContext`] handed to them
//! - [`PickBuffer`] / [`PickBufferSet`] for color-ID picking
//! - [`TransparencyPass`] for additive accumulation + composite

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod drawable;
pub mod engine;
pub mod error;
pub mod pick_buffer;
pub mod transparency;

pub use drawable::{AxesOverlay, CameraUniforms, DrawContext, DrawPhase, Drawable, HighlightMarker};
pub use engine::{FrameTarget, GraphicsContext};
pub use error::{RenderError, RenderResult};
pub use pick_buffer::{PickBuffer, PickBufferSet};
pub use transparency::TransparencyPass;

/// Depth attachment format shared by every pass in the compositor.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Pick buffer color format; exact 8-bit values carry the slot IDs.
pub const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Accumulation buffer format; needs to be blendable and to hold
/// alpha sums above 1.
pub const ACCUM_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Frame target format for headless contexts.
pub const HEADLESS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
