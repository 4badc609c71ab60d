//! plot3d-rs: a real-time 3D scene compositor for plot data.
//!
//! The scene owns the per-frame render loop, GPU color-ID picking,
//! dynamic scene-bounds tracking, and a two-pass opaque/transparent
//! compositing pipeline, all gated behind dirty flags so a static
//! scene costs nothing per tick.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use plot3d::{FrameLoop, LoopState, Scene, SceneOptions, TurntableCamera};
//!
//! # fn demo(window: Arc<winit::window::Window>, plot: Box<dyn plot3d::Drawable>) -> plot3d::Result<()> {
//! let camera = Box::new(TurntableCamera::default());
//! let mut scene = Scene::windowed(window, camera, SceneOptions::default())?;
//! scene.add(plot);
//!
//! let frame_loop = FrameLoop::for_scene(&scene);
//! // Inside the window's redraw handler:
//! if frame_loop.tick(&mut scene)? == LoopState::Continue {
//!     // window.request_redraw();
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! Drawable primitives (line/mesh/surface/scatter plots) are external:
//! they plug in through the [`Drawable`] capability contract and are
//! consumed only through `draw`/`pick`-style calls. The camera is
//! likewise consumed only as a [`CameraController`]. Everything GPU
//! lives in [`plot3d_render`]; everything pure in [`plot3d_core`].

mod frame_loop;
mod scene;
mod turntable;

pub use frame_loop::{FrameLoop, LoopState, StopHandle};
pub use scene::{FramePlan, Scene, BUTTON_PRIMARY};
pub use turntable::TurntableCamera;

// Re-export core types
pub use plot3d_core::{
    bounds::{Aabb, BoundsTracker},
    camera::{CameraController, CameraParams, StaticCamera},
    error::{PlotError, Result},
    options::SceneOptions,
    pick::{PickLayout, SlotRange, PICK_SLOTS_PER_BUFFER},
    selection::{ObjectId, PickHit, PickSample, SelectionState},
    Mat4, UVec2, Vec2, Vec3, Vec4,
};

// Re-export render types
pub use plot3d_render::{
    AxesOverlay, CameraUniforms, DrawContext, DrawPhase, Drawable, GraphicsContext,
    HighlightMarker, PickBuffer, PickBufferSet, RenderError, TransparencyPass, ACCUM_FORMAT,
    DEPTH_FORMAT, PICK_FORMAT,
};
