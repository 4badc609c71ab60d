//! The draw contracts consumed by the scene compositor.
//!
//! Concrete plot primitives (line, mesh, surface, scatter, ...) live
//! outside this workspace and plug in through [`Drawable`]. Optional
//! capabilities default to no-ops: a drawable that cannot be picked
//! simply leaves `pick_slots` at zero, a fully opaque one never sees
//! the transparent phase.

use plot3d_core::{Aabb, CameraParams, PickHit, PickSample};

/// GPU-ready layout of the per-frame camera matrices, for drawables
/// uploading [`CameraParams`] into a uniform buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    /// View matrix, column-major.
    pub view: [[f32; 4]; 4],
    /// Projection matrix, column-major.
    pub projection: [[f32; 4]; 4],
    /// Model matrix, column-major.
    pub model: [[f32; 4]; 4],
}

impl From<&CameraParams> for CameraUniforms {
    fn from(params: &CameraParams) -> Self {
        Self {
            view: params.view.to_cols_array_2d(),
            projection: params.projection.to_cols_array_2d(),
            model: params.model.to_cols_array_2d(),
        }
    }
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self::from(&CameraParams::default())
    }
}

/// Which pass of the frame a draw call belongs to.
///
/// The compositor configures the pass attachments; the drawable binds a
/// pipeline compatible with the phase:
///
/// - `Opaque`: surface-format color, no blending, depth write with
///   less-equal compare, no face culling (plot surfaces are two-sided).
/// - `Pick`: [`PICK_FORMAT`](crate::PICK_FORMAT) color carrying flat
///   IDs, no blending, depth write.
/// - `DepthOnly`: no color targets; opaque geometry re-rendered to
///   occlude transparent fragments.
/// - `Transparent`: [`ACCUM_FORMAT`](crate::ACCUM_FORMAT) color with
///   additive `ONE, ONE` blending, depth test on, depth write off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    /// Main opaque color pass.
    Opaque,
    /// Color-ID pick pass.
    Pick,
    /// Depth pre-pass for the transparency stage.
    DepthOnly,
    /// Additive accumulation of transparent fragments.
    Transparent,
}

/// Everything a drawable needs to record its draw calls for one pass.
pub struct DrawContext<'a> {
    /// The wgpu device.
    pub device: &'a wgpu::Device,
    /// The wgpu queue, for uniform uploads.
    pub queue: &'a wgpu::Queue,
    /// The open render pass to record into.
    pub pass: &'a mut wgpu::RenderPass<'static>,
    /// The phase this pass belongs to.
    pub phase: DrawPhase,
    /// This frame's shared camera matrices.
    pub params: &'a CameraParams,
    /// Current viewport size in pixels.
    pub viewport: (u32, u32),
}

/// A renderable object registered with a scene.
///
/// The scene owns registered drawables and drives them once per frame;
/// it queries their pick/draw state but never mutates it beyond the
/// operations below.
pub trait Drawable {
    /// Axis-aligned bounds in data space, if the object has any extent.
    fn bounds(&self) -> Option<Aabb> {
        None
    }

    /// Whether the object changed since the last completed frame.
    fn is_dirty(&self) -> bool {
        false
    }

    /// Clears the dirty flag; called at the end of every rendered frame.
    fn clear_dirty(&mut self) {}

    /// Number of pick IDs the object needs; zero opts out of picking.
    fn pick_slots(&self) -> u32 {
        0
    }

    /// Installs the first ID of the range allocated to this object.
    fn set_pick_base(&mut self, _base: u32) {}

    /// Whether the object renders in the opaque pass.
    fn is_opaque(&self) -> bool {
        true
    }

    /// Whether the object contributes to the transparent pass.
    fn is_transparent(&self) -> bool {
        false
    }

    /// Records draw calls for the opaque or depth-only phases.
    fn draw(&mut self, ctx: &mut DrawContext<'_>);

    /// Records draw calls for the pick phase.
    fn draw_pick(&mut self, _ctx: &mut DrawContext<'_>) {}

    /// Records draw calls for the transparent accumulation phase.
    fn draw_transparent(&mut self, _ctx: &mut DrawContext<'_>) {}

    /// Claims a pick hit whose ID falls in this object's range,
    /// decoding it into a sample; `None` disowns the hit.
    fn pick(&self, _hit: &PickHit) -> Option<PickSample> {
        None
    }

    /// Applies or clears the selection highlight.
    fn highlight(&mut self, _sample: Option<&PickSample>) {}

    /// Receives the current scene bounds every rendered frame.
    fn set_scene_bounds(&mut self, _bounds: &Aabb) {}

    /// Receives the clip box when the scene clips to its bounds.
    fn set_clip_bounds(&mut self, _bounds: &Aabb) {}

    /// Releases GPU resources. Called once, from the scene's disposal.
    fn dispose(&mut self) {}
}

/// The coordinate axes overlay drawn behind the data.
pub trait AxesOverlay {
    /// Whether the axes are drawn at all.
    fn enabled(&self) -> bool {
        true
    }

    /// Whether tick spacing is recomputed from the scene bounds.
    fn auto_ticks(&self) -> bool {
        true
    }

    /// Installs new bounds; `tick_spacing` is `Some` only when
    /// [`auto_ticks`](Self::auto_ticks) is on.
    fn update(&mut self, bounds: &Aabb, tick_spacing: Option<[f32; 3]>);

    /// Whether any part of the axes needs the transparent pass.
    fn is_transparent(&self) -> bool {
        false
    }

    /// Records the opaque draw calls.
    fn draw(&mut self, ctx: &mut DrawContext<'_>);

    /// Records the transparent draw calls.
    fn draw_transparent(&mut self, _ctx: &mut DrawContext<'_>) {}

    /// Releases GPU resources.
    fn dispose(&mut self) {}
}

/// The spike indicator marking the current selection.
pub trait HighlightMarker {
    /// Moves the marker to the highlighted position.
    fn set_position(&mut self, position: glam::Vec3);

    /// Installs the bounds the spikes extend to.
    fn set_bounds(&mut self, bounds: &Aabb);

    /// Records the draw calls.
    fn draw(&mut self, ctx: &mut DrawContext<'_>);

    /// Releases GPU resources.
    fn dispose(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn test_camera_uniforms_layout() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 3 * 64);
    }

    #[test]
    fn test_camera_uniforms_from_params() {
        let params = CameraParams {
            view: Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0)),
            projection: Mat4::IDENTITY,
            model: Mat4::from_scale(glam::Vec3::splat(0.5)),
        };
        let uniforms = CameraUniforms::from(&params);
        assert_eq!(uniforms.view[3][0], 1.0);
        assert_eq!(uniforms.model[0][0], 0.5);
        assert_eq!(uniforms.projection[0][0], 1.0);
    }
}
