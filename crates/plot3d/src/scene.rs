//! The scene manager: object lifecycle, per-frame orchestration, and
//! pointer-driven selection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Vec2;

use plot3d_core::{
    fit_model_matrix, pack_pick_slots, perspective_projection, Aabb, BoundsTracker,
    CameraController, CameraParams, ObjectId, PlotError, Result, SceneOptions, SelectionState,
};
use plot3d_render::{
    AxesOverlay, DrawContext, DrawPhase, Drawable, FrameTarget, GraphicsContext, HighlightMarker,
    PickBufferSet, TransparencyPass,
};

/// Bitmask of the primary pointer button in `handle_pointer`.
pub const BUTTON_PRIMARY: u32 = 1;

type SelectionCallback = Box<dyn FnMut(&SelectionState)>;
type RenderCallback = Box<dyn FnMut()>;

/// What one frame tick has to render, derived from the dirty flags.
///
/// Deriving this is pure so the redraw-avoidance contract is testable:
/// a clean scene plans no GPU work at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    /// Re-render the pick buffers (scene content changed).
    pub render_pick: bool,
    /// Re-render the visible frame.
    pub render_scene: bool,
}

impl FramePlan {
    /// Plans a frame from the scene dirty flag and the pointer-driven
    /// selection-changed flag. A selection change alone redraws the
    /// frame (the highlight moved) but not the pick buffers.
    #[must_use]
    pub fn plan(dirty: bool, selection_changed: bool) -> Self {
        Self {
            render_pick: dirty,
            render_scene: dirty || selection_changed,
        }
    }
}

struct SceneObject {
    id: ObjectId,
    drawable: Box<dyn Drawable>,
}

/// A 3D plot scene: owns the object list, the GPU resources behind
/// picking and transparency, and the per-frame render orchestration.
pub struct Scene {
    gfx: GraphicsContext,
    options: SceneOptions,
    camera: Box<dyn CameraController>,
    axes: Option<Box<dyn AxesOverlay>>,
    marker: Option<Box<dyn HighlightMarker>>,
    objects: Vec<SceneObject>,
    next_object_id: u64,
    pick_buffers: PickBufferSet,
    transparency: TransparencyPass,
    bounds: BoundsTracker,
    selection: SelectionState,
    params: CameraParams,
    dirty: bool,
    selection_changed: bool,
    prev_buttons: u32,
    stop: Arc<AtomicBool>,
    disposed: bool,
    on_select: Option<SelectionCallback>,
    on_click: Option<SelectionCallback>,
    on_render: Option<RenderCallback>,
}

impl Scene {
    /// Creates a scene over an already-acquired graphics context.
    #[must_use]
    pub fn new(
        gfx: GraphicsContext,
        camera: Box<dyn CameraController>,
        options: SceneOptions,
    ) -> Self {
        let (width, height) = gfx.dimensions();
        let transparency = TransparencyPass::new(&gfx.device, gfx.surface_format(), width, height);
        Self {
            transparency,
            bounds: BoundsTracker::new(options.bounds),
            options,
            camera,
            axes: None,
            marker: None,
            objects: Vec::new(),
            next_object_id: 1,
            pick_buffers: PickBufferSet::new(),
            selection: SelectionState::default(),
            params: CameraParams::default(),
            dirty: true,
            selection_changed: false,
            prev_buttons: 0,
            stop: Arc::new(AtomicBool::new(false)),
            disposed: false,
            on_select: None,
            on_click: None,
            on_render: None,
            gfx,
        }
    }

    /// Creates a scene rendering to a window. Fatal when the graphics
    /// context cannot be acquired.
    pub fn windowed(
        window: Arc<winit::window::Window>,
        camera: Box<dyn CameraController>,
        options: SceneOptions,
    ) -> Result<Self> {
        let _ = env_logger::try_init();
        let gfx = pollster::block_on(GraphicsContext::new_windowed(window))?;
        Ok(Self::new(gfx, camera, options))
    }

    /// Creates a scene rendering offscreen.
    pub fn headless(
        width: u32,
        height: u32,
        camera: Box<dyn CameraController>,
        options: SceneOptions,
    ) -> Result<Self> {
        let _ = env_logger::try_init();
        let gfx = pollster::block_on(GraphicsContext::new_headless(width, height))?;
        Ok(Self::new(gfx, camera, options))
    }

    /// Installs the axes overlay.
    pub fn set_axes(&mut self, axes: Box<dyn AxesOverlay>) {
        self.axes = Some(axes);
        self.dirty = true;
    }

    /// Installs the selection highlight marker.
    pub fn set_highlight_marker(&mut self, marker: Box<dyn HighlightMarker>) {
        self.marker = Some(marker);
    }

    /// Registers a selection-change callback.
    pub fn on_select(&mut self, callback: impl FnMut(&SelectionState) + 'static) {
        self.on_select = Some(Box::new(callback));
    }

    /// Registers a click callback.
    pub fn on_click(&mut self, callback: impl FnMut(&SelectionState) + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    /// Registers a callback fired after every rendered frame.
    pub fn on_render(&mut self, callback: impl FnMut() + 'static) {
        self.on_render = Some(Box::new(callback));
    }

    /// The current hit-test result.
    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// The current (padded) scene bounds.
    #[must_use]
    pub fn bounds(&self) -> &Aabb {
        self.bounds.bounds()
    }

    /// The camera controller.
    #[must_use]
    pub fn camera(&self) -> &dyn CameraController {
        self.camera.as_ref()
    }

    /// Mutable access to the camera controller, for input forwarding.
    pub fn camera_mut(&mut self) -> &mut dyn CameraController {
        self.camera.as_mut()
    }

    /// The matrices used by the most recent frame.
    #[must_use]
    pub fn camera_params(&self) -> &CameraParams {
        &self.params
    }

    /// The scene configuration.
    #[must_use]
    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    /// Number of registered objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Slots assigned to each pick buffer, in buffer order.
    #[must_use]
    pub fn pick_buffer_loads(&self) -> &[u32] {
        self.pick_buffers.loads()
    }

    /// Whether `dispose` has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// A handle that halts the frame loop when triggered.
    #[must_use]
    pub fn stop_handle(&self) -> crate::frame_loop::StopHandle {
        crate::frame_loop::StopHandle::new(Arc::clone(&self.stop))
    }

    pub(crate) fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Registers a drawable with the scene, which takes ownership, and
    /// repacks the pick buffers.
    pub fn add(&mut self, drawable: Box<dyn Drawable>) -> ObjectId {
        let id = ObjectId::from_raw(self.next_object_id);
        self.next_object_id += 1;
        self.objects.push(SceneObject { id, drawable });
        self.realloc_pick_buffers();
        id
    }

    /// Removes a drawable, handing ownership back. The pick buffers
    /// are repacked; removing then re-adding identical objects yields
    /// the identical layout.
    pub fn remove(&mut self, id: ObjectId) -> Option<Box<dyn Drawable>> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        let removed = self.objects.remove(index);
        if self.selection.object == Some(id) {
            let mouse = self.selection.mouse;
            self.selection.begin_query(mouse);
            self.selection_changed = true;
        }
        self.realloc_pick_buffers();
        Some(removed.drawable)
    }

    /// Releases every GPU resource and halts the frame loop. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.stop.store(true, Ordering::Relaxed);
        if let Some(mut axes) = self.axes.take() {
            axes.dispose();
        }
        if let Some(mut marker) = self.marker.take() {
            marker.dispose();
        }
        for obj in &mut self.objects {
            obj.drawable.dispose();
        }
        self.objects.clear();
        self.pick_buffers.dispose();
        self.transparency.dispose();
        log::info!("scene disposed");
    }

    /// Resizes the viewport and every dependent GPU target.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gfx.resize(width, height);
        let (width, height) = self.gfx.dimensions();
        self.transparency.resize(&self.gfx.device, width, height);
        let (pw, ph) = self.pick_dimensions();
        self.pick_buffers.ensure_size(&self.gfx.device, pw, ph);
        self.dirty = true;
    }

    /// Window-resize entry point; honors the `auto_resize` option.
    pub fn handle_window_resize(&mut self, width: u32, height: u32) {
        if self.options.auto_resize {
            self.resize(width, height);
        }
    }

    /// Renders one frame if anything changed since the last one.
    ///
    /// The whole tick is skipped, with zero graphics calls, when the
    /// camera is still, no object is dirty, the bounds did not move,
    /// and no pointer event altered the selection.
    pub fn frame(&mut self) -> Result<()> {
        if self.disposed {
            return Err(PlotError::SceneDisposed);
        }

        // Flags are re-read every tick; pointer events may have fired
        // since the previous one.
        if self.camera.tick() {
            self.dirty = true;
        }
        if self.objects.iter().any(|o| o.drawable.is_dirty()) {
            self.dirty = true;
        }

        if self.options.auto_bounds {
            let changed = self
                .bounds
                .update(self.objects.iter().map(|o| o.drawable.bounds()));
            if changed {
                if let Some(axes) = self.axes.as_mut() {
                    let spacing = if axes.auto_ticks() {
                        Some(self.bounds.tick_spacing())
                    } else {
                        None
                    };
                    axes.update(self.bounds.bounds(), spacing);
                }
                self.dirty = true;
            }
        }

        let (width, height) = self.gfx.dimensions();
        self.params = CameraParams {
            view: self.camera.view(),
            projection: perspective_projection(
                self.options.fovy,
                width as f32 / height as f32,
                self.options.z_near,
                self.options.z_far,
            ),
            model: fit_model_matrix(
                self.bounds.bounds(),
                self.options.auto_scale,
                self.options.auto_center,
            ),
        };

        let plan = FramePlan::plan(self.dirty, self.selection_changed);
        if !plan.render_scene {
            return Ok(());
        }

        let scene_bounds = *self.bounds.bounds();
        for obj in &mut self.objects {
            obj.drawable.set_scene_bounds(&scene_bounds);
            if self.options.clip_to_bounds {
                obj.drawable.set_clip_bounds(&scene_bounds);
            }
        }

        if plan.render_pick {
            self.render_pick_pass();
        }
        self.render_scene_pass()?;

        self.dirty = false;
        self.selection_changed = false;
        for obj in &mut self.objects {
            obj.drawable.clear_dirty();
        }
        if let Some(callback) = self.on_render.as_mut() {
            callback();
        }
        Ok(())
    }

    /// Feeds a pointer event into the hit-test machinery.
    ///
    /// Runs outside the frame cadence: `x`/`y` are viewport pixels with
    /// the origin at the top-left, `buttons` is a bitmask (bit 0 =
    /// primary). Selection changes mark the scene for redraw and fire
    /// the registered callbacks.
    pub fn handle_pointer(&mut self, x: f32, y: f32, buttons: u32) {
        if self.disposed {
            return;
        }
        let prev_object = self.selection.object;
        self.selection.begin_query(Vec2::new(x, y));

        let ratio = self.options.pixel_ratio.max(1.0);
        let radius = self.options.pick_radius / ratio;
        let mut accepted = false;

        for j in 0..self.pick_buffers.buffer_count() {
            let (bw, bh) = self.pick_buffers.buffers()[j].dimensions();
            // Pick buffers are Y-flipped relative to pointer coordinates
            // and may be downsampled.
            let px = (x / ratio).floor();
            let py = bh as f32 - 1.0 - (y / ratio).floor();
            if px < 0.0 || py < 0.0 || px >= bw as f32 || py >= bh as f32 {
                continue;
            }
            let hit = self.pick_buffers.buffers_mut()[j].query(
                &self.gfx.device,
                &self.gfx.queue,
                px as u32,
                py as u32,
                radius,
            );
            let Some(hit) = hit else { continue };
            // Only a strictly closer hit from a later buffer overrides.
            if hit.distance >= self.selection.distance {
                continue;
            }
            for (i, obj) in self.objects.iter().enumerate() {
                if self.pick_buffers.buffer_of(i) != Some(j) {
                    continue;
                }
                if let Some(sample) = obj.drawable.pick(&hit) {
                    self.selection.accept(&hit, obj.id, sample);
                    accepted = true;
                    break;
                }
            }
        }

        if prev_object != self.selection.object {
            let sample = self.selection.sample;
            if let Some(prev) = prev_object {
                if let Some(obj) = self.object_mut(prev) {
                    obj.highlight(None);
                }
            }
            if let Some(current) = self.selection.object {
                if let Some(obj) = self.object_mut(current) {
                    obj.highlight(sample.as_ref());
                }
            }
            self.selection_changed = true;
            if let Some(callback) = self.on_select.as_mut() {
                callback(&self.selection);
            }
        } else if accepted {
            // Same object, fresh sample: the highlight marker moved.
            self.selection_changed = true;
        }

        let pressed = buttons & !self.prev_buttons;
        if pressed != 0 && self.selection.object.is_some() {
            if let Some(callback) = self.on_click.as_mut() {
                callback(&self.selection);
            }
        }
        self.prev_buttons = buttons;
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut Box<dyn Drawable>> {
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .map(|o| &mut o.drawable)
    }

    fn pick_dimensions(&self) -> (u32, u32) {
        let (width, height) = self.gfx.dimensions();
        let ratio = self.options.pixel_ratio.max(1.0);
        (
            ((width as f32 / ratio).ceil() as u32).max(1),
            ((height as f32 / ratio).ceil() as u32).max(1),
        )
    }

    fn realloc_pick_buffers(&mut self) {
        let counts: Vec<u32> = self
            .objects
            .iter()
            .map(|o| o.drawable.pick_slots())
            .collect();
        let layout = pack_pick_slots(&counts);
        let (pw, ph) = self.pick_dimensions();
        self.pick_buffers
            .apply_layout(&self.gfx.device, pw, ph, &layout);
        for (obj, assignment) in self.objects.iter_mut().zip(&layout.assignments) {
            if let Some(range) = assignment {
                obj.drawable.set_pick_base(range.base);
            }
        }
        self.dirty = true;
    }

    fn render_pick_pass(&mut self) {
        let (pw, ph) = self.pick_dimensions();
        self.pick_buffers.ensure_size(&self.gfx.device, pw, ph);

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pick encoder"),
            });
        for j in 0..self.pick_buffers.buffer_count() {
            let mut pass = self.pick_buffers.buffers()[j]
                .begin(&mut encoder)
                .forget_lifetime();
            let mut ctx = DrawContext {
                device: &self.gfx.device,
                queue: &self.gfx.queue,
                pass: &mut pass,
                phase: DrawPhase::Pick,
                params: &self.params,
                viewport: (pw, ph),
            };
            for (i, obj) in self.objects.iter_mut().enumerate() {
                if self.pick_buffers.buffer_of(i) == Some(j) {
                    obj.drawable.draw_pick(&mut ctx);
                }
            }
        }
        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }

    fn render_scene_pass(&mut self) -> Result<()> {
        let (width, height) = self.gfx.dimensions();
        let frame: FrameTarget = self.gfx.acquire_frame().map_err(PlotError::from)?;
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        let clear = self.options.clear_color;
        let mut has_transparent = false;

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("opaque pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &frame.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: f64::from(clear.x),
                                g: f64::from(clear.y),
                                b: f64::from(clear.z),
                                a: f64::from(clear.w),
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: self.gfx.depth_view(),
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    ..Default::default()
                })
                .forget_lifetime();
            let mut ctx = DrawContext {
                device: &self.gfx.device,
                queue: &self.gfx.queue,
                pass: &mut pass,
                phase: DrawPhase::Opaque,
                params: &self.params,
                viewport: (width, height),
            };

            if let Some(axes) = self.axes.as_mut() {
                if axes.enabled() {
                    axes.draw(&mut ctx);
                    has_transparent |= axes.is_transparent();
                }
            }

            if self.selection.object.is_some() {
                if let Some(marker) = self.marker.as_mut() {
                    let position = if self.options.snap_to_data {
                        self.selection.data_coordinate
                    } else {
                        self.selection.data_position
                    };
                    if let Some(position) = position {
                        marker.set_position(position);
                        marker.set_bounds(self.bounds.bounds());
                        marker.draw(&mut ctx);
                    }
                }
            }

            for obj in &mut self.objects {
                if obj.drawable.is_opaque() {
                    obj.drawable.draw(&mut ctx);
                }
                has_transparent |= obj.drawable.is_transparent();
            }
        }

        if has_transparent {
            {
                let mut pass = self
                    .transparency
                    .begin_depth_prepass(&mut encoder)
                    .forget_lifetime();
                let mut ctx = DrawContext {
                    device: &self.gfx.device,
                    queue: &self.gfx.queue,
                    pass: &mut pass,
                    phase: DrawPhase::DepthOnly,
                    params: &self.params,
                    viewport: (width, height),
                };
                if let Some(axes) = self.axes.as_mut() {
                    if axes.enabled() {
                        axes.draw(&mut ctx);
                    }
                }
                for obj in &mut self.objects {
                    if obj.drawable.is_opaque() {
                        obj.drawable.draw(&mut ctx);
                    }
                }
            }
            {
                let mut pass = self
                    .transparency
                    .begin_accumulation(&mut encoder)
                    .forget_lifetime();
                let mut ctx = DrawContext {
                    device: &self.gfx.device,
                    queue: &self.gfx.queue,
                    pass: &mut pass,
                    phase: DrawPhase::Transparent,
                    params: &self.params,
                    viewport: (width, height),
                };
                if let Some(axes) = self.axes.as_mut() {
                    if axes.enabled() && axes.is_transparent() {
                        axes.draw_transparent(&mut ctx);
                    }
                }
                for obj in &mut self.objects {
                    if obj.drawable.is_transparent() {
                        obj.drawable.draw_transparent(&mut ctx);
                    }
                }
            }
            self.transparency
                .composite(&self.gfx.device, &mut encoder, &frame.view);
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_frame_plans_no_work() {
        let plan = FramePlan::plan(false, false);
        assert!(!plan.render_pick);
        assert!(!plan.render_scene);
    }

    #[test]
    fn test_dirty_frame_renders_everything() {
        let plan = FramePlan::plan(true, false);
        assert!(plan.render_pick);
        assert!(plan.render_scene);
    }

    #[test]
    fn test_selection_change_skips_pick_pass() {
        // A moved highlight needs a visible redraw but the pick buffers
        // still match the scene content.
        let plan = FramePlan::plan(false, true);
        assert!(!plan.render_pick);
        assert!(plan.render_scene);
    }
}
