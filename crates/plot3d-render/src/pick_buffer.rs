//! Color-ID pick buffers and their shared allocation.
//!
//! Each pick buffer is an offscreen target where drawables render flat
//! colors whose first channel carries a slot ID. "What is under this
//! pixel" is answered by copying a small region back to the CPU and
//! scanning for the nearest non-zero ID.

use glam::UVec2;

use plot3d_core::{PickHit, PickLayout};

use crate::{DEPTH_FORMAT, PICK_FORMAT};

/// wgpu requires buffer copy rows padded to this many bytes.
const ROW_ALIGN: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// An offscreen color-ID framebuffer.
pub struct PickBuffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    /// Cached readback buffer, grown on demand.
    staging: Option<(wgpu::Buffer, u64)>,
    width: u32,
    height: u32,
}

impl PickBuffer {
    /// Creates a buffer sized to the (possibly downsampled) viewport.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let (texture, view, depth_view) = Self::create_targets(device, width, height);
        Self {
            texture,
            view,
            depth_view,
            staging: None,
            width,
            height,
        }
    }

    fn create_targets(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pick buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PICK_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pick depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        (texture, view, depth_view)
    }

    /// Current size in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Recreates the targets when the viewport changed. Returns whether
    /// a resize happened (the buffer contents are then stale).
    pub fn resize_if_needed(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let width = width.max(1);
        let height = height.max(1);
        if self.width == width && self.height == height {
            return false;
        }
        let (texture, view, depth_view) = Self::create_targets(device, width, height);
        self.texture.destroy();
        self.texture = texture;
        self.view = view;
        self.depth_view = depth_view;
        self.staging = None;
        self.width = width;
        self.height = height;
        true
    }

    /// Begins the scoped pick render pass: color cleared to ID 0
    /// (background), depth cleared. The pass ends when dropped.
    #[must_use]
    pub fn begin<'a>(&self, encoder: &'a mut wgpu::CommandEncoder) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pick pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        })
    }

    /// Queries the pixel region of radius `radius` around `(x, y)` and
    /// returns the nearest hit with a non-zero ID channel, if any.
    ///
    /// Coordinates are in buffer pixels; callers are responsible for
    /// Y-flip and pixel-ratio scaling.
    pub fn query(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        x: u32,
        y: u32,
        radius: f32,
    ) -> Option<PickHit> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let r = radius.max(0.0).ceil() as u32;
        let x0 = x.saturating_sub(r);
        let y0 = y.saturating_sub(r);
        let x1 = (x + r).min(self.width - 1);
        let y1 = (y + r).min(self.height - 1);
        let region_w = x1 - x0 + 1;
        let region_h = y1 - y0 + 1;

        let padded_row = (region_w * 4).div_ceil(ROW_ALIGN) * ROW_ALIGN;
        let size = u64::from(padded_row) * u64::from(region_h);
        self.ensure_staging(device, size);
        let staging = &self.staging.as_ref().expect("staging buffer just ensured").0;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("pick readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: x0, y: y0, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(region_h),
                },
            },
            wgpu::Extent3d {
                width: region_w,
                height: region_h,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..size);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::PollType::wait());
        rx.recv().ok()?.ok()?;

        let data = slice.get_mapped_range();
        let mut best: Option<PickHit> = None;
        for row in 0..region_h {
            let row_start = (row * padded_row) as usize;
            for col in 0..region_w {
                let px = row_start + (col * 4) as usize;
                let value = [data[px], data[px + 1], data[px + 2], data[px + 3]];
                if value[0] == 0 {
                    continue;
                }
                let dx = f64::from(x0 + col) - f64::from(x);
                let dy = f64::from(y0 + row) - f64::from(y);
                let distance = dx.hypot(dy) as f32;
                if best.as_ref().map_or(true, |b| distance < b.distance) {
                    best = Some(PickHit {
                        distance,
                        coord: UVec2::new(x0 + col, y0 + row),
                        id: u32::from(value[0]),
                        value,
                    });
                }
            }
        }
        drop(data);
        staging.unmap();

        best
    }

    fn ensure_staging(&mut self, device: &wgpu::Device, size: u64) {
        let needs_new = self.staging.as_ref().map_or(true, |(_, cap)| *cap < size);
        if needs_new {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("pick staging buffer"),
                size,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            });
            self.staging = Some((buffer, size));
        }
    }

    /// Releases the GPU resources.
    pub fn dispose(&mut self) {
        self.texture.destroy();
        self.staging = None;
    }
}

/// The running set of pick buffers backing a scene's object collection.
#[derive(Default)]
pub struct PickBufferSet {
    buffers: Vec<PickBuffer>,
    assignment: Vec<Option<usize>>,
    loads: Vec<u32>,
}

impl PickBufferSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live buffers.
    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Slots currently assigned per buffer.
    #[must_use]
    pub fn loads(&self) -> &[u32] {
        &self.loads
    }

    /// The buffer index holding the object at collection position
    /// `index`, if it is pickable.
    #[must_use]
    pub fn buffer_of(&self, index: usize) -> Option<usize> {
        self.assignment.get(index).copied().flatten()
    }

    /// Mutable access for queries.
    pub fn buffers_mut(&mut self) -> &mut [PickBuffer] {
        &mut self.buffers
    }

    /// Shared access.
    #[must_use]
    pub fn buffers(&self) -> &[PickBuffer] {
        &self.buffers
    }

    /// Reshapes the set to match a freshly packed layout: creates
    /// missing buffers at the given size, disposes surplus ones, and
    /// records the per-object assignment.
    pub fn apply_layout(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
        layout: &PickLayout,
    ) {
        while self.buffers.len() < layout.buffer_count() {
            self.buffers.push(PickBuffer::new(device, width, height));
            log::debug!("allocated pick buffer {}", self.buffers.len() - 1);
        }
        while self.buffers.len() > layout.buffer_count() {
            if let Some(mut buffer) = self.buffers.pop() {
                buffer.dispose();
                log::debug!("disposed pick buffer {}", self.buffers.len());
            }
        }
        self.assignment = layout
            .assignments
            .iter()
            .map(|a| a.map(|r| r.buffer))
            .collect();
        self.loads = layout.buffer_loads.clone();
    }

    /// Resizes every buffer to the given dimensions.
    pub fn ensure_size(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        for buffer in &mut self.buffers {
            buffer.resize_if_needed(device, width, height);
        }
    }

    /// Releases all GPU resources and forgets the assignment.
    pub fn dispose(&mut self) {
        for buffer in &mut self.buffers {
            buffer.dispose();
        }
        self.buffers.clear();
        self.assignment.clear();
        self.loads.clear();
    }
}
