//! Graphics context: device, queue, frame target, shared depth buffer.

use std::sync::Arc;

use crate::error::{RenderError, RenderResult};
use crate::{DEPTH_FORMAT, HEADLESS_FORMAT};

/// Owns the wgpu device and the frame target the scene composites into.
///
/// Construction is fatal when no adapter or device can be acquired;
/// there is no degraded mode.
pub struct GraphicsContext {
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: wgpu::SurfaceConfiguration,
    headless_target: Option<wgpu::Texture>,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// One frame's color target: a swapchain texture when windowed, an
/// offscreen texture when headless.
pub struct FrameTarget {
    surface_texture: Option<wgpu::SurfaceTexture>,
    /// View to attach as the frame's color target.
    pub view: wgpu::TextureView,
}

impl FrameTarget {
    /// Presents the frame. A no-op for headless targets.
    pub fn present(self) {
        if let Some(texture) = self.surface_texture {
            texture.present();
        }
    }
}

impl GraphicsContext {
    /// Creates a context rendering to a window surface.
    pub async fn new_windowed(window: Arc<winit::window::Window>) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = Self::request_device(&adapter, "plot3d device").await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = Self::create_depth_texture(&device, width, height);

        log::info!("graphics context created ({width}x{height}, {surface_format:?})");

        Ok(Self {
            device,
            queue,
            surface: Some(surface),
            surface_config,
            headless_target: None,
            depth_view,
            width,
            height,
        })
    }

    /// Creates a context rendering to an offscreen texture.
    pub async fn new_headless(width: u32, height: u32) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = Self::request_device(&adapter, "plot3d device (headless)").await?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: HEADLESS_FORMAT,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let headless_target = Some(Self::create_headless_target(&device, width, height));
        let depth_view = Self::create_depth_texture(&device, width, height);

        log::info!("headless graphics context created ({width}x{height})");

        Ok(Self {
            device,
            queue,
            surface: None,
            surface_config,
            headless_target,
            depth_view,
            width,
            height,
        })
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
        label: &str,
    ) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(label),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;
        Ok((device, queue))
    }

    /// The format of the frame's color target.
    #[must_use]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Current viewport size in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The shared depth attachment for opaque rendering.
    #[must_use]
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Resizes the frame target and depth buffer. Zero dimensions are
    /// ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;

        if let Some(ref surface) = self.surface {
            surface.configure(&self.device, &self.surface_config);
        }
        if self.headless_target.is_some() {
            self.headless_target = Some(Self::create_headless_target(&self.device, width, height));
        }

        self.depth_view = Self::create_depth_texture(&self.device, width, height);
        log::debug!("graphics context resized to {width}x{height}");
    }

    /// Acquires the next frame target.
    pub fn acquire_frame(&mut self) -> RenderResult<FrameTarget> {
        if let Some(ref surface) = self.surface {
            let surface_texture = surface.get_current_texture()?;
            let view = surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            return Ok(FrameTarget {
                surface_texture: Some(surface_texture),
                view,
            });
        }

        let texture = self
            .headless_target
            .as_ref()
            .expect("context has neither surface nor headless target");
        Ok(FrameTarget {
            surface_texture: None,
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        })
    }

    fn create_headless_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("headless frame target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: HEADLESS_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
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
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}
