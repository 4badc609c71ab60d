//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// Failed to acquire the next surface frame.
    #[error("failed to acquire surface frame: {0}")]
    SurfaceAcquireFailed(#[from] wgpu::SurfaceError),

    /// Pick readback failed.
    #[error("pick buffer readback failed: {0}")]
    PickReadbackFailed(String),

    /// Timeout waiting for GPU.
    #[error("timeout waiting for GPU")]
    Timeout,
}

impl From<RenderError> for plot3d_core::PlotError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::AdapterCreationFailed
            | RenderError::DeviceCreationFailed(_)
            | RenderError::SurfaceCreationFailed(_) => {
                plot3d_core::PlotError::GraphicsUnavailable(err.to_string())
            }
            other => plot3d_core::PlotError::RenderError(other.to_string()),
        }
    }
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
