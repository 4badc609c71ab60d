//! Error types for plot3d-rs.

use thiserror::Error;

/// The main error type for plot3d-rs operations.
#[derive(Error, Debug)]
pub enum PlotError {
    /// The graphics context could not be acquired.
    #[error("graphics context unavailable: {0}")]
    GraphicsUnavailable(String),

    /// The scene has already been disposed.
    #[error("scene has been disposed")]
    SceneDisposed,

    /// No object with the given id is registered with the scene.
    #[error("object {0} not found in scene")]
    ObjectNotFound(u64),

    /// Rendering error.
    #[error("render error: {0}")]
    RenderError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for plot3d-rs operations.
pub type Result<T> = std::result::Result<T, PlotError>;
