//! The self-rescheduling frame loop, made explicit.
//!
//! One invocation of [`FrameLoop::tick`] renders one frame and reports
//! whether the next invocation should be scheduled. Embedders wire
//! `Continue` to their redraw-request mechanism (e.g. winit's
//! `RedrawRequested` → render → `request_redraw`); the loop halts once
//! the scene is disposed or a [`StopHandle`] fires.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use plot3d_core::Result;

use crate::scene::Scene;

/// Whether the loop wants another tick scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Schedule the next tick.
    Continue,
    /// The stop flag is set; do not reschedule.
    Halted,
}

/// A shareable switch that halts a [`FrameLoop`].
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop: Arc<AtomicBool>,
}

impl StopHandle {
    pub(crate) fn new(stop: Arc<AtomicBool>) -> Self {
        Self { stop }
    }

    /// Requests the loop to halt before its next tick.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Whether a halt has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// Drives a scene one frame per invocation until stopped.
pub struct FrameLoop {
    stop: Arc<AtomicBool>,
}

impl FrameLoop {
    /// Creates a loop bound to the scene's stop flag, so `dispose()`
    /// is a cancellation point.
    #[must_use]
    pub fn for_scene(scene: &Scene) -> Self {
        Self {
            stop: scene.stop_flag(),
        }
    }

    /// Renders one frame unless halted, and reports whether to
    /// schedule the next tick.
    pub fn tick(&self, scene: &mut Scene) -> Result<LoopState> {
        if self.stop.load(Ordering::Relaxed) {
            return Ok(LoopState::Halted);
        }
        scene.frame()?;
        // Dispose may have run from a frame callback.
        Ok(if self.stop.load(Ordering::Relaxed) {
            LoopState::Halted
        } else {
            LoopState::Continue
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_handle_flips_once() {
        let handle = StopHandle::new(Arc::new(AtomicBool::new(false)));
        assert!(!handle.is_stopped());
        handle.stop();
        assert!(handle.is_stopped());
        handle.stop();
        assert!(handle.is_stopped());
    }

    #[test]
    fn test_stop_handle_clones_share_state() {
        let handle = StopHandle::new(Arc::new(AtomicBool::new(false)));
        let other = handle.clone();
        other.stop();
        assert!(handle.is_stopped());
    }
}
