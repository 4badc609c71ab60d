//! A stock turntable camera controller.
//!
//! Orbits around a target point with the up direction fixed; suitable
//! for plot-style scenes where the data sits near the origin after
//! auto-scale/auto-center. Input handlers call `orbit`/`pan`/`zoom`;
//! the scene observes the accumulated movement through `tick`.

use glam::{Mat4, Vec3};

use plot3d_core::{Aabb, CameraController};

/// A camera orbiting a target point.
#[derive(Debug, Clone)]
pub struct TurntableCamera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    zoom_min: f32,
    zoom_max: f32,
    moved: bool,
}

impl TurntableCamera {
    /// Creates a camera looking at `target` from `eye`.
    #[must_use]
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position: eye,
            target,
            up,
            zoom_min: 0.1,
            zoom_max: 100.0,
            moved: true,
        }
    }

    /// Camera position in world space.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The orbit target.
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Sets the allowed distance range from the target.
    pub fn set_zoom_range(&mut self, min: f32, max: f32) {
        self.zoom_min = min.max(1e-3);
        self.zoom_max = max.max(self.zoom_min);
    }

    fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// Orbits around the target; deltas are in radians.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let radius = (self.position - self.target).length();
        let mut theta = (self.position.x - self.target.x).atan2(self.position.z - self.target.z);
        let mut phi = ((self.position.y - self.target.y) / radius).acos();

        theta -= delta_x;
        phi = (phi - delta_y).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
        self.moved = true;
    }

    /// Pans camera and target together in the view plane.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.right() * delta_x + self.up * delta_y;
        self.position += offset;
        self.target += offset;
        self.moved = true;
    }

    /// Moves toward (positive delta) or away from the target, clamped
    /// to the zoom range.
    pub fn zoom(&mut self, delta: f32) {
        let direction = self.forward();
        let distance = (self.position - self.target).length();
        let new_distance = (distance - delta).clamp(self.zoom_min, self.zoom_max);
        self.position = self.target - direction * new_distance;
        self.moved = true;
    }

    /// Repositions to frame the given box.
    pub fn look_at_box(&mut self, bounds: &Aabb) {
        let size = bounds.span().length();
        self.target = bounds.center();
        self.position = self.target + Vec3::new(0.0, 0.0, size * 1.5);
        self.moved = true;
    }
}

impl Default for TurntableCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y)
    }
}

impl CameraController for TurntableCamera {
    fn tick(&mut self) -> bool {
        std::mem::take(&mut self.moved)
    }

    fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_reports_then_clears_movement() {
        let mut cam = TurntableCamera::default();
        assert!(cam.tick()); // initial placement counts as movement
        assert!(!cam.tick());
        cam.orbit(0.1, 0.0);
        assert!(cam.tick());
        assert!(!cam.tick());
    }

    #[test]
    fn test_orbit_preserves_radius() {
        let mut cam = TurntableCamera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        cam.orbit(0.3, 0.2);
        let radius = cam.position().length();
        assert!((radius - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_clamps_to_range() {
        let mut cam = TurntableCamera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        cam.set_zoom_range(1.0, 10.0);
        cam.zoom(100.0);
        assert!((cam.position().distance(cam.target()) - 1.0).abs() < 1e-4);
        cam.zoom(-100.0);
        assert!((cam.position().distance(cam.target()) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_pan_moves_target_with_camera() {
        let mut cam = TurntableCamera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        cam.pan(1.0, 2.0);
        let offset = cam.target();
        assert!(offset.length() > 0.0);
        assert!((cam.position() - offset - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_look_at_box_targets_center() {
        let mut cam = TurntableCamera::default();
        let bounds = Aabb::new(Vec3::splat(2.0), Vec3::splat(4.0));
        cam.look_at_box(&bounds);
        assert_eq!(cam.target(), Vec3::splat(3.0));
        assert!(cam.position().z > cam.target().z);
    }
}
