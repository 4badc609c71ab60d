//! Per-frame camera parameters and the camera controller contract.

use glam::{Mat4, Vec3};

use crate::bounds::Aabb;

/// External camera controller contract.
///
/// The scene consumes a controller only as a producer of a view matrix
/// and a per-frame movement signal; navigation behavior is entirely the
/// controller's business.
pub trait CameraController {
    /// Advances camera state for this frame and reports whether the
    /// view changed since the previous tick.
    fn tick(&mut self) -> bool;

    /// Returns the current view matrix.
    fn view(&self) -> Mat4;
}

/// The matrix triple handed to every draw call of a frame.
///
/// Rebuilt once per frame and shared by reference; drawables must not
/// cache it across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    /// View matrix from the camera controller.
    pub view: Mat4,
    /// Perspective projection matrix.
    pub projection: Mat4,
    /// Model matrix fitting the scene bounds into view.
    pub model: Mat4,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
        }
    }
}

/// Builds a right-handed perspective projection.
#[must_use]
pub fn perspective_projection(fovy: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    Mat4::perspective_rh(fovy, aspect, z_near, z_far)
}

/// Builds the model matrix that fits the scene bounds into view.
///
/// With auto-scale, every axis is scaled by `0.5 / d` where `d` is the
/// largest span across the three axes (a non-positive span falls back
/// to unit scale); with auto-center, each axis is translated by
/// `-scale * 0.5 * (lo + hi)` so the box straddles the origin.
#[must_use]
pub fn fit_model_matrix(bounds: &Aabb, auto_scale: bool, auto_center: bool) -> Mat4 {
    let diameter = bounds.span().max_element();
    let scale = if auto_scale && diameter > 0.0 {
        0.5 / diameter
    } else {
        1.0
    };

    let mut model = Mat4::ZERO;
    model.x_axis.x = scale;
    model.y_axis.y = scale;
    model.z_axis.z = scale;
    model.w_axis.w = 1.0;
    if auto_center {
        let t = (bounds.lo + bounds.hi) * (-0.5 * scale);
        model.w_axis.x = t.x;
        model.w_axis.y = t.y;
        model.w_axis.z = t.z;
    }
    model
}

/// A fixed camera that never moves; useful for offline rendering.
#[derive(Debug, Clone)]
pub struct StaticCamera {
    view: Mat4,
}

impl StaticCamera {
    /// Creates a camera looking at `target` from `eye`.
    #[must_use]
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, up),
        }
    }
}

impl Default for StaticCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y)
    }
}

impl CameraController for StaticCamera {
    fn tick(&mut self) -> bool {
        false
    }

    fn view(&self) -> Mat4 {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_perspective_is_perspective() {
        let proj = perspective_projection(std::f32::consts::FRAC_PI_4, 1.5, 0.01, 1000.0);
        // A perspective matrix divides by -z.
        assert!(proj.w_axis.z != 0.0);
        assert_eq!(proj.w_axis.w, 0.0);
    }

    #[test]
    fn test_fit_model_scales_to_half_unit() {
        let bounds = Aabb::new(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(1.0, 2.0, 1.0));
        let model = fit_model_matrix(&bounds, true, false);
        // Largest span is 4, so scale = 0.125 on every axis.
        assert_eq!(model.x_axis.x, 0.125);
        assert_eq!(model.y_axis.y, 0.125);
        assert_eq!(model.z_axis.z, 0.125);
        assert_eq!(model.w_axis, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_fit_model_centers_bounds() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        let model = fit_model_matrix(&bounds, true, true);
        let center = model * Vec4::new(5.0, 5.0, 5.0, 1.0);
        assert!(center.truncate().length() < 1e-6);
    }

    #[test]
    fn test_fit_model_identity_without_auto() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        let model = fit_model_matrix(&bounds, false, false);
        assert_eq!(model, Mat4::IDENTITY);
    }

    #[test]
    fn test_fit_model_zero_diameter_guard() {
        let bounds = Aabb::new(Vec3::splat(3.0), Vec3::splat(3.0));
        let model = fit_model_matrix(&bounds, true, false);
        assert_eq!(model.x_axis.x, 1.0);
    }

    #[test]
    fn test_static_camera_never_moves() {
        let mut cam = StaticCamera::default();
        assert!(!cam.tick());
        assert!(!cam.tick());
        let v = cam.view();
        assert_eq!(v, cam.view());
    }
}
