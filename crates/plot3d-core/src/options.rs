//! Configuration options for a scene.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;

/// Immutable-after-construction configuration for a scene.
///
/// Runtime state (current bounds, dirty flags, selection) lives on the
/// scene itself; these options only describe how it behaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneOptions {
    /// Initial scene bounding box, replaced continuously when
    /// `auto_bounds` is on.
    pub bounds: Aabb,

    /// Near clipping plane distance.
    pub z_near: f32,

    /// Far clipping plane distance.
    pub z_far: f32,

    /// Vertical field of view in radians.
    pub fovy: f32,

    /// Background clear color (RGBA).
    pub clear_color: Vec4,

    /// Pick query radius in screen pixels.
    pub pick_radius: f32,

    /// Downsampling ratio for pick buffers; 1.0 keeps them at full
    /// viewport resolution, 2.0 halves each dimension.
    pub pixel_ratio: f32,

    /// Whether window resize events resize the scene viewport.
    pub auto_resize: bool,

    /// Whether scene bounds track the union of object bounds.
    pub auto_bounds: bool,

    /// Whether the model transform rescales the scene to unit size.
    pub auto_scale: bool,

    /// Whether the model transform recenters the scene at the origin.
    pub auto_center: bool,

    /// Whether object clip bounds follow the scene bounds.
    pub clip_to_bounds: bool,

    /// Whether the selection marker snaps to the picked data coordinate
    /// instead of the hit position.
    pub snap_to_data: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            bounds: Aabb::new(Vec3::splat(-10.0), Vec3::splat(10.0)),
            z_near: 0.01,
            z_far: 1000.0,
            fovy: std::f32::consts::FRAC_PI_4,
            clear_color: Vec4::ZERO,
            pick_radius: 10.0,
            pixel_ratio: 1.0,
            auto_resize: true,
            auto_bounds: true,
            auto_scale: true,
            auto_center: true,
            clip_to_bounds: true,
            snap_to_data: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = SceneOptions::default();
        assert_eq!(opts.z_near, 0.01);
        assert_eq!(opts.z_far, 1000.0);
        assert!((opts.fovy - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert_eq!(opts.pick_radius, 10.0);
        assert!(opts.auto_bounds && opts.auto_scale && opts.auto_center);
        assert!(!opts.snap_to_data);
    }

    #[test]
    fn test_options_roundtrip_json() {
        let opts = SceneOptions {
            pick_radius: 4.0,
            snap_to_data: true,
            ..SceneOptions::default()
        };
        let json = serde_json::to_string(&opts).unwrap();
        let back: SceneOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pick_radius, 4.0);
        assert!(back.snap_to_data);
    }
}
