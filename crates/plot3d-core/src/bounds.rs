//! Scene bounds aggregation and tick-spacing computation.
//!
//! The scene continuously fits an axis-aligned box around every object
//! that reports one, pads it, and signals when the fitted box moved so
//! that the frame loop can force a redraw and the axes can relabel.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Fraction of each axis span added as padding on both sides.
const PADDING: f32 = 0.05;

/// Relative tolerance for the bounds-changed comparison. Exact float
/// equality thrashes under rounding when object bounds are recomputed
/// per frame.
const EPSILON: f32 = 1e-6;

/// An axis-aligned bounding box.
///
/// Invariant: `lo[i] <= hi[i]` per axis once both are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub lo: Vec3,
    /// Maximum corner.
    pub hi: Vec3,
}

impl Aabb {
    /// Creates a box from its two corners.
    #[must_use]
    pub fn new(lo: Vec3, hi: Vec3) -> Self {
        Self { lo, hi }
    }

    /// The empty accumulator: every union enlarges it.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lo: Vec3::splat(f32::INFINITY),
            hi: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// The fallback box used when no object reports bounds.
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            lo: Vec3::splat(-1.0),
            hi: Vec3::splat(1.0),
        }
    }

    /// Enlarges this box to contain `other`.
    pub fn union_with(&mut self, other: &Aabb) {
        self.lo = self.lo.min(other.lo);
        self.hi = self.hi.max(other.hi);
    }

    /// Returns the per-axis spans `hi - lo`.
    #[must_use]
    pub fn span(&self) -> Vec3 {
        self.hi - self.lo
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.lo + self.hi) * 0.5
    }
}

/// Returns the smallest power of ten greater than or equal to `x`.
///
/// Rounds toward positive infinity in log10 space; non-positive input
/// yields zero spacing.
#[must_use]
pub fn pow10_ceil(x: f32) -> f32 {
    if x <= 0.0 || !x.is_finite() {
        return 0.0;
    }
    // Nudge below exact powers of ten so pow10_ceil(10.0) == 10.0
    // despite log10 rounding.
    let exp = (f64::from(x).log10() - 1e-9).ceil();
    10f64.powf(exp) as f32
}

fn approx_ne(a: f32, b: f32) -> bool {
    (a - b).abs() > EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Tracks the padded union of all object bounding boxes.
#[derive(Debug, Clone)]
pub struct BoundsTracker {
    bounds: Aabb,
    tick_spacing: [f32; 3],
}

impl BoundsTracker {
    /// Creates a tracker seeded with the configured initial bounds.
    #[must_use]
    pub fn new(initial: Aabb) -> Self {
        let span = initial.span();
        let tick_spacing = [
            pow10_ceil(span.x / 10.0),
            pow10_ceil(span.y / 10.0),
            pow10_ceil(span.z / 10.0),
        ];
        Self {
            bounds: initial,
            tick_spacing,
        }
    }

    /// The current padded scene bounds.
    #[must_use]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Per-axis tick spacing derived from the current bounds.
    #[must_use]
    pub fn tick_spacing(&self) -> [f32; 3] {
        self.tick_spacing
    }

    /// Recomputes the scene bounds from the given per-object boxes.
    ///
    /// Axes with no finite contribution fall back to the `[-1, 1]`
    /// sentinel, unpadded; all other axes receive 5% padding on each
    /// side. Returns `true` when the stored bounds moved beyond the
    /// comparison tolerance, in which case tick spacing has been
    /// recomputed and the caller must redraw and relabel.
    pub fn update<I>(&mut self, boxes: I) -> bool
    where
        I: IntoIterator<Item = Option<Aabb>>,
    {
        let mut acc = Aabb::empty();
        for b in boxes.into_iter().flatten() {
            acc.union_with(&b);
        }

        let mut lo = [0f32; 3];
        let mut hi = [0f32; 3];
        let mut changed = false;
        for i in 0..3 {
            if acc.lo[i] == f32::INFINITY || acc.hi[i] == f32::NEG_INFINITY {
                lo[i] = -1.0;
                hi[i] = 1.0;
            } else {
                let padding = PADDING * (acc.hi[i] - acc.lo[i]);
                lo[i] = acc.lo[i] - padding;
                hi[i] = acc.hi[i] + padding;
            }
            changed =
                changed || approx_ne(lo[i], self.bounds.lo[i]) || approx_ne(hi[i], self.bounds.hi[i]);
        }

        if changed {
            self.bounds = Aabb::new(Vec3::from(lo), Vec3::from(hi));
            for i in 0..3 {
                self.tick_spacing[i] = pow10_ceil((hi[i] - lo[i]) / 10.0);
            }
            log::debug!(
                "scene bounds changed: {:?}..{:?}",
                self.bounds.lo,
                self.bounds.hi
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scene_falls_back_to_sentinel() {
        let mut tracker = BoundsTracker::new(Aabb::new(Vec3::splat(-10.0), Vec3::splat(10.0)));
        let changed = tracker.update(std::iter::empty());
        assert!(changed);
        assert_eq!(*tracker.bounds(), Aabb::sentinel());
    }

    #[test]
    fn test_single_object_padded_five_percent() {
        let mut tracker = BoundsTracker::new(Aabb::new(Vec3::splat(-10.0), Vec3::splat(10.0)));
        let obj = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        assert!(tracker.update([Some(obj)]));
        let b = tracker.bounds();
        for i in 0..3 {
            assert!((b.lo[i] - -0.5).abs() < 1e-5);
            assert!((b.hi[i] - 10.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut tracker = BoundsTracker::new(Aabb::new(Vec3::splat(-10.0), Vec3::splat(10.0)));
        let obj = Aabb::new(Vec3::new(-3.0, 0.0, 1.0), Vec3::new(4.0, 2.0, 9.0));
        assert!(tracker.update([Some(obj)]));
        let first = *tracker.bounds();
        let spacing = tracker.tick_spacing();

        assert!(!tracker.update([Some(obj)]));
        assert_eq!(*tracker.bounds(), first);
        assert_eq!(tracker.tick_spacing(), spacing);
    }

    #[test]
    fn test_objects_without_bounds_are_skipped() {
        let mut tracker = BoundsTracker::new(Aabb::sentinel());
        let obj = Aabb::new(Vec3::ZERO, Vec3::ONE);
        tracker.update([None, Some(obj), None]);
        let b = *tracker.bounds();
        assert!((b.lo.x - -0.05).abs() < 1e-6);
        assert!((b.hi.x - 1.05).abs() < 1e-6);
    }

    #[test]
    fn test_mixed_finite_axes() {
        // An object flat in z still gets the sentinel only on axes with
        // no contribution at all; a zero-span axis is padded by zero.
        let mut tracker = BoundsTracker::new(Aabb::new(Vec3::splat(-10.0), Vec3::splat(10.0)));
        let flat = Aabb::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(4.0, 4.0, 2.0));
        tracker.update([Some(flat)]);
        let b = tracker.bounds();
        assert_eq!(b.lo.z, 2.0);
        assert_eq!(b.hi.z, 2.0);
    }

    #[test]
    fn test_pow10_ceil() {
        assert_eq!(pow10_ceil(0.0), 0.0);
        assert_eq!(pow10_ceil(1.0), 1.0);
        assert_eq!(pow10_ceil(1.1), 10.0);
        assert_eq!(pow10_ceil(10.0), 10.0);
        assert_eq!(pow10_ceil(0.09), 0.1);
        assert_eq!(pow10_ceil(250.0), 1000.0);
    }

    #[test]
    fn test_tick_spacing_tracks_span() {
        let mut tracker = BoundsTracker::new(Aabb::sentinel());
        let obj = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        tracker.update([Some(obj)]);
        // Padded span is 11.0, 11/10 rounds up to the next power of ten.
        assert_eq!(tracker.tick_spacing(), [10.0, 10.0, 10.0]);
    }
}
