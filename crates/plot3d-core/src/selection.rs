//! Pointer-driven selection state.
//!
//! The pointer handler mutates this between frames; the render pipeline
//! only reads it (to place the highlight marker). The selected object
//! is referenced by id, never owned.

use glam::{UVec2, Vec2, Vec3};

/// Stable identifier for an object registered with a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    /// Creates an id from its raw value.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw hit returned by a pick-buffer query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Euclidean distance in pixels from the query center.
    pub distance: f32,
    /// Pixel coordinate of the hit inside the pick buffer.
    pub coord: UVec2,
    /// Decoded slot ID (1..=254); the buffer never reports 0.
    pub id: u32,
    /// The full pixel value, for drawables encoding extra data in the
    /// remaining channels.
    pub value: [u8; 4],
}

/// A drawable's interpretation of a hit it claimed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickSample {
    /// Index of the picked sub-feature within the drawable.
    pub index: u32,
    /// Hit position in model space.
    pub position: Vec3,
    /// Hit position in data space.
    pub data_coordinate: Vec3,
}

/// The latest pointer-derived hit-test result.
#[derive(Debug, Clone)]
pub struct SelectionState {
    /// Last pointer position in viewport pixels.
    pub mouse: Vec2,
    /// Screen-space coordinate of the accepted hit.
    pub screen: Option<UVec2>,
    /// Distance of the accepted hit; `+inf` while nothing is selected.
    pub distance: f32,
    /// The selected object, if any.
    pub object: Option<ObjectId>,
    /// Sub-feature index reported by the selected drawable.
    pub index: Option<u32>,
    /// Model-space position of the hit.
    pub data_position: Option<Vec3>,
    /// Data-space coordinate of the hit.
    pub data_coordinate: Option<Vec3>,
    /// The full sample handed back by the selected drawable.
    pub sample: Option<PickSample>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            mouse: Vec2::new(-1.0, -1.0),
            screen: None,
            distance: f32::INFINITY,
            object: None,
            index: None,
            data_position: None,
            data_coordinate: None,
            sample: None,
        }
    }
}

impl SelectionState {
    /// Resets the state for a fresh hit-test sweep at `mouse`.
    pub fn begin_query(&mut self, mouse: Vec2) {
        self.mouse = mouse;
        self.screen = None;
        self.distance = f32::INFINITY;
        self.object = None;
        self.index = None;
        self.data_position = None;
        self.data_coordinate = None;
        self.sample = None;
    }

    /// Installs a hit claimed by `object`. The caller has already
    /// established that `hit.distance` does not exceed the current
    /// best.
    pub fn accept(&mut self, hit: &PickHit, object: ObjectId, sample: PickSample) {
        self.screen = Some(hit.coord);
        self.distance = hit.distance;
        self.object = Some(object);
        self.index = Some(sample.index);
        self.data_position = Some(sample.position);
        self.data_coordinate = Some(sample.data_coordinate);
        self.sample = Some(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(distance: f32) -> PickHit {
        PickHit {
            distance,
            coord: UVec2::new(10, 20),
            id: 3,
            value: [3, 0, 0, 255],
        }
    }

    fn sample() -> PickSample {
        PickSample {
            index: 7,
            position: Vec3::ONE,
            data_coordinate: Vec3::splat(2.0),
        }
    }

    #[test]
    fn test_default_has_no_selection() {
        let sel = SelectionState::default();
        assert!(sel.object.is_none());
        assert_eq!(sel.distance, f32::INFINITY);
    }

    #[test]
    fn test_begin_query_clears_everything() {
        let mut sel = SelectionState::default();
        sel.accept(&hit(1.0), ObjectId(4), sample());
        sel.begin_query(Vec2::new(5.0, 6.0));
        assert_eq!(sel.mouse, Vec2::new(5.0, 6.0));
        assert_eq!(sel.distance, f32::INFINITY);
        assert!(sel.object.is_none());
        assert!(sel.screen.is_none());
        assert!(sel.data_position.is_none() && sel.data_coordinate.is_none());
    }

    #[test]
    fn test_accept_installs_hit() {
        let mut sel = SelectionState::default();
        sel.begin_query(Vec2::ZERO);
        sel.accept(&hit(2.5), ObjectId(1), sample());
        assert_eq!(sel.object, Some(ObjectId(1)));
        assert_eq!(sel.distance, 2.5);
        assert_eq!(sel.index, Some(7));
        assert_eq!(sel.screen, Some(UVec2::new(10, 20)));
        assert_eq!(sel.data_coordinate, Some(Vec3::splat(2.0)));
    }
}
