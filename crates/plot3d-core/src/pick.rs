//! Pick-slot packing across shared ID buffers.
//!
//! Every pickable object reserves a contiguous range of small-integer
//! IDs inside some pick buffer. A buffer's 8-bit color channel holds
//! IDs 1..=254; 0 is the background. Packing is greedy first-fit in
//! collection order, which makes the resulting layout a deterministic
//! function of the slot counts; tests (and the scene) rely on that.

/// Usable ID slots per pick buffer (ID 0 is reserved for "no object").
pub const PICK_SLOTS_PER_BUFFER: u32 = 254;

/// A contiguous ID range assigned to one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRange {
    /// Index of the pick buffer holding this range.
    pub buffer: usize,
    /// First ID of the range, in 1..=254.
    pub base: u32,
    /// Number of slots reserved.
    pub count: u32,
}

/// The result of packing a collection's slot requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickLayout {
    /// Per-object assignment, in collection order; `None` for objects
    /// requesting zero slots (excluded from picking).
    pub assignments: Vec<Option<SlotRange>>,
    /// Total slots assigned to each buffer, in buffer order.
    pub buffer_loads: Vec<u32>,
}

impl PickLayout {
    /// Number of pick buffers the layout requires.
    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.buffer_loads.len()
    }
}

/// Packs slot requests into the minimum running set of pick buffers.
///
/// First-fit: each object lands in the first buffer with enough
/// remaining capacity, receiving `base = load + 1`; when none fits, a
/// new buffer is opened. Buffers that received no slots are never
/// materialized, so the layout has no trailing empties to trim.
#[must_use]
pub fn pack_pick_slots(slot_counts: &[u32]) -> PickLayout {
    let mut layout = PickLayout::default();
    'objects: for &count in slot_counts {
        if count == 0 {
            layout.assignments.push(None);
            continue;
        }
        if count > PICK_SLOTS_PER_BUFFER {
            log::warn!(
                "pick request of {count} slots exceeds buffer capacity {PICK_SLOTS_PER_BUFFER}; \
                 IDs past the capacity will not resolve"
            );
        }
        for (buffer, load) in layout.buffer_loads.iter_mut().enumerate() {
            if *load + count <= PICK_SLOTS_PER_BUFFER {
                layout.assignments.push(Some(SlotRange {
                    buffer,
                    base: *load + 1,
                    count,
                }));
                *load += count;
                continue 'objects;
            }
        }
        layout.assignments.push(Some(SlotRange {
            buffer: layout.buffer_loads.len(),
            base: 1,
            count,
        }));
        layout.buffer_loads.push(count);
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_slots_excluded() {
        let layout = pack_pick_slots(&[0, 5, 0]);
        assert_eq!(layout.assignments[0], None);
        assert_eq!(layout.assignments[2], None);
        assert_eq!(layout.buffer_loads, vec![5]);
    }

    #[test]
    fn test_three_hundreds_split_two_buffers() {
        let layout = pack_pick_slots(&[100, 100, 100]);
        assert_eq!(layout.buffer_loads, vec![200, 100]);
        let ranges: Vec<_> = layout.assignments.iter().flatten().copied().collect();
        assert_eq!(
            ranges,
            vec![
                SlotRange { buffer: 0, base: 1, count: 100 },
                SlotRange { buffer: 0, base: 101, count: 100 },
                SlotRange { buffer: 1, base: 1, count: 100 },
            ]
        );
    }

    #[test]
    fn test_full_buffer_boundary() {
        // 254 exactly fills a buffer; the next request opens a new one.
        let layout = pack_pick_slots(&[254, 1]);
        assert_eq!(layout.buffer_loads, vec![254, 1]);
    }

    #[test]
    fn test_first_fit_backfills_earlier_buffers() {
        // The fourth object fits back into buffer 1 even though buffer 2
        // was opened after it.
        let layout = pack_pick_slots(&[200, 100, 200, 100]);
        assert_eq!(layout.buffer_loads, vec![200, 200, 200]);
        assert_eq!(layout.assignments[3].unwrap().buffer, 1);
    }

    #[test]
    fn test_uniform_single_slots_hit_ceil_bound() {
        let counts = vec![1u32; 600];
        let layout = pack_pick_slots(&counts);
        assert_eq!(layout.buffer_count(), 3); // ceil(600 / 254)
    }

    #[test]
    fn test_uniform_divisor_slots_hit_ceil_bound() {
        // 127 divides the capacity exactly in two.
        let counts = vec![127u32; 5];
        let layout = pack_pick_slots(&counts);
        assert_eq!(layout.buffer_count(), 3); // ceil(5 * 127 / 254)
    }

    fn ranges_overlap(a: &SlotRange, b: &SlotRange) -> bool {
        a.buffer == b.buffer && a.base < b.base + b.count && b.base < a.base + a.count
    }

    proptest! {
        #[test]
        fn prop_assignment_is_injective(counts in prop::collection::vec(0u32..=254, 0..64)) {
            let layout = pack_pick_slots(&counts);
            let ranges: Vec<_> = layout.assignments.iter().flatten().copied().collect();
            for (i, a) in ranges.iter().enumerate() {
                for b in &ranges[i + 1..] {
                    prop_assert!(!ranges_overlap(a, b), "{a:?} overlaps {b:?}");
                }
            }
        }

        #[test]
        fn prop_loads_match_assignments(counts in prop::collection::vec(0u32..=254, 0..64)) {
            let layout = pack_pick_slots(&counts);
            let mut loads = vec![0u32; layout.buffer_count()];
            for r in layout.assignments.iter().flatten() {
                loads[r.buffer] += r.count;
                prop_assert!(r.base >= 1);
                prop_assert!(r.base + r.count - 1 <= PICK_SLOTS_PER_BUFFER);
            }
            prop_assert_eq!(loads, layout.buffer_loads);
        }

        #[test]
        fn prop_no_empty_buffers(counts in prop::collection::vec(0u32..=254, 0..64)) {
            let layout = pack_pick_slots(&counts);
            prop_assert!(layout.buffer_loads.iter().all(|&l| l > 0));
        }

        #[test]
        fn prop_packing_is_deterministic(counts in prop::collection::vec(0u32..=254, 0..64)) {
            prop_assert_eq!(pack_pick_slots(&counts), pack_pick_slots(&counts));
        }

        #[test]
        fn prop_add_then_remove_roundtrips(
            counts in prop::collection::vec(0u32..=254, 1..32),
            extra in 0u32..=254,
        ) {
            // Appending and dropping an object restores the exact layout.
            let before = pack_pick_slots(&counts);
            let mut grown = counts.clone();
            grown.push(extra);
            let _ = pack_pick_slots(&grown);
            prop_assert_eq!(pack_pick_slots(&counts), before);
        }
    }
}
