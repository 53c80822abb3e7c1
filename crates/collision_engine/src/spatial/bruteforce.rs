//! Reference all-pairs collision pass
//!
//! Tests every unordered element pair with the narrow-phase test selected
//! by the elements' collision kind, optionally short-circuited by the
//! bounding-sphere pre-check. O(n^2) narrow tests, O(1) extra memory.
//! The octree runs the same pairwise algorithm on its per-node groups,
//! which is what makes the two structures report identical results.

use std::time::Duration;

use crate::foundation::time::Stopwatch;
use crate::physics::element::{sphere_overlap, CollisionKind, ElementId, SpatialElement};

/// Run the narrow-phase test for one pair and mark both elements on a hit
///
/// The sphere pre-check runs first when either element opted in; it only
/// ever skips pairs whose exact volumes cannot overlap. Kind dispatch is an
/// exhaustive match: both elements must be OBB-kind for the
/// separating-axis test, otherwise the pair falls back to the always-valid
/// world AABBs.
pub(crate) fn test_pair(elements: &mut [SpatialElement], a: usize, b: usize) {
    let (ea, eb) = (&elements[a], &elements[b]);

    if (ea.sphere_precheck_enabled() || eb.sphere_precheck_enabled()) && !sphere_overlap(ea, eb) {
        return;
    }

    let hit = match (ea.collision_kind(), eb.collision_kind()) {
        (CollisionKind::ObbVsObb, CollisionKind::ObbVsObb) => ea.obb().intersects(eb.obb()),
        _ => ea.aabb().intersects(eb.aabb()),
    };

    if hit {
        elements[a].set_colliding(true);
        elements[b].set_colliding(true);
    }
}

/// Pairwise pass over one group of elements
///
/// With `smart` set, each unordered pair is tested once (`i < j`); without
/// it every ordered pair is tested, doubling the scalar work for the same
/// result. The flag exists to measure that wasted work, not to change
/// outcomes.
pub(crate) fn pairwise_pass(elements: &mut [SpatialElement], ids: &[ElementId], smart: bool) {
    for i in 0..ids.len() {
        let start = if smart { i + 1 } else { 0 };
        for j in start..ids.len() {
            if i == j {
                continue;
            }
            test_pair(elements, ids[i].index(), ids[j].index());
        }
    }
}

/// Test every element of one group against every element of another
///
/// Used by the octree to pair a node's objects with objects stored in its
/// ancestor nodes. The two groups are disjoint, so each cross pair is
/// tested exactly once.
pub(crate) fn cross_pass(elements: &mut [SpatialElement], group_a: &[ElementId], group_b: &[ElementId]) {
    for a in group_a {
        for b in group_b {
            test_pair(elements, a.index(), b.index());
        }
    }
}

/// Brute-force all-pairs collision structure
///
/// The reference implementation the octree is benchmarked against.
/// Operates directly on the caller's element slice; stores nothing but the
/// pass duration.
///
/// Callers must clear `is_colliding` on every element before `update`;
/// the pass only ever sets the flag.
pub struct BruteforceStructure {
    smart_pairs: bool,
    collision_time: Duration,
}

impl Default for BruteforceStructure {
    fn default() -> Self {
        Self::new()
    }
}

impl BruteforceStructure {
    /// Create a new brute-force structure with pair deduplication enabled
    pub fn new() -> Self {
        Self {
            smart_pairs: true,
            collision_time: Duration::ZERO,
        }
    }

    /// Check whether pairs are deduplicated (`i < j`)
    pub fn smart_pairs(&self) -> bool {
        self.smart_pairs
    }

    /// Toggle pair deduplication
    pub fn set_smart_pairs(&mut self, smart: bool) {
        self.smart_pairs = smart;
    }

    /// Run the all-pairs collision pass, marking colliding elements
    pub fn update(&mut self, elements: &mut [SpatialElement]) {
        let stopwatch = Stopwatch::start_new();

        for i in 0..elements.len() {
            let start = if self.smart_pairs { i + 1 } else { 0 };
            for j in start..elements.len() {
                if i == j {
                    continue;
                }
                test_pair(elements, i, j);
            }
        }

        self.collision_time = stopwatch.elapsed();
    }

    /// Duration of the most recent collision pass
    pub fn collision_time(&self) -> Duration {
        self.collision_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat3, Vec3};
    use crate::physics::element::ElementId;

    fn boxed_element(id: u32, position: Vec3, half: f32) -> SpatialElement {
        let mut element = SpatialElement::new(
            ElementId::new(id),
            position,
            (3.0f32).sqrt() * half,
        );
        element.set_object_space_bounds(
            Vec3::new(-half, -half, -half),
            Vec3::new(half, half, half),
        );
        element.update(&Mat3::identity());
        element
    }

    #[test]
    fn test_separated_pair_not_marked() {
        let mut elements = vec![
            boxed_element(0, Vec3::new(0.0, 0.0, 0.0), 1.0),
            boxed_element(1, Vec3::new(5.0, 0.0, 0.0), 1.0),
        ];
        let mut structure = BruteforceStructure::new();
        structure.update(&mut elements);
        assert!(!elements[0].is_colliding());
        assert!(!elements[1].is_colliding());
    }

    #[test]
    fn test_overlapping_pair_marked_on_both() {
        let mut elements = vec![
            boxed_element(0, Vec3::new(0.0, 0.0, 0.0), 1.0),
            boxed_element(1, Vec3::new(1.0, 0.0, 0.0), 1.0),
        ];
        let mut structure = BruteforceStructure::new();
        structure.update(&mut elements);
        assert!(elements[0].is_colliding());
        assert!(elements[1].is_colliding());
    }

    #[test]
    fn test_smart_and_symmetric_modes_agree() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.5, 0.5, 0.0),
            Vec3::new(8.0, 0.0, 0.0),
            Vec3::new(8.5, 0.5, -0.5),
            Vec3::new(-6.0, 4.0, 2.0),
        ];
        let build = || -> Vec<SpatialElement> {
            positions
                .iter()
                .enumerate()
                .map(|(i, p)| boxed_element(i as u32, *p, 1.0))
                .collect()
        };

        let mut smart = build();
        let mut structure = BruteforceStructure::new();
        structure.update(&mut smart);

        let mut symmetric = build();
        structure.set_smart_pairs(false);
        structure.update(&mut symmetric);

        for (a, b) in smart.iter().zip(&symmetric) {
            assert_eq!(a.is_colliding(), b.is_colliding());
        }
    }

    #[test]
    fn test_precheck_skips_only_disjoint_pairs() {
        let mut without = vec![
            boxed_element(0, Vec3::new(0.0, 0.0, 0.0), 1.0),
            boxed_element(1, Vec3::new(1.0, 1.0, 0.0), 1.0),
        ];
        let mut with = without.clone();
        for element in &mut with {
            element.sphere_precheck(true);
        }

        let mut structure = BruteforceStructure::new();
        structure.update(&mut without);
        structure.update(&mut with);

        for (a, b) in without.iter().zip(&with) {
            assert_eq!(a.is_colliding(), b.is_colliding());
        }
    }

    #[test]
    fn test_caller_owns_flag_clearing() {
        let mut elements = vec![
            boxed_element(0, Vec3::new(0.0, 0.0, 0.0), 1.0),
            boxed_element(1, Vec3::new(5.0, 0.0, 0.0), 1.0),
        ];
        elements[0].set_colliding(true);

        let mut structure = BruteforceStructure::new();
        structure.update(&mut elements);

        // The pass never clears a stale flag; that is the caller's job.
        assert!(elements[0].is_colliding());
    }
}
