//! Collidable entities tracked by the spatial structures
//!
//! A [`SpatialElement`] wraps one entity's bounding state: its object-space
//! box, its authoritative world-space volume (AABB or OBB, selected by
//! [`CollisionKind`]), a bounding-sphere radius for the broad-phase
//! pre-check, and the per-frame colliding flag.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat3, Vec3};
use crate::physics::primitives::{Aabb, BoundingSphere, Obb};

/// Stable identifier of an element within a pipeline's collection
///
/// Assigned at creation, never reused. Doubles as the element's index into
/// the pipeline's element vector, which is how the spatial structures refer
/// back to elements without copying them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    id: u32,
}

impl ElementId {
    /// Create a new element ID
    pub(crate) fn new(id: u32) -> Self {
        Self { id }
    }

    /// Get the raw ID
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Get the element's index into its owning collection
    pub fn index(&self) -> usize {
        self.id as usize
    }
}

/// Narrow-phase test an element participates in
///
/// The set of kinds is closed and fixed, so dispatch is an exhaustive
/// `match` at the call site rather than a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Axis-aligned box vs. axis-aligned box interval test
    AabbVsAabb,
    /// Oriented box vs. oriented box separating-axis test
    ObbVsObb,
}

/// One collidable entity
///
/// The element retains both AABB and OBB state, but only the volume
/// selected by its [`CollisionKind`] is authoritative in a given frame.
/// The world AABB is refreshed unconditionally because the octree places
/// elements by it regardless of the active narrow-phase test.
#[derive(Debug, Clone)]
pub struct SpatialElement {
    id: ElementId,
    position: Vec3,
    velocity: Vec3,
    local_min: Vec3,
    local_max: Vec3,
    radius: f32,
    kind: CollisionKind,
    colliding: bool,
    sphere_precheck: bool,
    /// Object-space vertex set (full mesh or convex-hull proxy) used for
    /// the opt-in exact AABB recomputation
    collision_vertices: Option<Vec<Vec3>>,
    /// Set when the AABB was re-derived from transformed vertices this
    /// frame; consumed by the next `update` so it does not overwrite the
    /// tighter bounds with the box-derived ones
    exact_bounds: bool,
    aabb: Aabb,
    obb: Obb,
}

impl SpatialElement {
    /// Create a new element at a position with a bounding-sphere radius
    ///
    /// The radius must upper-bound the element's true geometric extent.
    /// A radius of zero degrades the sphere pre-check to "always overlap",
    /// which is valid (the narrow test still decides) but filters nothing.
    ///
    /// # Panics
    /// Panics if `radius` is negative.
    pub fn new(id: ElementId, position: Vec3, radius: f32) -> Self {
        assert!(radius >= 0.0, "bounding-sphere radius must be non-negative, got {radius}");
        Self {
            id,
            position,
            velocity: Vec3::zeros(),
            local_min: Vec3::zeros(),
            local_max: Vec3::zeros(),
            radius,
            kind: CollisionKind::AabbVsAabb,
            colliding: false,
            sphere_precheck: false,
            collision_vertices: None,
            exact_bounds: false,
            aabb: Aabb::from_center_extents(position, Vec3::zeros()),
            obb: Obb::new(position, Vec3::zeros(), Mat3::identity()),
        }
    }

    /// Get the element's ID
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Get the element's world position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Set the element's world position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Get the element's velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Set the element's velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Get the object-space bounds (before translation/rotation)
    pub fn object_space_bounds(&self) -> (Vec3, Vec3) {
        (self.local_min, self.local_max)
    }

    /// Set the object-space bounds (before translation/rotation)
    ///
    /// # Panics
    /// Panics if `min > max` on any axis.
    pub fn set_object_space_bounds(&mut self, min: Vec3, max: Vec3) {
        assert!(
            min.x <= max.x && min.y <= max.y && min.z <= max.z,
            "object-space bounds out of order: min {min:?}, max {max:?}"
        );
        self.local_min = min;
        self.local_max = max;
    }

    /// Get the bounding-sphere radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Set the bounding-sphere radius
    ///
    /// # Panics
    /// Panics if `radius` is negative.
    pub fn set_radius(&mut self, radius: f32) {
        assert!(radius >= 0.0, "bounding-sphere radius must be non-negative, got {radius}");
        self.radius = radius;
    }

    /// Get the active narrow-phase kind
    pub fn collision_kind(&self) -> CollisionKind {
        self.kind
    }

    /// Select which narrow-phase test this element participates in
    pub fn set_collision_kind(&mut self, kind: CollisionKind) {
        self.kind = kind;
    }

    /// Check whether the element collided this frame
    pub fn is_colliding(&self) -> bool {
        self.colliding
    }

    /// Set the colliding flag
    pub fn set_colliding(&mut self, colliding: bool) {
        self.colliding = colliding;
    }

    /// Check whether the sphere pre-check runs before this element's
    /// narrow-phase tests
    pub fn sphere_precheck_enabled(&self) -> bool {
        self.sphere_precheck
    }

    /// Enable or disable the sphere pre-check for this element
    ///
    /// Purely a performance toggle; results are unchanged either way.
    pub fn sphere_precheck(&mut self, enabled: bool) {
        self.sphere_precheck = enabled;
    }

    /// Attach an object-space vertex set for exact AABB recomputation
    ///
    /// # Panics
    /// Panics if `vertices` is empty.
    pub fn set_collision_vertices(&mut self, vertices: Vec<Vec3>) {
        assert!(!vertices.is_empty(), "collision vertex set must not be empty");
        self.collision_vertices = Some(vertices);
    }

    /// Check whether the element carries a collision vertex set
    pub fn has_collision_vertices(&self) -> bool {
        self.collision_vertices.is_some()
    }

    /// The element's bounding sphere, centered at its position
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.position, self.radius)
    }

    /// The element's current world-space AABB
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// The element's current world-space OBB
    pub fn obb(&self) -> &Obb {
        &self.obb
    }

    /// Recompute the world-space volumes from the object-space bounds, the
    /// current position, and the given rotation
    ///
    /// The AABB is always refreshed (the octree places elements by it); the
    /// OBB is refreshed when it is the authoritative volume. If
    /// [`recompute_aabb_from_vertices`](Self::recompute_aabb_from_vertices)
    /// already produced exact bounds this frame, those are kept.
    pub fn update(&mut self, rotation: &Mat3) {
        if self.exact_bounds {
            self.exact_bounds = false;
        } else {
            self.aabb = Aabb::from_rotated_box(self.local_min, self.local_max, rotation, self.position);
        }
        debug_assert!(self.aabb.is_valid(), "world AABB invalid after update");

        if self.kind == CollisionKind::ObbVsObb {
            self.obb = Obb::from_local_box(self.local_min, self.local_max, rotation, self.position);
        }
    }

    /// Re-derive the world AABB from the transformed collision vertex set
    ///
    /// Strictly tighter than the rotated-box projection but O(vertex count),
    /// so it is an explicit opt-in gated by the pipeline. Does nothing if
    /// the element carries no vertices.
    pub fn recompute_aabb_from_vertices(&mut self, rotation: &Mat3) {
        if let Some(vertices) = &self.collision_vertices {
            self.aabb = Aabb::from_points(
                vertices.iter().map(|v| self.position + rotation * v),
            );
            self.exact_bounds = true;
            debug_assert!(self.aabb.is_valid(), "world AABB invalid after vertex recompute");
        }
    }
}

/// Broad-phase bounding-sphere pre-check between two elements
///
/// Conservative: never returns `false` for a pair whose true bounds
/// overlap, provided each radius upper-bounds its element's extent.
/// Disabling it changes performance only, never results.
pub fn sphere_overlap(a: &SpatialElement, b: &SpatialElement) -> bool {
    a.bounding_sphere().intersects(&b.bounding_sphere())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat3Ext;
    use std::f32::consts::PI;

    fn unit_element(id: u32, position: Vec3) -> SpatialElement {
        let mut element = SpatialElement::new(ElementId::new(id), position, 3.0f32.sqrt());
        element.set_object_space_bounds(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        element
    }

    #[test]
    fn test_update_produces_valid_bounds() {
        let mut element = unit_element(0, Vec3::new(2.0, -3.0, 4.0));
        for i in 0..16 {
            let rotation = Mat3::rotation_euler(0.3 * i as f32, 0.7 * i as f32, 1.1 * i as f32);
            element.update(&rotation);
            assert!(element.aabb().is_valid());
        }
    }

    #[test]
    fn test_update_translates_bounds() {
        let mut element = unit_element(0, Vec3::new(5.0, 0.0, 0.0));
        element.update(&Mat3::identity());
        assert_eq!(element.aabb().min, Vec3::new(4.0, -1.0, -1.0));
        assert_eq!(element.aabb().max, Vec3::new(6.0, 1.0, 1.0));
    }

    #[test]
    fn test_obb_refreshed_only_when_authoritative() {
        let mut element = unit_element(0, Vec3::zeros());
        element.update(&Mat3::rotation_z(PI / 4.0));
        // Aabb-kind element keeps its identity-rotation OBB
        assert_eq!(element.obb().half_extents, Vec3::zeros());

        element.set_collision_kind(CollisionKind::ObbVsObb);
        element.update(&Mat3::rotation_z(PI / 4.0));
        assert_eq!(element.obb().half_extents, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_vertex_recompute_is_tighter_and_sticks() {
        let mut element = unit_element(0, Vec3::zeros());
        element.set_collision_vertices(vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
        ]);

        let rotation = Mat3::rotation_z(PI / 4.0);
        element.update(&rotation);
        let projected = *element.aabb();

        element.recompute_aabb_from_vertices(&rotation);
        let exact = *element.aabb();
        assert!(projected.contains(&exact));

        // The refresh that follows in the same frame must keep the exact box
        element.update(&rotation);
        assert_eq!(*element.aabb(), exact);

        // The next frame falls back to the projected box
        element.update(&rotation);
        assert_eq!(*element.aabb(), projected);
    }

    #[test]
    fn test_zero_radius_sphere_check_never_filters_coincident() {
        let a = unit_element(0, Vec3::zeros());
        let b = unit_element(1, Vec3::zeros());
        let mut a = a;
        let mut b = b;
        a.set_radius(0.0);
        b.set_radius(0.0);
        // Coincident zero spheres still overlap (distance 0 <= 0)
        assert!(sphere_overlap(&a, &b));
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn test_negative_radius_rejected() {
        let _ = SpatialElement::new(ElementId::new(0), Vec3::zeros(), -1.0);
    }

    #[test]
    #[should_panic(expected = "out of order")]
    fn test_inverted_bounds_rejected() {
        let mut element = unit_element(0, Vec3::zeros());
        element.set_object_space_bounds(Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
    }
}
