//! Primitive bounding volumes and intersection algorithms
//!
//! Provides the bounding volumes used by the collision engine (AABB, OBB,
//! bounding sphere) with their overlap tests. The AABB test is a per-axis
//! interval comparison; the OBB test is a separating-axis test; the sphere
//! test is the broad-phase filter run ahead of either.

use crate::foundation::math::{Mat3, Vec3};

/// Axis-Aligned Bounding Box in world space
///
/// `min` and `max` are opposite corners; `min <= max` holds component-wise
/// at all times. A degenerate box with `min == max` behaves as a point and
/// still satisfies the overlap tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(
            min.x <= max.x && min.y <= max.y && min.z <= max.z,
            "AABB corners out of order: min {min:?}, max {max:?}"
        );
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Create the world-space AABB of an object-space box under rotation
    /// and translation
    ///
    /// Projects the rotated half-extents onto the world axes, so the result
    /// is the tightest axis-aligned box containing every rotated corner.
    pub fn from_rotated_box(local_min: Vec3, local_max: Vec3, rotation: &Mat3, translation: Vec3) -> Self {
        let local_center = (local_min + local_max) * 0.5;
        let local_extents = (local_max - local_min) * 0.5;
        let center = translation + rotation * local_center;
        let extents = rotation.abs() * local_extents;
        Self::from_center_extents(center, extents)
    }

    /// Create the AABB enclosing a non-empty set of points
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut iter = points.into_iter();
        let first = iter.next().expect("AABB requires at least one point");
        let mut min = first;
        let mut max = first;
        for p in iter {
            min = min.inf(&p);
            max = max.sup(&p);
        }
        Self { min, max }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check that `min <= max` holds component-wise
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Check if this AABB fully contains another AABB
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
            && self.min.y <= other.min.y && self.max.y >= other.max.y
            && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Check if this AABB intersects another AABB
    ///
    /// True iff the interval projections overlap on all three axes. Boxes
    /// sharing only a face, edge, or corner count as intersecting.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }
}

/// Oriented Bounding Box in world space
#[derive(Debug, Clone, Copy)]
pub struct Obb {
    /// Center of the box in world space
    pub center: Vec3,
    /// Half-extents along the box's local axes (components are >= 0)
    pub half_extents: Vec3,
    /// Orientation of the box; columns are the local axes in world space
    pub rotation: Mat3,
}

impl Obb {
    /// Create a new OBB
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Mat3) -> Self {
        debug_assert!(
            half_extents.x >= 0.0 && half_extents.y >= 0.0 && half_extents.z >= 0.0,
            "OBB half-extents must be non-negative: {half_extents:?}"
        );
        Self {
            center,
            half_extents,
            rotation,
        }
    }

    /// Create the world-space OBB of an object-space box under rotation
    /// and translation
    pub fn from_local_box(local_min: Vec3, local_max: Vec3, rotation: &Mat3, translation: Vec3) -> Self {
        let local_center = (local_min + local_max) * 0.5;
        let half_extents = (local_max - local_min) * 0.5;
        Self::new(translation + rotation * local_center, half_extents, *rotation)
    }

    /// Get the box's local axes in world space
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation.column(0).into_owned(),
            self.rotation.column(1).into_owned(),
            self.rotation.column(2).into_owned(),
        ]
    }

    /// Test if this OBB intersects another OBB
    ///
    /// Separating-axis test over the 15 candidate axes: the three face
    /// normals of each box plus the nine pairwise edge cross products.
    /// True iff no separating axis is found.
    pub fn intersects(&self, other: &Obb) -> bool {
        const EPSILON: f32 = 0.000001;

        let a_axes = self.axes();
        let b_axes = other.axes();
        let t = other.center - self.center;

        // Projection radius of a box onto an axis: sum of the projected
        // half-extent contributions of its three local axes.
        let separated_on = |axis: &Vec3| -> bool {
            let length_sq = axis.magnitude_squared();
            if length_sq < EPSILON {
                return false; // Degenerate axis (parallel edges), skip
            }

            let r_a = self.half_extents.x * a_axes[0].dot(axis).abs()
                + self.half_extents.y * a_axes[1].dot(axis).abs()
                + self.half_extents.z * a_axes[2].dot(axis).abs();
            let r_b = other.half_extents.x * b_axes[0].dot(axis).abs()
                + other.half_extents.y * b_axes[1].dot(axis).abs()
                + other.half_extents.z * b_axes[2].dot(axis).abs();

            t.dot(axis).abs() > r_a + r_b
        };

        // Face normals of both boxes
        for axis in a_axes.iter().chain(b_axes.iter()) {
            if separated_on(axis) {
                return false;
            }
        }

        // Edge-edge cross products
        for a_axis in &a_axes {
            for b_axis in &b_axes {
                let axis = a_axis.cross(b_axis);
                if separated_on(&axis) {
                    return false;
                }
            }
        }

        // No separating axis found = boxes intersect
        true
    }
}

/// A bounding sphere for broad-phase filtering
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Compute the radius of the sphere around `center` enclosing every
    /// vertex of a collision mesh or hull proxy
    ///
    /// The result upper-bounds the geometric extent under any rotation
    /// about the center, which is what makes the sphere pre-check safe to
    /// use as a broad-phase filter.
    pub fn enclosing_radius(center: Vec3, vertices: &[Vec3]) -> f32 {
        let mut max_distance_sq = 0.0f32;
        for vertex in vertices {
            let dist_sq = (vertex - center).magnitude_squared();
            max_distance_sq = max_distance_sq.max(dist_sq);
        }
        max_distance_sq.sqrt()
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat3Ext;
    use std::f32::consts::PI;

    #[test]
    fn test_aabb_overlap_on_all_axes() {
        let a = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(0.0, -1.0, -1.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_aabb_separated_on_one_axis() {
        let a = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(4.0, -1.0, -1.0), Vec3::new(6.0, 1.0, 1.0));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_aabb_touching_faces_intersect() {
        let a = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Vec3::new(1.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_degenerate_aabb_is_a_point() {
        let point = Aabb::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(0.5, 0.5, 0.5));
        let inside = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let outside = Aabb::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));
        assert!(point.intersects(&inside));
        assert!(inside.intersects(&point));
        assert!(!point.intersects(&outside));
    }

    #[test]
    fn test_rotated_box_aabb_stays_valid() {
        let rotation = Mat3::rotation_z(PI / 3.0);
        let aabb = Aabb::from_rotated_box(
            Vec3::new(-1.0, -2.0, -0.5),
            Vec3::new(1.0, 2.0, 0.5),
            &rotation,
            Vec3::new(3.0, -4.0, 5.0),
        );
        assert!(aabb.is_valid());
        // Rotating can only grow the axis-aligned projection
        assert!(aabb.extents().x >= 1.0 - 1e-6);
    }

    #[test]
    fn test_obb_aligned_overlap() {
        let a = Obb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Mat3::identity());
        let b = Obb::new(Vec3::new(1.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), Mat3::identity());
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_obb_rotation_opens_gap() {
        // Two unit cubes 2.3 apart on x: separated when axis-aligned (faces
        // at 1.0 and 1.3), but a 45-degree twist extends the first box's
        // reach to sqrt(2) > 1.3.
        let a_aligned = Obb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Mat3::identity());
        let b = Obb::new(Vec3::new(2.3, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), Mat3::identity());
        assert!(!a_aligned.intersects(&b));

        let a_rotated = Obb::new(
            Vec3::zeros(),
            Vec3::new(1.0, 1.0, 1.0),
            Mat3::rotation_z(PI / 4.0),
        );
        assert!(a_rotated.intersects(&b));
        assert!(b.intersects(&a_rotated));
    }

    #[test]
    fn test_obb_separated_when_far_apart() {
        let a = Obb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Mat3::rotation_y(0.7));
        let b = Obb::new(
            Vec3::new(0.0, 5.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Mat3::rotation_x(1.2),
        );
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_sphere_overlap_is_conservative_for_aabbs() {
        // Any pair of overlapping AABBs must also overlap as enclosing
        // spheres: the center distance is bounded per axis by the sum of
        // half-extents, so its norm is bounded by the radius sum.
        let he_a = Vec3::new(1.0, 2.0, 0.5);
        let he_b = Vec3::new(0.75, 1.25, 2.0);
        let centers = [
            Vec3::new(1.5, 2.0, -1.0),
            Vec3::new(-1.7, 3.1, 2.4),
            Vec3::new(0.0, -3.2, 1.0),
        ];
        for center_b in centers {
            let a = Aabb::from_center_extents(Vec3::zeros(), he_a);
            let b = Aabb::from_center_extents(center_b, he_b);
            if a.intersects(&b) {
                let sphere_a = BoundingSphere::new(Vec3::zeros(), he_a.magnitude());
                let sphere_b = BoundingSphere::new(center_b, he_b.magnitude());
                assert!(sphere_a.intersects(&sphere_b));
            }
        }
    }

    #[test]
    fn test_enclosing_radius_bounds_all_vertices() {
        let vertices = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-2.0, 1.0, 0.0),
            Vec3::new(0.5, 0.5, 3.0),
        ];
        let radius = BoundingSphere::enclosing_radius(Vec3::zeros(), &vertices);
        for v in vertices {
            assert!(v.magnitude() <= radius + 1e-6);
        }
    }
}
