//! Octree spatial partitioning structure
//!
//! Recursively subdivides a cubic volume into eight octants to localize
//! collision candidates. Nodes live in an arena and reference their
//! children by index; node bounds are fixed at construction, while object
//! lists are cleared and re-populated from scratch every frame.

use std::time::Duration;

use crate::foundation::time::Stopwatch;
use crate::foundation::math::Vec3;
use crate::physics::element::{ElementId, SpatialElement};
use crate::physics::primitives::Aabb;
use crate::spatial::bruteforce::{cross_pass, pairwise_pass};

/// Index of a node within the octree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId {
    id: u32,
}

impl NodeId {
    fn new(id: u32) -> Self {
        Self { id }
    }

    /// Get the node's index into the arena
    pub fn index(&self) -> usize {
        self.id as usize
    }
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// World-space bounds of this node
    pub bounds: Aabb,

    /// Child nodes by octant, `None` where no element ever descended
    pub children: [Option<NodeId>; 8],

    /// Elements whose world AABB this node is the smallest full container of
    pub objects: Vec<ElementId>,

    /// Depth in the tree (0 = root)
    pub depth: u8,
}

impl OctreeNode {
    fn new(bounds: Aabb, depth: u8) -> Self {
        Self {
            bounds,
            children: [None; 8],
            objects: Vec::new(),
            depth,
        }
    }

    /// Check if this node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Octree collision structure
///
/// Each frame the tree is rebuilt by clearing every node's object list and
/// re-inserting all elements against the fixed node hierarchy, then the
/// pairwise collision pass runs per node. Both phases are timed separately
/// because they scale differently: rebuild is O(n * depth), the collision
/// pass depends on per-node occupancy.
pub struct OctreeStructure {
    /// Node arena; index 0 is the root
    nodes: Vec<OctreeNode>,
    max_depth: u8,
    smart_pairs: bool,
    rebuild_time: Duration,
    collision_time: Duration,
}

impl OctreeStructure {
    /// Create a new octree covering the cube `center +- half_size`
    ///
    /// # Panics
    /// Panics if `half_size` is not positive.
    pub fn new(center: Vec3, half_size: f32, max_depth: u8) -> Self {
        assert!(half_size > 0.0, "octree half size must be positive, got {half_size}");
        let bounds = Aabb::from_center_extents(center, Vec3::new(half_size, half_size, half_size));
        Self {
            nodes: vec![OctreeNode::new(bounds, 0)],
            max_depth,
            smart_pairs: true,
            rebuild_time: Duration::ZERO,
            collision_time: Duration::ZERO,
        }
    }

    /// The root node
    pub fn root(&self) -> &OctreeNode {
        &self.nodes[0]
    }

    /// Total number of nodes in the arena
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes currently holding at least one object
    pub fn occupied_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.objects.is_empty()).count()
    }

    /// Maximum subdivision depth
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Check whether pairwise passes deduplicate pairs (`i < j`)
    pub fn smart_pairs(&self) -> bool {
        self.smart_pairs
    }

    /// Toggle pair deduplication in the per-node passes
    pub fn set_smart_pairs(&mut self, smart: bool) {
        self.smart_pairs = smart;
    }

    /// Duration of the most recent rebuild phase
    pub fn rebuild_time(&self) -> Duration {
        self.rebuild_time
    }

    /// Duration of the most recent collision pass
    pub fn collision_time(&self) -> Duration {
        self.collision_time
    }

    /// Insert all elements without clearing existing object lists
    ///
    /// Used for initial population at scene build; per-frame re-population
    /// goes through [`update`](Self::update).
    pub fn add_objects(&mut self, elements: &[SpatialElement]) {
        for element in elements {
            self.insert(element.id(), element.aabb());
        }
    }

    /// Rebuild the tree from the current element bounds, then run the
    /// per-node collision pass
    ///
    /// Callers must clear `is_colliding` on every element beforehand; the
    /// pass only ever sets the flag.
    pub fn update(&mut self, elements: &mut [SpatialElement]) {
        let stopwatch = Stopwatch::start_new();
        for node in &mut self.nodes {
            node.objects.clear();
        }
        self.add_objects(elements);
        self.rebuild_time = stopwatch.elapsed();

        let stopwatch = Stopwatch::start_new();
        let mut ancestors = Vec::new();
        self.collide_node(0, &mut ancestors, elements);
        self.collision_time = stopwatch.elapsed();
    }

    /// Bounds of one octant of a node
    ///
    /// Octant bit layout: bit 0 = +x half, bit 1 = +y half, bit 2 = +z half.
    fn octant_bounds(bounds: &Aabb, octant: usize) -> Aabb {
        let center = bounds.center();
        let quarter = bounds.extents() * 0.5;
        let child_center = Vec3::new(
            center.x + if octant & 1 != 0 { quarter.x } else { -quarter.x },
            center.y + if octant & 2 != 0 { quarter.y } else { -quarter.y },
            center.z + if octant & 4 != 0 { quarter.z } else { -quarter.z },
        );
        Aabb::from_center_extents(child_center, quarter)
    }

    /// Place one element in the smallest node fully containing its AABB
    ///
    /// Descends from the root, stopping when no child octant fully contains
    /// the box or when `max_depth` is reached. Children are created on
    /// first use and persist for the octree's lifetime. An element escaping
    /// the root volume stays at the root: dropping it would silently miss
    /// collisions.
    fn insert(&mut self, id: ElementId, aabb: &Aabb) {
        let mut current = 0usize;
        loop {
            let depth = self.nodes[current].depth;
            if depth >= self.max_depth {
                break;
            }

            let bounds = self.nodes[current].bounds;
            let center = bounds.center();
            let box_center = aabb.center();
            let octant = usize::from(box_center.x >= center.x)
                | (usize::from(box_center.y >= center.y) << 1)
                | (usize::from(box_center.z >= center.z) << 2);

            let child_bounds = Self::octant_bounds(&bounds, octant);
            if !child_bounds.contains(aabb) {
                break;
            }

            let child = match self.nodes[current].children[octant] {
                Some(node_id) => node_id.index(),
                None => {
                    let node_id = NodeId::new(self.nodes.len() as u32);
                    self.nodes.push(OctreeNode::new(child_bounds, depth + 1));
                    self.nodes[current].children[octant] = Some(node_id);
                    node_id.index()
                }
            };
            current = child;
        }

        self.nodes[current].objects.push(id);
    }

    /// Depth-first collision pass
    ///
    /// Each node runs the pairwise algorithm on its own object list, then
    /// its objects are tested against the objects inherited from ancestor
    /// nodes. A straddling element stored high in the tree therefore meets
    /// every element beneath it exactly once, which keeps the reported
    /// collision set identical to the brute-force pass.
    fn collide_node(
        &self,
        node: usize,
        ancestors: &mut Vec<ElementId>,
        elements: &mut [SpatialElement],
    ) {
        let objects = &self.nodes[node].objects;
        pairwise_pass(elements, objects, self.smart_pairs);
        cross_pass(elements, ancestors, objects);

        let inherited = ancestors.len();
        ancestors.extend_from_slice(objects);
        for child in self.nodes[node].children.iter().flatten() {
            self.collide_node(child.index(), ancestors, elements);
        }
        ancestors.truncate(inherited);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat3;
    use crate::spatial::BruteforceStructure;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

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

    fn random_scene(count: u32, extent: f32, seed: u64) -> Vec<SpatialElement> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|id| {
                let position = Vec3::new(
                    rng.gen_range(-extent..extent),
                    rng.gen_range(-extent..extent),
                    rng.gen_range(-extent..extent),
                );
                boxed_element(id, position, 1.0)
            })
            .collect()
    }

    #[test]
    fn test_straddler_stays_at_root() {
        let mut octree = OctreeStructure::new(Vec3::zeros(), 50.0, 4);
        let straddler = boxed_element(0, Vec3::zeros(), 1.0);
        let cornered = boxed_element(1, Vec3::new(10.0, 10.0, 10.0), 1.0);
        octree.add_objects(&[straddler, cornered]);

        assert_eq!(octree.root().objects, vec![ElementId::new(0)]);
        // The off-center element descended out of the root
        assert!(octree.node_count() > 1);
    }

    #[test]
    fn test_escaped_element_kept_at_root() {
        let mut octree = OctreeStructure::new(Vec3::zeros(), 10.0, 4);
        let mut runaway = boxed_element(0, Vec3::new(100.0, 0.0, 0.0), 1.0);
        let mut neighbor = boxed_element(1, Vec3::new(101.0, 0.0, 0.0), 1.0);
        runaway.update(&Mat3::identity());
        neighbor.update(&Mat3::identity());

        let mut elements = vec![runaway, neighbor];
        octree.update(&mut elements);

        assert_eq!(octree.root().objects.len(), 2);
        assert!(elements[0].is_colliding());
        assert!(elements[1].is_colliding());
    }

    #[test]
    fn test_rebuild_follows_moved_elements() {
        let mut octree = OctreeStructure::new(Vec3::zeros(), 50.0, 4);
        let mut elements = vec![boxed_element(0, Vec3::new(10.0, 10.0, 10.0), 1.0)];
        octree.update(&mut elements);
        let occupied_before = octree.occupied_node_count();
        assert_eq!(occupied_before, 1);

        elements[0].set_position(Vec3::new(-10.0, -10.0, -10.0));
        elements[0].update(&Mat3::identity());
        octree.update(&mut elements);

        // Exactly one node is occupied after the rebuild as well: the old
        // list was cleared, not appended to.
        assert_eq!(octree.occupied_node_count(), 1);
        assert!(octree.root().objects.is_empty());
    }

    #[test]
    fn test_ancestor_straddler_meets_descendants() {
        let mut octree = OctreeStructure::new(Vec3::zeros(), 50.0, 5);
        // One box straddling the root's center planes, one small box nearby
        // but fully inside the +++ octant.
        let mut elements = vec![
            boxed_element(0, Vec3::zeros(), 1.0),
            boxed_element(1, Vec3::new(1.5, 1.5, 1.5), 1.0),
        ];
        octree.update(&mut elements);

        assert!(elements[0].is_colliding());
        assert!(elements[1].is_colliding());
    }

    #[test]
    fn test_matches_bruteforce_on_random_scene() {
        for seed in [7u64, 21, 1234] {
            let mut octree_scene = random_scene(200, 24.0, seed);
            let mut brute_scene = octree_scene.clone();

            let mut octree = OctreeStructure::new(Vec3::zeros(), 25.0, 4);
            octree.update(&mut octree_scene);

            let mut brute = BruteforceStructure::new();
            brute.update(&mut brute_scene);

            let octree_set: Vec<u32> = octree_scene
                .iter()
                .filter(|e| e.is_colliding())
                .map(|e| e.id().id())
                .collect();
            let brute_set: Vec<u32> = brute_scene
                .iter()
                .filter(|e| e.is_colliding())
                .map(|e| e.id().id())
                .collect();
            assert_eq!(octree_set, brute_set, "divergence for seed {seed}");
            assert!(!octree_set.is_empty(), "scene for seed {seed} exercises nothing");
        }
    }

    #[test]
    fn test_node_bounds_fixed_across_rebuilds() {
        let mut octree = OctreeStructure::new(Vec3::zeros(), 50.0, 3);
        let mut elements = vec![boxed_element(0, Vec3::new(20.0, 20.0, 20.0), 1.0)];
        octree.update(&mut elements);
        let nodes_before = octree.node_count();
        let root_bounds = octree.root().bounds;

        octree.update(&mut elements);
        assert_eq!(octree.node_count(), nodes_before);
        assert_eq!(octree.root().bounds, root_bounds);
    }
}
