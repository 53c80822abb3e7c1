//! Per-frame collision pipeline
//!
//! Owns the element collection and both spatial structures, and runs the
//! fixed six-step frame sequence: clear flags, advance dynamic elements,
//! optionally re-derive exact bounds, refresh world volumes, run the one
//! active structure, aggregate results. Each step depends on the previous
//! step's output, so the order is strict; only the bounds recompute is
//! flag-gated.

use std::time::Duration;

use bitflags::bitflags;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat3, Vec3};
use crate::foundation::time::Stopwatch;
use crate::physics::element::{CollisionKind, ElementId, SpatialElement};
use crate::spatial::{BruteforceStructure, OctreeStructure};

bitflags! {
    /// Per-frame pipeline options
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PipelineFlags: u32 {
        /// Advance elements by their velocity during the transform step
        const MOVE_OBJECTS = 1 << 0;

        /// Re-derive world AABBs from collision vertices each frame.
        /// O(vertex count) per element, hence opt-in.
        const RECOMPUTE_BOUNDS = 1 << 1;

        /// Deduplicate pairs in the pairwise passes (`i < j`). Clearing
        /// this retests pairs symmetrically; results are unchanged, only
        /// the scalar cost doubles.
        const SMART_PAIRS = 1 << 2;
    }
}

/// Which spatial structure runs the collision pass for a frame
///
/// Exactly one structure is active per frame; switching between frames is
/// legal, switching within a frame is not expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    /// All-pairs reference pass
    Bruteforce,
    /// Octree-partitioned pass
    Octree,
}

/// Data-access variant of the transform-update step
///
/// Both produce bit-identical positions; they exist to measure
/// cache-locality effects of the access pattern, not to change semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformAccess {
    /// Re-index the element vector on every iteration
    Indexed,
    /// Iterate over cached element references
    Cached,
}

/// Progress of the pipeline through its frame sequence
///
/// `step_frame` walks Idle -> ClearFlags -> TransformUpdate ->
/// BoundsRecompute -> ElementRefresh -> StructureUpdate -> Aggregate and
/// back to Idle before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Between frames
    Idle,
    /// Resetting colliding flags
    ClearFlags,
    /// Advancing dynamic elements
    TransformUpdate,
    /// Re-deriving exact AABBs from vertices (flag-gated)
    BoundsRecompute,
    /// Refreshing world-space volumes
    ElementRefresh,
    /// Running the active spatial structure
    StructureUpdate,
    /// Counting colliding elements
    Aggregate,
}

/// Per-frame collision pipeline and element owner
///
/// The pipeline exclusively owns the element collection and both structure
/// instances; the structures operate on borrowed slices and never copy
/// element data. Single-threaded and frame-stepped: one `step_frame` call
/// runs to completion before the next begins.
pub struct CollisionPipeline {
    elements: Vec<SpatialElement>,
    /// Per-element orientation fed into the volume refresh
    rotations: Vec<Mat3>,
    bruteforce: BruteforceStructure,
    octree: OctreeStructure,
    /// Half-extent of the cubic bounce volume
    half_extent: f32,
    speed: f32,
    flags: PipelineFlags,
    transform_access: TransformAccess,
    stage: PipelineStage,
    transform_time: Duration,
    recompute_time: Duration,
    colliding_count: usize,
    frame: u64,
}

impl CollisionPipeline {
    /// Create a pipeline for a cubic volume of the given half-extent
    ///
    /// The octree covers the same volume; elements that momentarily escape
    /// it are kept at the octree root, never dropped.
    pub fn new(half_extent: f32, octree_max_depth: u8) -> Self {
        Self {
            elements: Vec::new(),
            rotations: Vec::new(),
            bruteforce: BruteforceStructure::new(),
            octree: OctreeStructure::new(Vec3::zeros(), half_extent, octree_max_depth),
            half_extent,
            speed: 1.0,
            flags: PipelineFlags::MOVE_OBJECTS | PipelineFlags::SMART_PAIRS,
            transform_access: TransformAccess::Cached,
            stage: PipelineStage::Idle,
            transform_time: Duration::ZERO,
            recompute_time: Duration::ZERO,
            colliding_count: 0,
            frame: 0,
        }
    }

    /// Create an element at a position with a bounding-sphere radius
    ///
    /// IDs are assigned sequentially and never reused; elements live until
    /// the pipeline is dropped.
    pub fn add_element(&mut self, position: Vec3, radius: f32) -> ElementId {
        let id = ElementId::new(self.elements.len() as u32);
        self.elements.push(SpatialElement::new(id, position, radius));
        self.rotations.push(Mat3::identity());
        id
    }

    /// All elements, in ID order
    pub fn elements(&self) -> &[SpatialElement] {
        &self.elements
    }

    /// One element by ID
    pub fn element(&self, id: ElementId) -> &SpatialElement {
        &self.elements[id.index()]
    }

    /// Mutable access to one element by ID
    pub fn element_mut(&mut self, id: ElementId) -> &mut SpatialElement {
        &mut self.elements[id.index()]
    }

    /// Set an element's orientation for the volume refresh
    pub fn set_rotation(&mut self, id: ElementId, rotation: Mat3) {
        self.rotations[id.index()] = rotation;
    }

    /// Select the narrow-phase test for every element
    pub fn set_collision_kind(&mut self, kind: CollisionKind) {
        for element in &mut self.elements {
            element.set_collision_kind(kind);
        }
    }

    /// Enable or disable the sphere pre-check on every element
    pub fn set_sphere_precheck(&mut self, enabled: bool) {
        for element in &mut self.elements {
            element.sphere_precheck(enabled);
        }
    }

    /// Scalar velocity multiplier used by the transform step
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the velocity multiplier
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Current frame options
    pub fn flags(&self) -> PipelineFlags {
        self.flags
    }

    /// Replace the frame options
    pub fn set_flags(&mut self, flags: PipelineFlags) {
        self.flags = flags;
    }

    /// Select the transform-update data-access variant
    pub fn set_transform_access(&mut self, access: TransformAccess) {
        self.transform_access = access;
    }

    /// Current pipeline stage (`Idle` between frames)
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Number of elements that collided in the most recent frame
    pub fn colliding_count(&self) -> usize {
        self.colliding_count
    }

    /// Duration of the most recent transform-update step
    pub fn transform_time(&self) -> Duration {
        self.transform_time
    }

    /// Duration of the most recent bounds-recompute step
    pub fn recompute_time(&self) -> Duration {
        self.recompute_time
    }

    /// The octree structure (for its phase timings and node statistics)
    pub fn octree(&self) -> &OctreeStructure {
        &self.octree
    }

    /// The brute-force structure (for its pass timing)
    pub fn bruteforce(&self) -> &BruteforceStructure {
        &self.bruteforce
    }

    /// Number of frames stepped so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run one frame against the selected structure
    ///
    /// The six steps run in strict order; only the bounds recompute is
    /// skipped when its flag is clear. The structure choice applies to
    /// this frame only, so callers may alternate between frames.
    pub fn step_frame(&mut self, dt: f32, structure: StructureKind) {
        // 1. Reset collision state; the structures only ever set flags.
        self.stage = PipelineStage::ClearFlags;
        for element in &mut self.elements {
            element.set_colliding(false);
        }

        // 2. Advance elements, bouncing off the six volume walls.
        self.stage = PipelineStage::TransformUpdate;
        let stopwatch = Stopwatch::start_new();
        if self.flags.contains(PipelineFlags::MOVE_OBJECTS) {
            let bound = self.half_extent;
            let (speed, dt) = (self.speed, dt);
            match self.transform_access {
                TransformAccess::Indexed => {
                    for i in 0..self.elements.len() {
                        Self::advance(&mut self.elements[i], speed, dt, bound);
                    }
                }
                TransformAccess::Cached => {
                    for element in self.elements.iter_mut() {
                        Self::advance(element, speed, dt, bound);
                    }
                }
            }
        }
        self.transform_time = stopwatch.elapsed();

        // 3. Optional exact AABB recompute from collision vertices.
        self.stage = PipelineStage::BoundsRecompute;
        let stopwatch = Stopwatch::start_new();
        if self.flags.contains(PipelineFlags::RECOMPUTE_BOUNDS) {
            for (element, rotation) in self.elements.iter_mut().zip(&self.rotations) {
                element.recompute_aabb_from_vertices(rotation);
            }
        }
        self.recompute_time = stopwatch.elapsed();

        // 4. Refresh world-space volumes from the new positions.
        self.stage = PipelineStage::ElementRefresh;
        for (element, rotation) in self.elements.iter_mut().zip(&self.rotations) {
            element.update(rotation);
        }

        // 5. Run exactly one structure's collision pass.
        self.stage = PipelineStage::StructureUpdate;
        let smart = self.flags.contains(PipelineFlags::SMART_PAIRS);
        match structure {
            StructureKind::Bruteforce => {
                self.bruteforce.set_smart_pairs(smart);
                self.bruteforce.update(&mut self.elements);
            }
            StructureKind::Octree => {
                self.octree.set_smart_pairs(smart);
                self.octree.update(&mut self.elements);
            }
        }

        // 6. Aggregate.
        self.stage = PipelineStage::Aggregate;
        self.colliding_count = self.elements.iter().filter(|e| e.is_colliding()).count();

        self.frame += 1;
        debug!(
            "frame {}: {} colliding, transform {:?}, recompute {:?}",
            self.frame, self.colliding_count, self.transform_time, self.recompute_time
        );
        self.stage = PipelineStage::Idle;
    }

    /// Advance one element and reflect its velocity off the volume walls
    ///
    /// For each axis-aligned wall with outward normal `n`, an element whose
    /// AABB would cross the wall gets `v' = v - 2 (v . n) n`, which for
    /// axis-aligned walls reduces to flipping the perpendicular component.
    /// Shared by both `TransformAccess` variants so their outputs stay
    /// bit-identical.
    fn advance(element: &mut SpatialElement, speed: f32, dt: f32, bound: f32) {
        let extents = element.aabb().extents();
        let mut position = element.position();
        let mut velocity = element.velocity();

        for axis in 0..3 {
            let next = position[axis] + velocity[axis] * speed * dt;
            if (next + extents[axis] > bound && velocity[axis] > 0.0)
                || (next - extents[axis] < -bound && velocity[axis] < 0.0)
            {
                velocity[axis] = -velocity[axis];
            }
            position[axis] += velocity[axis] * speed * dt;
        }

        element.set_position(position);
        element.set_velocity(velocity);
    }
}
