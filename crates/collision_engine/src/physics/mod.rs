//! Collision detection core
//!
//! Bounding volumes and narrow-phase tests, the collidable element type,
//! and the per-frame pipeline that drives the spatial structures.

pub mod element;
pub mod pipeline;
pub mod primitives;

pub use element::{sphere_overlap, CollisionKind, ElementId, SpatialElement};
pub use pipeline::{CollisionPipeline, PipelineFlags, PipelineStage, StructureKind, TransformAccess};
pub use primitives::{Aabb, BoundingSphere, Obb};
