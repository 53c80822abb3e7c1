//! # Collision Engine
//!
//! A frame-stepped 3D collision detection engine.
//!
//! ## Features
//!
//! - **Bounding Volumes**: AABB and OBB narrow-phase tests with an optional
//!   bounding-sphere broad-phase filter
//! - **Interchangeable Structures**: brute-force all-pairs and octree spatial
//!   partitioning with identical collision semantics
//! - **Deterministic Pipeline**: a fixed per-frame sequence (clear, advance,
//!   recompute, refresh, structure update, aggregate)
//! - **Built-In Profiling**: separate timers for transform update, bound
//!   recompute, and structure rebuild/collision phases
//!
//! ## Quick Start
//!
//! ```rust
//! use collision_engine::prelude::*;
//!
//! let mut pipeline = CollisionPipeline::new(25.0, 4);
//! let a = pipeline.add_element(Vec3::new(0.0, 0.0, 0.0), 1.8);
//! let b = pipeline.add_element(Vec3::new(1.0, 0.0, 0.0), 1.8);
//! for id in [a, b] {
//!     let element = pipeline.element_mut(id);
//!     element.set_object_space_bounds(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
//! }
//!
//! pipeline.step_frame(1.0 / 60.0, StructureKind::Octree);
//! assert_eq!(pipeline.colliding_count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SimulationConfig},
        foundation::{
            math::{Mat3, Mat3Ext, Vec3},
            time::{Stopwatch, Timer},
        },
        physics::{
            element::{CollisionKind, ElementId, SpatialElement},
            pipeline::{
                CollisionPipeline, PipelineFlags, PipelineStage, StructureKind, TransformAccess,
            },
            primitives::{Aabb, BoundingSphere, Obb},
        },
        spatial::{BruteforceStructure, OctreeStructure},
    };
}
