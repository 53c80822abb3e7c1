//! Spatial structures for the per-frame collision pass
//!
//! Two interchangeable implementations run the same pairwise narrow-phase
//! algorithm: [`BruteforceStructure`] over every pair, and
//! [`OctreeStructure`] restricted to spatially-local groups. For any fixed
//! element configuration both report the identical set of colliding
//! elements; the octree differs in cost only.
//!
//! Neither structure clears colliding flags. The caller resets them before
//! each update, which keeps the two substitutable with identical side
//! effects.

pub mod bruteforce;
pub mod octree;

pub use bruteforce::BruteforceStructure;
pub use octree::{NodeId, OctreeNode, OctreeStructure};
