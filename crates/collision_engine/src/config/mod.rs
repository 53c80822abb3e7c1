//! Configuration system
//!
//! Scene and pipeline parameters with support for multiple config file
//! formats (TOML, RON). The engine itself never performs I/O; loading a
//! configuration is the only fallible surface of the crate.

pub use serde::{Deserialize, Serialize};

use crate::physics::element::CollisionKind;
use crate::physics::pipeline::{StructureKind, TransformAccess};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Scene and pipeline parameters for a headless simulation run
///
/// Describes everything the surrounding application feeds the pipeline:
/// element counts, the bounce volume, octree depth, and the per-frame
/// toggles. Loadable from TOML or RON via the [`Config`] trait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of moving elements in the scene
    pub dynamic_elements: usize,

    /// Number of stationary elements in the scene
    pub static_elements: usize,

    /// Half-extent of the cubic bounce volume (elements stay in
    /// `[-half_extent, +half_extent]` on each axis)
    pub volume_half_extent: f32,

    /// Half-extent of each element's object-space bounding box
    pub element_half_extent: f32,

    /// Scalar velocity multiplier applied during the transform step
    pub speed: f32,

    /// Maximum octree subdivision depth
    pub octree_max_depth: u8,

    /// Which spatial structure runs the collision pass
    pub structure: StructureKind,

    /// Which narrow-phase test the elements use
    pub collision_kind: CollisionKind,

    /// Transform-update data-access variant
    pub transform_access: TransformAccess,

    /// Whether elements move at all
    pub move_objects: bool,

    /// Whether the bounding-sphere pre-check filters narrow-phase tests
    pub sphere_precheck: bool,

    /// Whether world AABBs are re-derived from collision vertices each frame
    pub recompute_bounds: bool,

    /// Whether pairwise passes deduplicate pairs (`i < j`) or retest
    /// symmetrically
    pub smart_pairs: bool,

    /// Number of frames a demo run simulates
    pub frames: u64,

    /// Seed for deterministic scene generation
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dynamic_elements: 300,
            static_elements: 0,
            volume_half_extent: 25.0,
            element_half_extent: 1.0,
            speed: 6.0,
            octree_max_depth: 4,
            structure: StructureKind::Octree,
            collision_kind: CollisionKind::AabbVsAabb,
            transform_access: TransformAccess::Cached,
            move_objects: true,
            sphere_precheck: true,
            recompute_bounds: false,
            smart_pairs: true,
            frames: 1000,
            seed: 42,
        }
    }
}

impl Config for SimulationConfig {}
