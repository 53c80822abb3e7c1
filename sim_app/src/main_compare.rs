//! Structure Comparison Demo
//!
//! Runs the identical scene through the brute-force and octree structures,
//! verifies frame by frame that both report the same colliding set, and
//! prints the timing comparison the engine exists to make: the all-pairs
//! pass against octree rebuild + localized pass.
//!
//! Usage: `structure_compare [scene.toml|scene.ron]`

use collision_engine::prelude::*;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const FIXED_DT: f32 = 1.0 / 60.0;

/// Build a pipeline populated from the scene description
fn build_scene(config: &SimulationConfig) -> CollisionPipeline {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pipeline = CollisionPipeline::new(config.volume_half_extent, config.octree_max_depth);
    pipeline.set_speed(config.speed);
    pipeline.set_transform_access(config.transform_access);

    let mut flags = PipelineFlags::empty();
    flags.set(PipelineFlags::MOVE_OBJECTS, config.move_objects);
    flags.set(PipelineFlags::RECOMPUTE_BOUNDS, config.recompute_bounds);
    flags.set(PipelineFlags::SMART_PAIRS, config.smart_pairs);
    pipeline.set_flags(flags);

    let half = config.element_half_extent;
    let radius = half * 3.0f32.sqrt();
    let spawn_extent = config.volume_half_extent - half;
    let total = config.dynamic_elements + config.static_elements;

    for i in 0..total {
        let position = Vec3::new(
            rng.gen_range(-spawn_extent..spawn_extent),
            rng.gen_range(-spawn_extent..spawn_extent),
            rng.gen_range(-spawn_extent..spawn_extent),
        );
        let id = pipeline.add_element(position, radius);
        let element = pipeline.element_mut(id);
        element.set_object_space_bounds(
            Vec3::new(-half, -half, -half),
            Vec3::new(half, half, half),
        );
        if i < config.dynamic_elements {
            element.set_velocity(Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            ));
        }
    }

    pipeline.set_collision_kind(config.collision_kind);
    pipeline.set_sphere_precheck(config.sphere_precheck);
    pipeline
}

fn colliding_ids(pipeline: &CollisionPipeline) -> Vec<u32> {
    pipeline
        .elements()
        .iter()
        .filter(|e| e.is_colliding())
        .map(|e| e.id().id())
        .collect()
}

fn main() -> Result<(), ConfigError> {
    collision_engine::foundation::logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load_from_file(&path)?,
        None => SimulationConfig::default(),
    };

    // Same seed, so both pipelines advance through identical states.
    let mut brute = build_scene(&config);
    let mut octree = build_scene(&config);
    info!(
        "structure comparison: {} elements, {} frames",
        brute.elements().len(),
        config.frames
    );

    let mut brute_pass = Duration::ZERO;
    let mut rebuild = Duration::ZERO;
    let mut octree_pass = Duration::ZERO;
    let mut divergent_frames = 0u64;

    for frame in 0..config.frames {
        brute.step_frame(FIXED_DT, StructureKind::Bruteforce);
        octree.step_frame(FIXED_DT, StructureKind::Octree);

        brute_pass += brute.bruteforce().collision_time();
        rebuild += octree.octree().rebuild_time();
        octree_pass += octree.octree().collision_time();

        if colliding_ids(&brute) != colliding_ids(&octree) {
            divergent_frames += 1;
            warn!("frame {frame}: structures disagree");
        }
    }

    let frames = config.frames.max(1) as u32;
    info!("bruteforce: avg pass {:?}", brute_pass / frames);
    info!(
        "octree:     avg rebuild {:?} + avg pass {:?}",
        rebuild / frames,
        octree_pass / frames
    );
    info!(
        "final colliding count {} ({} divergent frames)",
        brute.colliding_count(),
        divergent_frames
    );
    assert_eq!(divergent_frames, 0, "structures must report identical collision sets");

    Ok(())
}
