//! Brute-Force Collision Demo
//!
//! Runs the collision pipeline headless against the all-pairs structure,
//! once with pair deduplication and once with symmetric retesting, to show
//! the wasted-work cost of the naive pass. Results are identical in both
//! modes; only the timing differs.
//!
//! Usage: `bruteforce_demo [scene.toml|scene.ron]`

use collision_engine::prelude::*;
use log::info;
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

/// Run one full simulation and return the accumulated pass time
fn run(config: &SimulationConfig, smart_pairs: bool) -> (Duration, usize) {
    let mut pipeline = build_scene(config);

    let mut flags = pipeline.flags();
    flags.set(PipelineFlags::MOVE_OBJECTS, config.move_objects);
    flags.set(PipelineFlags::RECOMPUTE_BOUNDS, config.recompute_bounds);
    flags.set(PipelineFlags::SMART_PAIRS, smart_pairs);
    pipeline.set_flags(flags);

    let mut pass_total = Duration::ZERO;
    for _ in 0..config.frames {
        pipeline.step_frame(FIXED_DT, StructureKind::Bruteforce);
        pass_total += pipeline.bruteforce().collision_time();
    }

    (pass_total, pipeline.colliding_count())
}

fn main() -> Result<(), ConfigError> {
    collision_engine::foundation::logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load_from_file(&path)?,
        None => SimulationConfig::default(),
    };

    let total = config.dynamic_elements + config.static_elements;
    info!("bruteforce demo: {} elements, {} frames", total, config.frames);

    let frames = config.frames.max(1) as u32;
    let (smart_time, smart_count) = run(&config, true);
    info!(
        "deduplicated pairs: avg pass {:?}, final colliding {}",
        smart_time / frames,
        smart_count
    );

    let (naive_time, naive_count) = run(&config, false);
    info!(
        "symmetric retests:  avg pass {:?}, final colliding {}",
        naive_time / frames,
        naive_count
    );

    assert_eq!(smart_count, naive_count, "pair mode must not change results");
    Ok(())
}
