//! Octree Collision Demo
//!
//! Runs the collision pipeline headless against the octree structure and
//! reports the two phase timings (rebuild vs. collision pass) that the
//! octree is designed to be profiled on, plus node occupancy statistics.
//!
//! Usage: `octree_demo [scene.toml|scene.ron]`

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

fn main() -> Result<(), ConfigError> {
    collision_engine::foundation::logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load_from_file(&path)?,
        None => SimulationConfig::default(),
    };

    let mut pipeline = build_scene(&config);
    info!(
        "octree demo: {} elements, depth {}, {} frames",
        pipeline.elements().len(),
        config.octree_max_depth,
        config.frames
    );

    let mut rebuild_total = Duration::ZERO;
    let mut collision_total = Duration::ZERO;
    let mut timer = Timer::new();

    for _ in 0..config.frames {
        pipeline.step_frame(FIXED_DT, StructureKind::Octree);
        rebuild_total += pipeline.octree().rebuild_time();
        collision_total += pipeline.octree().collision_time();
        timer.update();
    }

    let frames = config.frames.max(1) as u32;
    info!(
        "avg rebuild {:?}, avg collision pass {:?}, avg frame {:.3} ms",
        rebuild_total / frames,
        collision_total / frames,
        1000.0 * timer.total_time() / frames as f32
    );
    info!(
        "final frame: {} colliding, {} of {} nodes occupied",
        pipeline.colliding_count(),
        pipeline.octree().occupied_node_count(),
        pipeline.octree().node_count()
    );

    Ok(())
}
