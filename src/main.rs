use std::time::Duration;

use anyhow::Result;
use glam::{Vec3, Vec4};
use log::{debug, info};

use rusted_sim::engine::game_loop::FrameClock;
use rusted_sim::engine::particles::{
    ColourFade, Emitter, EmitterConfig, EmitterShape, InstanceStream, ParticlePool,
    ParticleRenderer, ParticleSystem, PoolConfig, TextureAtlas, TextureHandle,
};
use rusted_sim::engine::physics::{BodyBuilder, BodySet, Collider, PhysicsWorld};

/// Frames simulated by the demo
const DEMO_FRAMES: u32 = 600;

/// Renderer stand-in that only counts what it is asked to draw
#[derive(Default)]
struct HeadlessRenderer {
    floats_uploaded: usize,
    draw_calls: usize,
    instances_drawn: usize,
}

impl ParticleRenderer for HeadlessRenderer {
    fn upload_instances(&mut self, _stream: InstanceStream, data: &[f32]) {
        self.floats_uploaded += data.len();
    }

    fn bind_texture(&mut self, _texture: Option<TextureHandle>) {}

    fn draw_instanced(&mut self, instance_count: usize) {
        self.draw_calls += 1;
        self.instances_drawn += instance_count;
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting rusted-sim demo...");

    // Physics: a few balls dropping onto a heavy floor
    let mut bodies = BodySet::with_capacity(8);
    let mut world = PhysicsWorld::new();

    let floor = bodies.insert(
        BodyBuilder::new()
            .position(Vec3::new(0.0, -1.0, 0.0))
            .mass(f32::INFINITY)
            .collider(Collider::cuboid(Vec3::new(20.0, 0.5, 20.0))?)
            .build()?,
    );
    world.add_body(floor);

    for i in 0..4 {
        let ball = bodies.insert(
            BodyBuilder::new()
                .position(Vec3::new(i as f32 * 1.5 - 2.25, 3.0 + i as f32, 0.0))
                .acceleration(Vec3::new(0.0, -9.81, 0.0))
                .restitution(0.6)
                .collider(Collider::sphere(0.5)?)
                .build()?,
        );
        world.add_body(ball);
    }

    let mut bounces = 0usize;

    // Particles: a spherical burst fountain fading out over its lifetime
    let mut pool = ParticlePool::new(
        PoolConfig::default()
            .with_capacity(2000)
            .with_atlas(TextureAtlas::grid(4, 4)?.with_texture(TextureHandle::new(1))),
    )?;
    pool.set_effect(Box::new(ColourFade::fade_out(Vec4::new(1.0, 0.6, 0.2, 1.0))));

    let emitter = Emitter::new(
        EmitterConfig::default()
            .with_spawn_rate(400.0)
            .with_lifespan(1.5)
            .with_size(0.2),
        EmitterShape::Spherical { max_speed: 3.0 },
    )?
    .with_position(Vec3::new(0.0, 1.0, 0.0));
    let mut particles = ParticleSystem::new(pool, emitter);
    particles.emitter_mut().emit_particles(200);

    let camera = Vec3::new(0.0, 2.0, 10.0);
    let mut renderer = HeadlessRenderer::default();
    let mut clock = FrameClock::new();

    for frame in 0..DEMO_FRAMES {
        // Fixed 60 Hz frames so runs are reproducible
        let dt = clock.advance(Duration::from_micros(16_667));

        world.update(&mut bodies, dt);
        bounces += world.collision_events().len();

        particles.update(dt, camera);
        particles.render(&mut renderer);

        if frame % 120 == 0 {
            debug!(
                "frame {}: {} particles alive, {} collisions so far",
                frame,
                particles.particle_count(),
                bounces
            );
        }
    }

    info!(
        "Simulated {:.1}s in {} frames",
        clock.simulated_time(),
        clock.frame_count()
    );
    info!(
        "Physics: {} bodies, {} collisions resolved",
        world.len(),
        bounces
    );
    info!(
        "Particles: {} spawned, {} alive, {} evictions",
        particles.emitter().total_spawned(),
        particles.particle_count(),
        particles.pool().eviction_count()
    );
    info!(
        "Renderer: {} draw calls, {} instances, {} floats uploaded",
        renderer.draw_calls, renderer.instances_drawn, renderer.floats_uploaded
    );

    Ok(())
}
