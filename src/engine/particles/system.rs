use glam::Vec3;

use super::emitter::Emitter;
use super::pool::ParticlePool;
use super::render::ParticleRenderer;

/// A pool fed by one emitter.
///
/// Each update runs the emitter first, so particles spawned this frame are
/// integrated and packed by the same pool update.
pub struct ParticleSystem {
    pool: ParticlePool,
    emitter: Emitter,
}

impl ParticleSystem {
    pub fn new(pool: ParticlePool, emitter: Emitter) -> Self {
        Self { pool, emitter }
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    /// Spawn, integrate and repack. Returns the number of particles spawned.
    pub fn update(&mut self, dt: f32, camera_position: Vec3) -> usize {
        // Atlas frames and effects follow the emitter's lifespan, which the
        // emitter config has already validated
        let _ = self.pool.set_lifespan(self.emitter.config().lifespan);

        let spawned = self.emitter.update(&mut self.pool, dt);
        self.pool.update(dt, camera_position);
        spawned
    }

    pub fn render<R: ParticleRenderer + ?Sized>(&self, renderer: &mut R) {
        self.pool.render(renderer);
    }

    /// Live particles packed by the last update
    pub fn particle_count(&self) -> usize {
        self.pool.particle_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::particles::{EmitterConfig, EmitterShape, PoolConfig, TextureAtlas};
    use approx::assert_relative_eq;

    fn system(config: EmitterConfig, pool_config: PoolConfig) -> ParticleSystem {
        ParticleSystem::new(
            ParticlePool::new(pool_config).unwrap(),
            Emitter::new(config, EmitterShape::Point).unwrap(),
        )
    }

    #[test]
    fn test_spawned_particles_packed_same_frame() {
        let mut system = system(
            EmitterConfig::default().with_spawn_rate(100.0),
            PoolConfig::default().with_capacity(256),
        );

        let spawned = system.update(0.1, Vec3::ZERO);

        assert_eq!(spawned, 10);
        assert_eq!(system.particle_count(), 10);
    }

    #[test]
    fn test_steady_state_population() {
        // 100/s living 0.5s -> about 50 alive once warmed up
        let mut system = system(
            EmitterConfig::default()
                .with_spawn_rate(100.0)
                .with_lifespan(0.5),
            PoolConfig::default().with_capacity(200),
        );

        for _ in 0..100 {
            system.update(0.1, Vec3::ZERO);
        }

        let count = system.particle_count();
        assert!((40..=50).contains(&count), "unexpected population {}", count);
        assert_eq!(system.pool().eviction_count(), 0);
    }

    #[test]
    fn test_pool_follows_emitter_lifespan() {
        let mut system = system(
            EmitterConfig::default().with_lifespan(4.0),
            PoolConfig::default()
                .with_capacity(64)
                .with_atlas(TextureAtlas::grid(4, 1).unwrap()),
        );

        system.update(0.1, Vec3::ZERO);
        assert_relative_eq!(system.pool().lifespan(), 4.0);
    }

    #[test]
    fn test_saturated_system_keeps_capacity() {
        let mut system = system(
            EmitterConfig::default()
                .with_spawn_rate(1000.0)
                .with_lifespan(10.0),
            PoolConfig::default().with_capacity(32),
        );

        for _ in 0..10 {
            system.update(0.1, Vec3::ZERO);
        }

        assert_eq!(system.particle_count(), 32);
        assert!(system.pool().eviction_count() > 0);
    }
}
