use std::f32::consts::TAU;

use glam::{Vec3, Vec4};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use super::particle::Particle;
use super::pool::ParticlePool;
use crate::core::math::spherical_direction;
use crate::engine::error::{SimError, SimResult};

/// Default RNG seed so that runs are reproducible unless reseeded
const DEFAULT_SEED: u64 = 0xcafe_f00d_d15e_a5e5;

/// How a pending burst combines with rate-based spawning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BurstPolicy {
    /// The burst replaces that frame's rate-based count and resets the
    /// spawn accumulator
    #[default]
    Replace,

    /// The burst is spawned on top of the rate-based count
    Additive,
}

/// Spawn shape, deciding each new particle's initial velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmitterShape {
    /// Every particle gets the configured velocity
    Point,

    /// Uniformly random direction at a fixed speed
    Spherical { max_speed: f32 },
}

/// Defaults for newly spawned particles
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    /// Particles per second
    pub spawn_rate: f32,

    /// Seconds each particle lives
    pub lifespan: f32,

    pub colour: Vec4,
    pub size: f32,
    pub velocity: Vec3,
    pub burst_policy: BurstPolicy,
}

impl EmitterConfig {
    pub fn with_spawn_rate(mut self, spawn_rate: f32) -> Self {
        self.spawn_rate = spawn_rate;
        self
    }

    pub fn with_lifespan(mut self, lifespan: f32) -> Self {
        self.lifespan = lifespan;
        self
    }

    pub fn with_colour(mut self, colour: Vec4) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_burst_policy(mut self, burst_policy: BurstPolicy) -> Self {
        self.burst_policy = burst_policy;
        self
    }

    fn validate(&self) -> SimResult<()> {
        if !(self.spawn_rate.is_finite() && self.spawn_rate >= 0.0) {
            return Err(SimError::InvalidSpawnRate(self.spawn_rate));
        }
        if !(self.lifespan.is_finite() && self.lifespan > 0.0) {
            return Err(SimError::InvalidLifespan(self.lifespan));
        }
        Ok(())
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            spawn_rate: 50.0,
            lifespan: 2.0,
            colour: Vec4::ONE,
            size: 1.0,
            velocity: Vec3::Y,
            burst_policy: BurstPolicy::default(),
        }
    }
}

/// Spawns particles into a pool at a configured rate and shape
#[derive(Debug, Clone)]
pub struct Emitter {
    config: EmitterConfig,
    shape: EmitterShape,
    position: Vec3,

    /// Time since the last rate-based spawn
    accumulator: f32,

    /// Particles requested by `emit_particles`, spawned on the next update
    pending_burst: usize,

    /// Advisory flag for game logic; `update` does not consult it
    active: bool,

    rng: Pcg64Mcg,
    total_spawned: u64,
}

impl Emitter {
    pub fn new(config: EmitterConfig, shape: EmitterShape) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            shape,
            position: Vec3::ZERO,
            accumulator: 0.0,
            pending_burst: 0,
            active: true,
            rng: Pcg64Mcg::seed_from_u64(DEFAULT_SEED),
            total_spawned: 0,
        })
    }

    /// Reseed the random source used by spawn shapes
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg64Mcg::seed_from_u64(seed);
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EmitterConfig) -> SimResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn shape(&self) -> EmitterShape {
        self.shape
    }

    pub fn set_shape(&mut self, shape: EmitterShape) {
        self.shape = shape;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Request a one-shot burst of `count` particles on the next update.
    /// Requests made before that update accumulate.
    pub fn emit_particles(&mut self, count: usize) {
        self.pending_burst += count;
        debug!("Burst of {} particles queued", count);
    }

    pub fn pending_burst(&self) -> usize {
        self.pending_burst
    }

    /// Particles spawned since creation
    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    /// Spawn this frame's particles into `pool` and return how many were
    /// spawned.
    ///
    /// Elapsed time accumulates until at least one whole particle is due;
    /// the accumulator is then reset to zero, dropping any fractional
    /// remainder. A frame never spawns more particles than the pool holds.
    pub fn update(&mut self, pool: &mut ParticlePool, dt: f32) -> usize {
        self.accumulator += dt;
        let mut count = (self.accumulator * self.config.spawn_rate).floor() as usize;
        if count > 0 {
            self.accumulator = 0.0;
        }

        if self.pending_burst > 0 {
            let burst = std::mem::take(&mut self.pending_burst);
            count = match self.config.burst_policy {
                BurstPolicy::Replace => {
                    self.accumulator = 0.0;
                    burst
                }
                BurstPolicy::Additive => count + burst,
            };
        }

        let count = count.min(pool.capacity());
        for _ in 0..count {
            let slot = pool.find_unused_particle();
            let particle = self.emit_particle();
            if let Some(target) = pool.particle_mut(slot) {
                *target = particle;
            }
        }

        self.total_spawned += count as u64;
        count
    }

    /// Build one particle from the defaults, letting the shape pick its
    /// velocity
    fn emit_particle(&mut self) -> Particle {
        let mut particle = Particle {
            position: self.position,
            velocity: self.config.velocity,
            colour: self.config.colour,
            size: self.config.size,
            life: self.config.lifespan,
            camera_distance: 0.0,
            texture_index: 0,
        };

        match self.shape {
            EmitterShape::Point => {}
            EmitterShape::Spherical { max_speed } => {
                let theta = self.rng.gen_range(0.0..TAU);
                let phi = self.rng.gen_range(-1.0f32..=1.0).acos();
                particle.velocity = spherical_direction(theta, phi) * max_speed;
            }
        }

        particle
    }
}
