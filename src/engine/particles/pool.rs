use glam::Vec3;
use log::{debug, trace};

use super::atlas::{AtlasRegion, TextureAtlas};
use super::effect::Effect;
use super::particle::Particle;
use super::render::{InstanceStream, ParticleRenderer};
use crate::core::math::clamp;
use crate::engine::error::{SimError, SimResult};

/// Default number of particle slots
pub const DEFAULT_CAPACITY: usize = 2000;

/// Order the backing array is sorted in after each update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending camera distance. Free slots (distance -1) sort to the front.
    #[default]
    NearestFirst,

    /// Descending camera distance, back-to-front for alpha blending. Free
    /// slots sort to the back.
    FarthestFirst,
}

/// Particle pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of slots, fixed for the pool's lifetime
    pub capacity: usize,

    /// Acceleration applied to every live particle (e.g. gravity)
    pub acceleration: Vec3,

    pub sort_order: SortOrder,

    /// Animated texture atlas, if any
    pub atlas: Option<TextureAtlas>,
}

impl PoolConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_atlas(mut self, atlas: TextureAtlas) -> Self {
        self.atlas = Some(atlas);
        self
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            acceleration: Vec3::new(0.0, -9.81, 0.0),
            sort_order: SortOrder::default(),
            atlas: None,
        }
    }
}

/// Fixed-capacity particle storage with render-ready packed buffers.
///
/// The backing array is addressed by slot index. After every [`update`]
/// the live particles are also packed into three dense instance buffers
/// whose first [`particle_count`] entries are valid. All storage is sized
/// once at construction.
///
/// [`update`]: ParticlePool::update
/// [`particle_count`]: ParticlePool::particle_count
pub struct ParticlePool {
    particles: Vec<Particle>,

    /// Allocation cursor: slot of the last successful allocation
    last_used: usize,

    /// Live particles packed by the last update
    particle_count: usize,

    position_size: Vec<[f32; 4]>,
    colour: Vec<[f32; 4]>,
    uv: Vec<[f32; 4]>,

    acceleration: Vec3,
    sort_order: SortOrder,
    atlas: Option<TextureAtlas>,
    effect: Option<Box<dyn Effect>>,

    /// Lifespan driving effect fractions and atlas frames
    lifespan: f32,

    /// Allocations that found no free slot and overwrote slot 0
    evictions: u64,
}

impl ParticlePool {
    /// Create a pool with every slot free
    pub fn new(config: PoolConfig) -> SimResult<Self> {
        if config.capacity == 0 {
            return Err(SimError::InvalidCapacity);
        }
        let capacity = config.capacity;
        debug!("Created particle pool with {} slots", capacity);

        Ok(Self {
            particles: vec![Particle::DEAD; capacity],
            last_used: 0,
            particle_count: 0,
            position_size: vec![[0.0; 4]; capacity],
            colour: vec![[0.0; 4]; capacity],
            uv: vec![AtlasRegion::FULL.to_tlbr(); capacity],
            acceleration: config.acceleration,
            sort_order: config.sort_order,
            atlas: config.atlas,
            effect: None,
            lifespan: 1.0,
            evictions: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Number of live particles packed by the last update
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// The backing array, in its current (sorted) slot order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, slot: usize) -> Option<&Particle> {
        debug_assert!(slot < self.capacity(), "particle slot {} out of range", slot);
        self.particles.get(slot)
    }

    pub fn particle_mut(&mut self, slot: usize) -> Option<&mut Particle> {
        debug_assert!(slot < self.capacity(), "particle slot {} out of range", slot);
        self.particles.get_mut(slot)
    }

    /// Find a free slot.
    ///
    /// Scans forward from the cursor, then wraps around to the start. When
    /// every slot is live, slot 0 is returned and the caller overwrites that
    /// particle: a full pool evicts rather than failing. The returned slot is
    /// not marked live; the caller must write a particle into it.
    pub fn find_unused_particle(&mut self) -> usize {
        let capacity = self.particles.len();

        for slot in self.last_used..capacity {
            if self.particles[slot].life < 0.0 {
                self.last_used = slot;
                return slot;
            }
        }

        for slot in 0..self.last_used {
            if self.particles[slot].life < 0.0 {
                self.last_used = slot;
                return slot;
            }
        }

        self.evictions += 1;
        trace!("Particle pool saturated, evicting slot 0");
        0
    }

    /// Write `particle` into a free slot (or slot 0 if full) and return the slot
    pub fn spawn(&mut self, particle: Particle) -> usize {
        let slot = self.find_unused_particle();
        self.particles[slot] = particle;
        slot
    }

    /// Times an allocation had to evict slot 0
    pub fn eviction_count(&self) -> u64 {
        self.evictions
    }

    pub fn set_effect(&mut self, effect: Box<dyn Effect>) {
        self.effect = Some(effect);
    }

    pub fn clear_effect(&mut self) {
        self.effect = None;
    }

    pub fn has_effect(&self) -> bool {
        self.effect.is_some()
    }

    pub fn atlas(&self) -> Option<&TextureAtlas> {
        self.atlas.as_ref()
    }

    pub fn set_atlas(&mut self, atlas: Option<TextureAtlas>) {
        self.atlas = atlas;
    }

    pub fn lifespan(&self) -> f32 {
        self.lifespan
    }

    /// Set the lifespan used for effect fractions and atlas animation
    pub fn set_lifespan(&mut self, lifespan: f32) -> SimResult<()> {
        if !(lifespan.is_finite() && lifespan > 0.0) {
            return Err(SimError::InvalidLifespan(lifespan));
        }
        self.lifespan = lifespan;
        Ok(())
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn set_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.sort_order = sort_order;
    }

    /// Free every slot
    pub fn clear(&mut self) {
        self.particles.fill(Particle::DEAD);
        self.particle_count = 0;
        self.last_used = 0;
    }

    /// Advance every live particle by `dt` seconds and repack the buffers.
    ///
    /// Particles whose life runs out during this call are freed and left out
    /// of the buffers immediately. Survivors get the effect, the pool
    /// acceleration and integration, then are packed at the next dense index.
    /// Finally the backing array is sorted by camera distance, so the packing
    /// order of the next update follows this frame's sort.
    pub fn update(&mut self, dt: f32, camera_position: Vec3) {
        self.particle_count = 0;
        let lifespan = self.lifespan;

        for particle in self.particles.iter_mut() {
            if particle.life < 0.0 {
                continue;
            }

            particle.life -= dt;
            if particle.life < 0.0 {
                particle.camera_distance = -1.0;
                continue;
            }

            if let Some(effect) = self.effect.as_deref() {
                effect.apply(particle, clamp(particle.life / lifespan, 0.0, 1.0));
            }

            particle.velocity += self.acceleration * dt;
            particle.position += particle.velocity * dt;
            particle.camera_distance = (particle.position - camera_position).length();

            let index = self.particle_count;
            self.position_size[index] = particle.position.extend(particle.size).to_array();
            self.colour[index] = particle.colour.to_array();
            self.uv[index] = match &self.atlas {
                Some(atlas) => {
                    particle.texture_index = atlas.frame_for_age(lifespan, particle.life);
                    atlas.region(particle.texture_index).to_tlbr()
                }
                None => AtlasRegion::FULL.to_tlbr(),
            };
            self.particle_count += 1;
        }

        self.sort_particles();
    }

    fn sort_particles(&mut self) {
        // Unstable sort works in place, keeping the frame allocation free
        match self.sort_order {
            SortOrder::NearestFirst => self
                .particles
                .sort_unstable_by(|a, b| a.camera_distance.total_cmp(&b.camera_distance)),
            SortOrder::FarthestFirst => self
                .particles
                .sort_unstable_by(|a, b| b.camera_distance.total_cmp(&a.camera_distance)),
        }
    }

    /// Packed `[x, y, z, size]` per live particle
    pub fn position_size_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.position_size[..self.particle_count])
    }

    /// Packed `[r, g, b, a]` per live particle
    pub fn colour_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colour[..self.particle_count])
    }

    /// Packed atlas cell `[top, left, bottom, right]` per live particle
    pub fn uv_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.uv[..self.particle_count])
    }

    /// Upload the packed buffers and issue one instanced draw.
    ///
    /// Does nothing when no particle is alive.
    pub fn render<R: ParticleRenderer + ?Sized>(&self, renderer: &mut R) {
        if self.particle_count == 0 {
            return;
        }

        renderer.upload_instances(InstanceStream::PositionSize, self.position_size_buffer());
        renderer.upload_instances(InstanceStream::Colour, self.colour_buffer());
        renderer.upload_instances(InstanceStream::Uv, self.uv_buffer());
        renderer.bind_texture(self.atlas.as_ref().and_then(|atlas| atlas.texture()));
        renderer.draw_instanced(self.particle_count);
    }
}
