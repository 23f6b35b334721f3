// Particle system: fixed-capacity pool, emitters, lifetime effects and
// render-ready instance buffers

mod atlas;
mod effect;
mod emitter;
mod particle;
mod pool;
mod render;
mod system;

pub use atlas::{AtlasRegion, TextureAtlas};
pub use effect::{ColourFade, Effect, SizeFade};
pub use emitter::{BurstPolicy, Emitter, EmitterConfig, EmitterShape};
pub use particle::Particle;
pub use pool::{ParticlePool, PoolConfig, SortOrder, DEFAULT_CAPACITY};
pub use render::{InstanceStream, ParticleRenderer, TextureHandle};
pub use system::ParticleSystem;
