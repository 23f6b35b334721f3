// Engine modules: physics, particles, frame timing

pub mod error;
pub mod game_loop;
pub mod particles;
pub mod physics;

pub use error::{SimError, SimResult};
