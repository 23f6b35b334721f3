//! Frame-stepped physics and particle simulation kernel.
//!
//! Two independent subsystems share a "bounded pool plus per-frame pass"
//! design: [`engine::physics`] integrates bodies and resolves collisions with
//! impulses, and [`engine::particles`] runs fixed-capacity particle pools fed
//! by emitters and packs them into render-ready instance buffers.

pub mod core;
pub mod engine;

pub use engine::{SimError, SimResult};
