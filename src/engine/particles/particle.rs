use glam::{Vec3, Vec4};

/// A single particle slot.
///
/// Slots are never allocated or freed individually: spawning overwrites a
/// slot in place and death is a negative `life`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// RGBA colour
    pub colour: Vec4,
    pub size: f32,
    /// Remaining life in seconds, negative when the slot is free
    pub life: f32,
    /// Distance to the camera from the last update, -1 when dead
    pub camera_distance: f32,
    /// Current frame in the texture atlas
    pub texture_index: usize,
}

impl Particle {
    /// Value of a free slot
    pub const DEAD: Self = Self {
        position: Vec3::ZERO,
        velocity: Vec3::ZERO,
        colour: Vec4::ONE,
        size: 1.0,
        life: -1.0,
        camera_distance: -1.0,
        texture_index: 0,
    };

    pub fn is_alive(&self) -> bool {
        self.life >= 0.0
    }

    /// Mark the slot free
    pub fn kill(&mut self) {
        self.life = -1.0;
        self.camera_distance = -1.0;
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::DEAD
    }
}
