// Spatial transform shared by bodies and game objects

use glam::Vec3;

/// Position, rotation and scale of an object.
///
/// Rotation is stored as XYZ Euler angles in radians so that angular velocity
/// can be integrated by plain addition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Create a transform at a position with no rotation and unit scale
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Resolve this transform relative to a parent.
    ///
    /// Positions and rotations add, scales multiply component-wise. This is the
    /// engine's parent rule; it does not rotate the child offset by the parent.
    pub fn relative_to(&self, parent: &Transform) -> Transform {
        Transform {
            position: parent.position + self.position,
            rotation: parent.rotation + self.rotation,
            scale: parent.scale * self.scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
