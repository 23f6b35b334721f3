// Collider shapes and narrow-phase intersection queries

use glam::Vec3;
use parry3d::math::{Isometry, Real, Vector};
use parry3d::na::{Translation3, UnitQuaternion};
use parry3d::query::{self, Contact};
use parry3d::shape::{Ball, Cuboid, Shape};

use super::transform::Transform;
use super::BodyHandle;
use crate::engine::error::{SimError, SimResult};

/// Geometric shape of a collider in its owner's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Sphere centred on the collider origin
    Sphere { radius: f32 },

    /// Oriented box, rotated with the owning body
    Box { half_extents: Vec3 },
}

/// Collision shape owned by exactly one body.
///
/// The world pose is derived from the owner's transform: `offset` is added to
/// the body position, the body rotation orients the shape, and the body scale
/// grows it (spheres use the largest scale component).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    shape: ColliderShape,
    offset: Vec3,
}

impl Collider {
    /// Create a sphere collider
    pub fn sphere(radius: f32) -> SimResult<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::InvalidColliderSize(radius));
        }
        Ok(Self {
            shape: ColliderShape::Sphere { radius },
            offset: Vec3::ZERO,
        })
    }

    /// Create a box collider from its half extents
    pub fn cuboid(half_extents: Vec3) -> SimResult<Self> {
        let smallest = half_extents.min_element();
        if !(half_extents.is_finite() && smallest > 0.0) {
            return Err(SimError::InvalidColliderSize(smallest));
        }
        Ok(Self {
            shape: ColliderShape::Box { half_extents },
            offset: Vec3::ZERO,
        })
    }

    /// Shift the collider away from the body origin
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn shape(&self) -> ColliderShape {
        self.shape
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Test this collider, placed at `transform`, against `other` placed at
    /// `other_transform`.
    ///
    /// Touching shapes count as intersecting. The returned normal points from
    /// this collider towards `other`.
    pub fn intersects(
        &self,
        transform: &Transform,
        other: &Collider,
        other_transform: &Transform,
    ) -> CollisionData {
        let shape_a = self.scaled_shape(transform.scale);
        let shape_b = other.scaled_shape(other_transform.scale);

        match query::contact(
            &self.isometry(transform),
            shape_a.as_shape(),
            &other.isometry(other_transform),
            shape_b.as_shape(),
            0.0,
        ) {
            Ok(Some(contact)) => CollisionData::from_contact(&contact),
            Ok(None) => CollisionData::NONE,
            Err(err) => {
                log::warn!("Unsupported collider pair: {:?}", err);
                CollisionData::NONE
            }
        }
    }

    fn isometry(&self, transform: &Transform) -> Isometry<Real> {
        let centre = transform.position + self.offset;
        let rotation = transform.rotation;
        Isometry::from_parts(
            Translation3::new(centre.x, centre.y, centre.z),
            UnitQuaternion::from_euler_angles(rotation.x, rotation.y, rotation.z),
        )
    }

    fn scaled_shape(&self, scale: Vec3) -> ScaledShape {
        let scale = scale.abs();
        match self.shape {
            ColliderShape::Sphere { radius } => {
                ScaledShape::Ball(Ball::new(radius * scale.max_element()))
            }
            ColliderShape::Box { half_extents } => {
                let h = half_extents * scale;
                ScaledShape::Cuboid(Cuboid::new(Vector::new(h.x, h.y, h.z)))
            }
        }
    }
}

/// Concrete parry shape built for a single query
enum ScaledShape {
    Ball(Ball),
    Cuboid(Cuboid),
}

impl ScaledShape {
    fn as_shape(&self) -> &dyn Shape {
        match self {
            ScaledShape::Ball(ball) => ball,
            ScaledShape::Cuboid(cuboid) => cuboid,
        }
    }
}

/// Result of a narrow-phase intersection test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    /// Whether the two shapes touch or overlap
    pub intersects: bool,

    /// Unit contact normal pointing from the first shape to the second
    pub normal: Vec3,

    /// Penetration depth (0 when only touching)
    pub depth: f32,

    /// Contact point on the first shape, world space
    pub point_a: Vec3,

    /// Contact point on the second shape, world space
    pub point_b: Vec3,
}

impl CollisionData {
    /// A non-intersecting result
    pub const NONE: Self = Self {
        intersects: false,
        normal: Vec3::ZERO,
        depth: 0.0,
        point_a: Vec3::ZERO,
        point_b: Vec3::ZERO,
    };

    /// Build an intersecting result along `normal` with the given depth
    pub fn touching(normal: Vec3, depth: f32) -> Self {
        Self {
            intersects: true,
            normal: normal.normalize_or_zero(),
            depth,
            ..Self::NONE
        }
    }

    fn from_contact(contact: &Contact) -> Self {
        let n = contact.normal1.into_inner();
        Self {
            intersects: true,
            normal: Vec3::new(n.x, n.y, n.z),
            depth: (-contact.dist).max(0.0),
            point_a: Vec3::new(contact.point1.x, contact.point1.y, contact.point1.z),
            point_b: Vec3::new(contact.point2.x, contact.point2.y, contact.point2.z),
        }
    }
}

/// A collision detected during a world update
#[derive(Debug, Clone, Copy)]
pub struct CollisionEvent {
    /// Registration index of the first body
    pub index_a: usize,

    /// Registration index of the second body
    pub index_b: usize,

    pub handle_a: BodyHandle,
    pub handle_b: BodyHandle,

    /// Contact data as seen before resolution
    pub data: CollisionData,
}
