// Physics system: rigid bodies, colliders and impulse-based collision response

pub mod body;
mod collision;
mod solver;
mod transform;
mod world;

pub use body::{Body, BodyBuilder, BodyHandle, BodySet};
pub use collision::{Collider, ColliderShape, CollisionData, CollisionEvent};
pub use solver::resolve_collision;
pub use transform::Transform;
pub use world::{CollisionCallback, PhysicsWorld};
