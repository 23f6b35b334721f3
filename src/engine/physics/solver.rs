//! Impulse-based collision response.

use super::body::Body;
use super::collision::CollisionData;

/// Apply an instantaneous impulse along the contact normal so that the pair
/// separates according to the lower restitution of the two bodies.
///
/// `data.normal` must point from `a` to `b`. Returns the impulse magnitude
/// applied, or `None` when nothing was done: the bodies are already
/// separating, or both have infinite mass.
pub fn resolve_collision(data: &CollisionData, a: &mut Body, b: &mut Body) -> Option<f32> {
    let relative_velocity = b.velocity - a.velocity;
    let vel_along_normal = relative_velocity.dot(data.normal);

    // Separating pairs are left alone
    if vel_along_normal > 0.0 {
        return None;
    }

    let restitution = a.restitution().min(b.restitution());
    let inv_mass_a = a.inverse_mass();
    let inv_mass_b = b.inverse_mass();
    let total_inv_mass = inv_mass_a + inv_mass_b;

    if total_inv_mass <= 0.0 {
        return None;
    }

    let j = -(1.0 + restitution) * vel_along_normal / total_inv_mass;
    let impulse = data.normal * j;

    a.velocity -= impulse * inv_mass_a;
    b.velocity += impulse * inv_mass_b;

    Some(j)
}
