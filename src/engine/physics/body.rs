use glam::Vec3;

use super::collision::Collider;
use super::transform::Transform;
use crate::engine::error::{SimError, SimResult};

/// Handle to a body stored in a [`BodySet`]
///
/// Handles carry a generation so that a handle to a removed body never
/// aliases a body later inserted into the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    /// Slot index inside the owning set
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// A simulated physical entity with kinematic state and an optional collider
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub transform: Transform,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub acceleration: Vec3,
    pub angular_acceleration: Vec3,
    mass: f32,
    restitution: f32,
    collider: Option<Collider>,
}

impl Body {
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set the mass. `f32::INFINITY` makes the body immovable by impulses.
    pub fn set_mass(&mut self, mass: f32) -> SimResult<()> {
        self.mass = validate_mass(mass)?;
        Ok(())
    }

    /// Inverse mass, zero for infinitely heavy bodies
    pub fn inverse_mass(&self) -> f32 {
        if self.mass.is_infinite() {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn set_restitution(&mut self, restitution: f32) -> SimResult<()> {
        self.restitution = validate_restitution(restitution)?;
        Ok(())
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    pub fn set_collider(&mut self, collider: Option<Collider>) {
        self.collider = collider;
    }

    pub fn has_collider(&self) -> bool {
        self.collider.is_some()
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    pub fn rotation(&self) -> Vec3 {
        self.transform.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
    }

    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// Linear momentum (mass * velocity)
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }

    /// Advance kinematics by `dt` seconds using symplectic Euler.
    ///
    /// Velocities are updated first and the new velocities move the body.
    /// `dt` is not clamped.
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.angular_velocity += self.angular_acceleration * dt;
        self.transform.position += self.velocity * dt;
        self.transform.rotation += self.angular_velocity * dt;
    }
}

impl Default for Body {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            angular_acceleration: Vec3::ZERO,
            mass: 1.0,
            restitution: 1.0,
            collider: None,
        }
    }
}

fn validate_mass(mass: f32) -> SimResult<f32> {
    // NaN fails the comparison
    if mass > 0.0 {
        Ok(mass)
    } else {
        Err(SimError::InvalidMass(mass))
    }
}

fn validate_restitution(restitution: f32) -> SimResult<f32> {
    if (0.0..=1.0).contains(&restitution) {
        Ok(restitution)
    } else {
        Err(SimError::InvalidRestitution(restitution))
    }
}

/// Builder for creating bodies with common configurations
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    body: Body,
}

impl BodyBuilder {
    /// Start from a body at the origin with mass 1 and restitution 1
    pub fn new() -> Self {
        Self {
            body: Body::default(),
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, position: Vec3) -> Self {
        self.body.transform.position = position;
        self
    }

    /// Set the initial rotation (Euler angles, radians)
    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.body.transform.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.body.transform.scale = scale;
        self
    }

    /// Set the initial linear velocity
    pub fn velocity(mut self, velocity: Vec3) -> Self {
        self.body.velocity = velocity;
        self
    }

    /// Set the initial angular velocity (radians per second)
    pub fn angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.body.angular_velocity = angular_velocity;
        self
    }

    /// Constant linear acceleration, e.g. gravity
    pub fn acceleration(mut self, acceleration: Vec3) -> Self {
        self.body.acceleration = acceleration;
        self
    }

    pub fn angular_acceleration(mut self, angular_acceleration: Vec3) -> Self {
        self.body.angular_acceleration = angular_acceleration;
        self
    }

    /// Set mass (validated on build)
    pub fn mass(mut self, mass: f32) -> Self {
        self.body.mass = mass;
        self
    }

    /// Set restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub fn restitution(mut self, restitution: f32) -> Self {
        self.body.restitution = restitution;
        self
    }

    pub fn collider(mut self, collider: Collider) -> Self {
        self.body.collider = Some(collider);
        self
    }

    /// Build the body, validating mass and restitution
    pub fn build(self) -> SimResult<Body> {
        validate_mass(self.body.mass)?;
        validate_restitution(self.body.restitution)?;
        Ok(self.body)
    }
}

impl Default for BodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Arena owning bodies on behalf of game logic.
///
/// A [`PhysicsWorld`](super::PhysicsWorld) only stores handles into a set;
/// removing a body here makes the world skip it from then on.
#[derive(Debug, Clone, Default)]
pub struct BodySet {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl BodySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set with room for `capacity` bodies
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Insert a body and return its handle
    pub fn insert(&mut self, body: Body) -> BodyHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            return BodyHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            body: Some(body),
        });
        BodyHandle {
            index,
            generation: 0,
        }
    }

    /// Remove a body, returning it if the handle was still valid
    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(body)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_ref())
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_mut())
    }

    /// Borrow two distinct bodies mutably at once
    pub fn get_pair_mut(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Option<(&mut Body, &mut Body)> {
        if a.index == b.index {
            return None;
        }
        // Validate both before splitting the borrow
        self.get(a)?;
        self.get(b)?;

        let (first, second) = if a.index < b.index { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(second.index());
        let first_body = head[first.index()].body.as_mut()?;
        let second_body = tail[0].body.as_mut()?;

        if a.index < b.index {
            Some((first_body, second_body))
        } else {
            Some((second_body, first_body))
        }
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live bodies
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over live bodies and their handles
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body.as_ref().map(|body| {
                (
                    BodyHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    body,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_body_builder_defaults() {
        let body = BodyBuilder::new().build().unwrap();

        assert_eq!(body.mass(), 1.0);
        assert_eq!(body.restitution(), 1.0);
        assert!(!body.has_collider());
        assert_eq!(body.scale(), Vec3::ONE);
    }

    #[test]
    fn test_body_builder_validation() {
        assert_eq!(
            BodyBuilder::new().mass(0.0).build().unwrap_err(),
            SimError::InvalidMass(0.0)
        );
        assert!(BodyBuilder::new().mass(f32::NAN).build().is_err());
        assert_eq!(
            BodyBuilder::new().restitution(1.5).build().unwrap_err(),
            SimError::InvalidRestitution(1.5)
        );
        assert!(BodyBuilder::new().mass(f32::INFINITY).build().is_ok());
    }

    #[test]
    fn test_inverse_mass() {
        let body = BodyBuilder::new().mass(4.0).build().unwrap();
        assert_relative_eq!(body.inverse_mass(), 0.25);

        let wall = BodyBuilder::new().mass(f32::INFINITY).build().unwrap();
        assert_eq!(wall.inverse_mass(), 0.0);
    }

    #[test]
    fn test_symplectic_euler_uses_new_velocity() {
        let mut body = BodyBuilder::new()
            .velocity(Vec3::new(1.0, 0.0, 0.0))
            .acceleration(Vec3::new(0.0, -10.0, 0.0))
            .angular_acceleration(Vec3::new(0.0, 0.0, 2.0))
            .build()
            .unwrap();

        body.integrate(0.5);

        assert_relative_eq!(body.velocity.y, -5.0);
        // Position moves with the updated velocity
        assert_relative_eq!(body.position().x, 0.5);
        assert_relative_eq!(body.position().y, -2.5);
        assert_relative_eq!(body.angular_velocity.z, 1.0);
        assert_relative_eq!(body.rotation().z, 0.5);
    }

    #[test]
    fn test_set_mass_rejects_invalid() {
        let mut body = Body::default();
        assert!(body.set_mass(-1.0).is_err());
        assert_eq!(body.mass(), 1.0);
        body.set_mass(3.0).unwrap();
        assert_eq!(body.mass(), 3.0);
    }

    #[test]
    fn test_body_set_insert_remove() {
        let mut set = BodySet::new();
        let a = set.insert(Body::default());
        let b = set.insert(Body::default());
        assert_eq!(set.len(), 2);
        assert!(set.contains(a));

        assert!(set.remove(a).is_some());
        assert!(!set.contains(a));
        assert!(set.remove(a).is_none());
        assert_eq!(set.len(), 1);

        // Reused slot gets a new generation
        let c = set.insert(Body::default());
        assert_eq!(c.index(), a.index());
        assert_ne!(c, a);
        assert!(set.get(a).is_none());
        assert!(set.get(c).is_some());
        assert!(set.contains(b));
    }

    #[test]
    fn test_get_pair_mut() {
        let mut set = BodySet::new();
        let a = set.insert(BodyBuilder::new().mass(1.0).build().unwrap());
        let b = set.insert(BodyBuilder::new().mass(2.0).build().unwrap());

        let (body_b, body_a) = set.get_pair_mut(b, a).unwrap();
        assert_eq!(body_b.mass(), 2.0);
        assert_eq!(body_a.mass(), 1.0);
        body_a.velocity = Vec3::X;

        assert_eq!(set.get(a).unwrap().velocity, Vec3::X);
        assert!(set.get_pair_mut(a, a).is_none());
    }

    #[test]
    fn test_iter_skips_removed() {
        let mut set = BodySet::new();
        let a = set.insert(Body::default());
        let b = set.insert(Body::default());
        set.remove(a);

        let handles: Vec<_> = set.iter().map(|(h, _)| h).collect();
        assert_eq!(handles, vec![b]);
    }
}
