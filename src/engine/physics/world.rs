use log::{debug, trace};

use super::body::{BodyHandle, BodySet};
use super::collision::CollisionEvent;
use super::solver::resolve_collision;

/// Observer invoked with the registration indices of each colliding pair,
/// before the pair is resolved
pub type CollisionCallback = Box<dyn FnMut(usize, usize)>;

/// Physics world that steps a set of registered bodies.
///
/// The world does not own bodies: it keeps handles into a caller-owned
/// [`BodySet`] in registration order. Collision detection is a brute-force
/// pass over every pair, which is fine for the small body counts this engine
/// targets.
pub struct PhysicsWorld {
    /// Registered bodies, in registration order
    bodies: Vec<BodyHandle>,

    /// Optional observer for collisions
    collision_callback: Option<CollisionCallback>,

    /// Collisions from the last update, reused across frames
    collision_events: Vec<CollisionEvent>,
}

impl PhysicsWorld {
    /// Create an empty physics world
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            collision_callback: None,
            collision_events: Vec::with_capacity(32), // Pre-allocate for common case
        }
    }

    /// Register a body. Registering the same handle twice is ignored.
    pub fn add_body(&mut self, handle: BodyHandle) {
        if self.bodies.contains(&handle) {
            debug!("Body {:?} already registered", handle);
            return;
        }
        self.bodies.push(handle);
        debug!("Registered body {:?} ({} total)", handle, self.bodies.len());
    }

    /// Unregister a body, preserving the order of the remaining ones
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        match self.bodies.iter().position(|h| *h == handle) {
            Some(index) => {
                self.bodies.remove(index);
                debug!("Unregistered body {:?}", handle);
                true
            }
            None => false,
        }
    }

    /// Registered handles in registration order
    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Set the collision observer
    pub fn set_collision_callback<F>(&mut self, callback: F)
    where
        F: FnMut(usize, usize) + 'static,
    {
        self.collision_callback = Some(Box::new(callback));
    }

    pub fn clear_collision_callback(&mut self) {
        self.collision_callback = None;
    }

    /// Collisions detected during the last update
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.collision_events
    }

    /// Step the simulation forward by `dt` seconds.
    ///
    /// First integrates every registered body in registration order, then
    /// tests each pair `(i, j)` with `i < j` where both bodies carry a
    /// collider. Intersecting pairs are reported to the callback and then
    /// resolved with an impulse. Handles whose body was removed from the set
    /// are skipped.
    pub fn update(&mut self, bodies: &mut BodySet, dt: f32) {
        self.collision_events.clear();

        for handle in &self.bodies {
            match bodies.get_mut(*handle) {
                Some(body) => body.integrate(dt),
                None => trace!("Skipping stale body handle {:?}", handle),
            }
        }

        let count = self.bodies.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (handle_a, handle_b) = (self.bodies[i], self.bodies[j]);
                let Some((a, b)) = bodies.get_pair_mut(handle_a, handle_b) else {
                    continue;
                };
                let (Some(collider_a), Some(collider_b)) = (a.collider(), b.collider()) else {
                    continue;
                };

                let data = collider_a.intersects(&a.transform, collider_b, &b.transform);
                if !data.intersects {
                    continue;
                }

                self.collision_events.push(CollisionEvent {
                    index_a: i,
                    index_b: j,
                    handle_a,
                    handle_b,
                    data,
                });
                if let Some(callback) = self.collision_callback.as_mut() {
                    callback(i, j);
                }

                resolve_collision(&data, a, b);
            }
        }

        if !self.collision_events.is_empty() {
            trace!("{} collisions this step", self.collision_events.len());
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::{Body, BodyBuilder, Collider};
    use approx::assert_relative_eq;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ball(position: Vec3, velocity: Vec3) -> Body {
        BodyBuilder::new()
            .position(position)
            .velocity(velocity)
            .collider(Collider::sphere(0.5).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_head_on_elastic_swap() {
        let mut set = BodySet::new();
        // Spheres in contact along the x-axis
        let a = set.insert(ball(Vec3::new(-0.49, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)));
        let b = set.insert(ball(Vec3::new(0.49, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)));

        let mut world = PhysicsWorld::new();
        world.add_body(a);
        world.add_body(b);
        world.update(&mut set, 0.0);

        assert_eq!(world.collision_events().len(), 1);
        assert_relative_eq!(world.collision_events()[0].data.normal.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(set.get(a).unwrap().velocity.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(set.get(b).unwrap().velocity.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_integration_in_update() {
        let mut set = BodySet::new();
        let h = set.insert(
            BodyBuilder::new()
                .acceleration(Vec3::new(0.0, -10.0, 0.0))
                .build()
                .unwrap(),
        );
        let mut world = PhysicsWorld::new();
        world.add_body(h);

        world.update(&mut set, 0.1);
        world.update(&mut set, 0.1);

        let body = set.get(h).unwrap();
        assert_relative_eq!(body.velocity.y, -2.0, epsilon = 1e-5);
        assert_relative_eq!(body.position().y, -0.3, epsilon = 1e-5);
    }

    #[test]
    fn test_unregistered_bodies_not_simulated() {
        let mut set = BodySet::new();
        let h = set.insert(ball(Vec3::ZERO, Vec3::X));
        let mut world = PhysicsWorld::new();

        world.update(&mut set, 1.0);
        assert_eq!(set.get(h).unwrap().position(), Vec3::ZERO);
    }

    #[test]
    fn test_bodies_without_colliders_pass_through() {
        let mut set = BodySet::new();
        let a = set.insert(
            BodyBuilder::new()
                .velocity(Vec3::X)
                .build()
                .unwrap(),
        );
        let b = set.insert(ball(Vec3::ZERO, -Vec3::X));
        let mut world = PhysicsWorld::new();
        world.add_body(a);
        world.add_body(b);

        world.update(&mut set, 0.0);
        assert!(world.collision_events().is_empty());
        assert_eq!(set.get(a).unwrap().velocity, Vec3::X);
    }

    #[test]
    fn test_callback_sees_indices_before_resolution() {
        let mut set = BodySet::new();
        let far = set.insert(ball(Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO));
        let a = set.insert(ball(Vec3::new(-0.4, 0.0, 0.0), Vec3::X));
        let b = set.insert(ball(Vec3::new(0.4, 0.0, 0.0), -Vec3::X));

        let mut world = PhysicsWorld::new();
        world.add_body(far);
        world.add_body(a);
        world.add_body(b);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        world.set_collision_callback(move |i, j| sink.borrow_mut().push((i, j)));

        world.update(&mut set, 0.0);

        assert_eq!(*seen.borrow(), vec![(1, 2)]);
        let event = world.collision_events()[0];
        assert_eq!((event.handle_a, event.handle_b), (a, b));
    }

    #[test]
    fn test_separating_overlap_not_resolved() {
        let mut set = BodySet::new();
        let a = set.insert(ball(Vec3::new(-0.4, 0.0, 0.0), -Vec3::X));
        let b = set.insert(ball(Vec3::new(0.4, 0.0, 0.0), Vec3::X));
        let mut world = PhysicsWorld::new();
        world.add_body(a);
        world.add_body(b);

        world.update(&mut set, 0.0);

        // Still reported, but velocities are left alone
        assert_eq!(world.collision_events().len(), 1);
        assert_eq!(set.get(a).unwrap().velocity, -Vec3::X);
        assert_eq!(set.get(b).unwrap().velocity, Vec3::X);
    }

    #[test]
    fn test_removed_body_is_skipped() {
        let mut set = BodySet::new();
        let a = set.insert(ball(Vec3::new(-0.4, 0.0, 0.0), Vec3::X));
        let b = set.insert(ball(Vec3::new(0.4, 0.0, 0.0), -Vec3::X));
        let mut world = PhysicsWorld::new();
        world.add_body(a);
        world.add_body(b);

        set.remove(b);
        world.update(&mut set, 0.1);

        assert!(world.collision_events().is_empty());
        assert_relative_eq!(set.get(a).unwrap().position().x, -0.3, epsilon = 1e-5);
    }

    #[test]
    fn test_add_remove_body() {
        let mut set = BodySet::new();
        let a = set.insert(Body::default());
        let b = set.insert(Body::default());
        let c = set.insert(Body::default());
        let mut world = PhysicsWorld::new();

        world.add_body(a);
        world.add_body(b);
        world.add_body(a);
        world.add_body(c);
        assert_eq!(world.len(), 3);

        assert!(world.remove_body(b));
        assert!(!world.remove_body(b));
        assert_eq!(world.bodies(), &[a, c]);
    }

    #[test]
    fn test_events_cleared_each_update() {
        let mut set = BodySet::new();
        let a = set.insert(ball(Vec3::new(-0.4, 0.0, 0.0), Vec3::X));
        let b = set.insert(ball(Vec3::new(0.4, 0.0, 0.0), -Vec3::X));
        let mut world = PhysicsWorld::new();
        world.add_body(a);
        world.add_body(b);

        world.update(&mut set, 0.0);
        assert_eq!(world.collision_events().len(), 1);

        // After the bounce they move apart and stop touching
        world.update(&mut set, 1.0);
        assert!(world.collision_events().is_empty());
    }
}
