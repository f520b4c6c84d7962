//! Built-in Systems
//!
//! The movement and physics passes that drive dynamic actors. Game code
//! registers these on the `World` - movement strictly before physics,
//! since physics consumes the positions movement wrote this frame.
//!
//! Movement integrates velocity and gravity; physics then resolves the
//! actor's capsule against every static box obstacle, one pair at a
//! time, applying the deepest correction per pair and re-deriving the
//! grounded flag.

use crate::collision::{Capsule, OrientedBox, apply_penetration, resolve_capsule_box};
use crate::components::{BoxCollider, CapsuleCollider, KinematicBody, Transform};
use crate::entity::Entity;
use crate::math::Vec3;
use crate::registry::Registry;
use crate::world::System;

/// Gravity integration and position advance for every entity with a
/// `Transform` and a `KinematicBody`.
///
/// Clears `grounded` after using it, so the physics pass (or nothing)
/// re-derives it from this frame's contacts.
pub struct MovementSystem {
    /// Downward acceleration, units per second squared
    pub gravity: f32,
    /// Cap on downward speed, units per second
    pub terminal_velocity: f32,
}

impl MovementSystem {
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity,
            terminal_velocity: 40.0,
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl System for MovementSystem {
    fn update(&mut self, registry: &mut Registry, dt: f32) {
        let entities: Vec<Entity> = registry.entities().collect();
        for entity in entities {
            let Some(mut body) = registry.get::<KinematicBody>(entity).copied() else {
                continue;
            };
            let Some(mut transform) = registry.get::<Transform>(entity).copied() else {
                continue;
            };

            // Gravity accumulates into velocity while airborne
            if !body.grounded {
                body.velocity.y = (body.velocity.y - self.gravity * dt).max(-self.terminal_velocity);
            }
            body.grounded = false;

            transform.position = transform.position + body.velocity * dt;

            if let Some(slot) = registry.get_mut::<KinematicBody>(entity) {
                *slot = body;
            }
            if let Some(slot) = registry.get_mut::<Transform>(entity) {
                *slot = transform;
            }
        }
    }
}

/// Capsule-vs-box resolution for every entity with a `Transform`, a
/// `CapsuleCollider` and a `KinematicBody`, against every entity with a
/// `Transform` and a `BoxCollider`.
///
/// Pairs are resolved greedily in iteration order - each correction
/// moves the capsule before the next obstacle is tested. Wedged
/// multi-obstacle configurations settle over a few frames.
#[derive(Default)]
pub struct PhysicsSystem;

impl PhysicsSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for PhysicsSystem {
    fn update(&mut self, registry: &mut Registry, _dt: f32) {
        let entities: Vec<Entity> = registry.entities().collect();

        let actors: Vec<Entity> = entities
            .iter()
            .copied()
            .filter(|&e| {
                registry.has::<CapsuleCollider>(e)
                    && registry.has::<KinematicBody>(e)
                    && registry.has::<Transform>(e)
            })
            .collect();

        for actor in actors {
            let Some(shape) = registry.get::<CapsuleCollider>(actor).copied() else {
                continue;
            };

            for &obstacle in &entities {
                if obstacle == actor || !registry.has::<BoxCollider>(obstacle) {
                    continue;
                }
                let Some(obstacle_transform) = registry.get::<Transform>(obstacle).copied() else {
                    continue;
                };
                let Some(collider) = registry.get::<BoxCollider>(obstacle).copied() else {
                    continue;
                };

                // Re-read per pair: the previous pair's correction moved us
                let Some(mut transform) = registry.get::<Transform>(actor).copied() else {
                    continue;
                };
                let Some(mut body) = registry.get::<KinematicBody>(actor).copied() else {
                    continue;
                };

                let capsule =
                    Capsule::from_base(transform.position, Vec3::UP, shape.radius, shape.height);
                let obb = OrientedBox::from_position_rotation(
                    obstacle_transform.position,
                    obstacle_transform.rotation,
                    collider.half_extents * obstacle_transform.scale,
                );

                if let Some(hit) = resolve_capsule_box(&capsule, &obb) {
                    apply_penetration(&mut transform, &mut body, &hit);
                    if let Some(slot) = registry.get_mut::<Transform>(actor) {
                        *slot = transform;
                    }
                    if let Some(slot) = registry.get_mut::<KinematicBody>(actor) {
                        *slot = body;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    const DT: f32 = 1.0 / 60.0;

    fn physics_world() -> World {
        let mut registry = Registry::new();
        registry.register::<Transform>().unwrap();
        registry.register::<KinematicBody>().unwrap();
        registry.register::<CapsuleCollider>().unwrap();
        registry.register::<BoxCollider>().unwrap();
        World::with_registry(registry)
    }

    fn spawn_actor(world: &mut World, position: Vec3) -> Entity {
        let reg = world.registry_mut();
        let actor = reg.create();
        reg.add(actor, Transform::from_position(position));
        reg.add(actor, KinematicBody::new());
        reg.add(actor, CapsuleCollider::new(0.4, 1.8));
        actor
    }

    fn spawn_box(world: &mut World, position: Vec3, half_extents: Vec3) -> Entity {
        let reg = world.registry_mut();
        let obstacle = reg.create();
        reg.add(obstacle, Transform::from_position(position));
        reg.add(obstacle, BoxCollider { half_extents });
        obstacle
    }

    #[test]
    fn test_gravity_accumulates_until_terminal() {
        let mut world = physics_world();
        let actor = spawn_actor(&mut world, Vec3::new(0.0, 100.0, 0.0));
        world.add_system(MovementSystem::new(20.0));

        world.update(DT);
        let v1 = world.registry().get::<KinematicBody>(actor).unwrap().velocity.y;
        world.update(DT);
        let v2 = world.registry().get::<KinematicBody>(actor).unwrap().velocity.y;
        assert!(v2 < v1 && v1 < 0.0);

        // Long fall caps at terminal velocity
        for _ in 0..1000 {
            world.update(DT);
        }
        let v = world.registry().get::<KinematicBody>(actor).unwrap().velocity.y;
        assert!((v + 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_actor_lands_on_floor() {
        let mut world = physics_world();
        // Floor slab: top face at y = 1.0
        spawn_box(&mut world, Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 1.0, 10.0));
        let actor = spawn_actor(&mut world, Vec3::new(0.0, 3.0, 0.0));

        world.add_system(MovementSystem::new(20.0));
        world.add_system(PhysicsSystem::new());

        let mut grounded_seen = false;
        for _ in 0..180 {
            world.update(DT);
            grounded_seen |= world.registry().get::<KinematicBody>(actor).unwrap().grounded;
        }

        let transform = world.registry().get::<Transform>(actor).unwrap();
        let body = world.registry().get::<KinematicBody>(actor).unwrap();

        // Feet settle on the slab top. Contact alternates with exact
        // separation frame to frame, so allow one gravity step of sink.
        assert!((transform.position.y - 1.0).abs() < 0.02);
        assert!(body.velocity.y.abs() < 20.0 * DT * 2.0 + 1e-3);
        assert!(grounded_seen);
    }

    #[test]
    fn test_wall_stops_and_slides() {
        let mut world = physics_world();
        // Wall occupying x in [3, 5]
        spawn_box(&mut world, Vec3::new(4.0, 0.0, 0.0), Vec3::new(1.0, 5.0, 5.0));
        let actor = spawn_actor(&mut world, Vec3::new(2.7, -0.5, 0.0));
        world
            .registry_mut()
            .get_mut::<KinematicBody>(actor)
            .unwrap()
            .velocity = Vec3::new(2.0, 0.0, 1.0);

        // No gravity: isolate the horizontal push
        world.add_system(MovementSystem::new(0.0));
        world.add_system(PhysicsSystem::new());

        for _ in 0..30 {
            world.update(DT);
        }

        let transform = world.registry().get::<Transform>(actor).unwrap();
        let body = world.registry().get::<KinematicBody>(actor).unwrap();

        // Pushed out of the wall, x velocity absorbed, z slide intact
        assert!(transform.position.x <= 2.6 + 1e-3);
        assert!(body.velocity.x.abs() < 1e-3);
        assert!((body.velocity.z - 1.0).abs() < 1e-3);
        assert!(!body.grounded);
    }

    #[test]
    fn test_scaled_obstacle_half_extents() {
        let mut world = physics_world();
        // Unit box scaled 2x: occupies y up to 2.0
        let obstacle = spawn_box(&mut world, Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        world
            .registry_mut()
            .get_mut::<Transform>(obstacle)
            .unwrap()
            .scale = 2.0;

        let actor = spawn_actor(&mut world, Vec3::new(0.0, 1.7, 0.0));
        world.add_system(MovementSystem::new(0.0));
        world.add_system(PhysicsSystem::new());

        world.update(DT);

        // Capsule bottom sphere at y 2.1 overlaps the scaled top face at 2.0
        let transform = world.registry().get::<Transform>(actor).unwrap();
        assert!(transform.position.y > 1.7);
    }

    #[test]
    fn test_static_boxes_ignore_each_other() {
        let mut world = physics_world();
        let a = spawn_box(&mut world, Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        let b = spawn_box(&mut world, Vec3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));

        world.add_system(PhysicsSystem::new());
        world.update(DT);

        // Overlapping obstacles without bodies are left alone
        let pa = world.registry().get::<Transform>(a).unwrap().position;
        let pb = world.registry().get::<Transform>(b).unwrap().position;
        assert_eq!(pa, Vec3::ZERO);
        assert_eq!(pb, Vec3::new(0.5, 0.0, 0.0));
    }
}
