//! World and System Scheduling
//!
//! A `System` is a per-frame behavior unit; the `World` owns the registry
//! and an ordered list of systems, and drives them strictly in
//! registration order - first for `update`, then again for `draw`.
//!
//! Registration order is a caller-visible contract: a system that
//! consumes another system's same-frame output (movement before physics,
//! physics before render) must be registered after it. Everything runs
//! single-threaded inside one frame slice; the registry is borrowed by
//! exactly one system at a time, for the duration of one call, and
//! systems hold no reference to the world between calls.

use std::any::Any;

use crate::registry::Registry;

/// A per-frame behavior unit.
///
/// Both operations default to doing nothing - a system implements only
/// the one it needs. The registry is passed in per call rather than
/// stored, so systems stay unit-testable against a bare `Registry`.
pub trait System: Any {
    /// Advance simulation state by `dt` seconds.
    fn update(&mut self, _registry: &mut Registry, _dt: f32) {}

    /// Emit draw commands from current state. Read-only.
    fn draw(&mut self, _registry: &Registry) {}
}

/// The world: one registry plus the ordered system list.
pub struct World {
    registry: Registry,
    systems: Vec<Box<dyn System>>,
}

impl World {
    /// Create a world around an empty registry.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            systems: Vec::new(),
        }
    }

    /// Create a world around a pre-configured registry (component types
    /// already registered, entities possibly spawned).
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            systems: Vec::new(),
        }
    }

    /// Access the registry outside the frame loop (spawning, setup).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable registry access outside the frame loop.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Append a system to the end of the dispatch order.
    pub fn add_system<S: System>(&mut self, system: S) {
        self.systems.push(Box::new(system));
    }

    /// Typed access to a registered system (first match by type), for
    /// tweaking its configuration between frames.
    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems.iter_mut().find_map(|system| {
            let any: &mut dyn Any = &mut **system;
            any.downcast_mut::<S>()
        })
    }

    /// Run every system's `update`, in registration order.
    pub fn update(&mut self, dt: f32) {
        for system in self.systems.iter_mut() {
            system.update(&mut self.registry, dt);
        }
    }

    /// Run every system's `draw`, in registration order.
    pub fn draw(&mut self) {
        for system in self.systems.iter_mut() {
            system.draw(&self.registry);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shared scratch component the test systems append to, so dispatch
    /// order is observable through the registry alone.
    #[derive(Debug, Clone, Default)]
    struct Trace(Vec<&'static str>);

    struct Stamper {
        name: &'static str,
        target: crate::entity::Entity,
    }

    impl System for Stamper {
        fn update(&mut self, registry: &mut Registry, _dt: f32) {
            if let Some(trace) = registry.get_mut::<Trace>(self.target) {
                trace.0.push(self.name);
            }
        }
    }

    struct Counter {
        updates: u32,
        draws: u32,
    }

    impl System for Counter {
        fn update(&mut self, _registry: &mut Registry, _dt: f32) {
            self.updates += 1;
        }
        fn draw(&mut self, _registry: &Registry) {
            self.draws += 1;
        }
    }

    #[test]
    fn test_update_runs_in_registration_order() {
        let mut world = World::new();
        world.registry_mut().register::<Trace>().unwrap();
        let e = world.registry_mut().create();
        world.registry_mut().add(e, Trace::default());

        world.add_system(Stamper { name: "movement", target: e });
        world.add_system(Stamper { name: "physics", target: e });
        world.add_system(Stamper { name: "render", target: e });

        world.update(1.0 / 60.0);
        world.update(1.0 / 60.0);

        let trace = world.registry().get::<Trace>(e).unwrap();
        assert_eq!(
            trace.0,
            vec!["movement", "physics", "render", "movement", "physics", "render"]
        );
    }

    #[test]
    fn test_default_ops_are_no_ops() {
        struct Inert;
        impl System for Inert {}

        let mut world = World::new();
        world.add_system(Inert);
        world.update(0.016);
        world.draw();
    }

    #[test]
    fn test_system_mut_typed_access() {
        let mut world = World::new();
        world.add_system(Counter { updates: 0, draws: 0 });

        world.update(0.016);
        world.draw();
        world.draw();

        let counter = world.system_mut::<Counter>().unwrap();
        assert_eq!(counter.updates, 1);
        assert_eq!(counter.draws, 2);

        struct Unregistered;
        impl System for Unregistered {}
        assert!(world.system_mut::<Unregistered>().is_none());
    }
}
