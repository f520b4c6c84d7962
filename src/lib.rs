//! hollow-core
//!
//! The simulation core for PS1-era 3D action games: an entity/component
//! registry and a capsule-vs-oriented-box collision engine. Rendering,
//! audio, input, UI and persistence are external collaborators - they
//! spawn entities, attach the plain data records defined here, register
//! their systems on the [`World`], and call `update`/`draw` once per
//! frame from their own frame pacer.
//!
//! Key concepts:
//! - [`Entity`]: generational index for safe entity references
//! - [`Registry`]: entity lifetimes, presence masks, component stores
//! - [`System`]: per-frame behavior unit, dispatched in registration order
//! - [`resolve_capsule_box`]: deepest-penetration narrow phase
//!
//! Design philosophy:
//! - Single-threaded, frame-stepped, no hidden global state
//! - Fixed memory budget: stores are sized to `MAX_ENTITIES` up front
//! - Component types registered explicitly at startup, in a fixed order

pub mod math;
pub mod entity;
pub mod component;
pub mod registry;
pub mod world;
pub mod components;
pub mod collision;
pub mod systems;

// Re-export main types
pub use entity::{Entity, MAX_ENTITIES};
pub use component::{ComponentTypeId, MAX_COMPONENT_TYPES};
pub use registry::{Registry, RegistryError};
pub use world::{System, World};
pub use components::{BoxCollider, CapsuleCollider, KinematicBody, Transform};
pub use collision::{
    Capsule, OrientedBox, PenetrationCandidate, WALKABLE_SLOPE, apply_penetration,
    resolve_capsule_box,
};
pub use systems::{MovementSystem, PhysicsSystem};
pub use math::Vec3;
