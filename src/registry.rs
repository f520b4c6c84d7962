//! Entity/Component Registry
//!
//! The central container for game state: entity lifetimes, one presence
//! bitmask per entity, and a type-erased collection of component stores.
//! Systems read and write entity data exclusively through this type.
//!
//! Component types are registered explicitly, once, at startup, in a
//! fixed order - ids are deterministic across runs instead of depending
//! on which code path happened to touch a type first. Registration is
//! the only fallible configuration step; per-frame operations never
//! allocate a type id.
//!
//! Destroying an entity clears its presence mask and recycles its index,
//! but does not touch component payloads - they are left stale behind
//! cleared bits. `has`/`get` consult the mask (and the handle's
//! generation), so stale payloads are unobservable through the API.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use fixedbitset::FixedBitSet;
use log::warn;
use thiserror::Error;

use crate::component::{ComponentStore, ComponentTypeId, MAX_COMPONENT_TYPES};
use crate::entity::{Entity, EntityAllocator, MAX_ENTITIES};

/// Startup-time configuration errors. Runtime capacity exhaustion is
/// signaled by sentinel returns instead, so the per-frame path stays
/// branch-light.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// More distinct component types registered than presence masks can
    /// track. Raise `MAX_COMPONENT_TYPES` or register fewer types.
    #[error("component type limit ({MAX_COMPONENT_TYPES}) exceeded registering {0}")]
    ComponentTypesExhausted(&'static str),
}

/// The registry owning all entities and their components.
pub struct Registry {
    /// Entity allocator for creating/destroying entities
    entities: EntityAllocator,
    /// One presence mask per entity slot, one bit per component type id
    masks: Vec<FixedBitSet>,
    /// Registered component types, keyed by Rust type
    type_ids: HashMap<TypeId, ComponentTypeId>,
    /// Type-erased `ComponentStore<T>` boxes, indexed by type id
    stores: Vec<Box<dyn Any>>,
}

impl Registry {
    /// Create an empty registry with no component types registered.
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            masks: (0..MAX_ENTITIES)
                .map(|_| FixedBitSet::with_capacity(MAX_COMPONENT_TYPES))
                .collect(),
            type_ids: HashMap::new(),
            stores: Vec::new(),
        }
    }

    // =========================================================================
    // Component Type Registration
    // =========================================================================

    /// Register a component type, creating its store.
    ///
    /// Call once per type at startup, in a fixed order - the returned id
    /// is the type's bit position in every presence mask. Registering an
    /// already-registered type returns the existing id.
    pub fn register<T: 'static>(&mut self) -> Result<ComponentTypeId, RegistryError> {
        let type_id = TypeId::of::<T>();
        if let Some(&id) = self.type_ids.get(&type_id) {
            return Ok(id);
        }

        let index = self.stores.len();
        if index >= MAX_COMPONENT_TYPES {
            return Err(RegistryError::ComponentTypesExhausted(type_name::<T>()));
        }

        let id = ComponentTypeId::new(index as u8);
        self.type_ids.insert(type_id, id);
        self.stores.push(Box::new(ComponentStore::<T>::new()));
        Ok(id)
    }

    /// Look up the id assigned to a registered component type.
    pub fn component_type_id<T: 'static>(&self) -> Option<ComponentTypeId> {
        self.type_ids.get(&TypeId::of::<T>()).copied()
    }

    // =========================================================================
    // Entity Management
    // =========================================================================

    /// Create a new entity with no components.
    /// Returns `Entity::NULL` when the pool is exhausted.
    pub fn create(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Destroy an entity: clear its presence mask and recycle its index.
    /// Component payloads stay in place, masked off. Null, stale, and
    /// already-destroyed handles are ignored.
    pub fn destroy(&mut self, entity: Entity) {
        if self.entities.free(entity) {
            self.masks[entity.index() as usize].clear();
        }
    }

    /// Check if an entity handle is currently alive (index live and
    /// generation current).
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of currently alive entities.
    pub fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    /// Iterate over all live entities, in index order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter_live()
    }

    // =========================================================================
    // Component Access
    // =========================================================================

    /// Attach a component to an entity, overwriting any existing payload
    /// of the same type. The type must have been registered; attaching to
    /// a dead or stale handle is ignored.
    pub fn add<T: 'static>(&mut self, entity: Entity, component: T) {
        if !self.entities.is_alive(entity) {
            return;
        }
        let Some(&id) = self.type_ids.get(&TypeId::of::<T>()) else {
            debug_assert!(false, "component type {} not registered", type_name::<T>());
            warn!("add ignored: component type {} not registered", type_name::<T>());
            return;
        };
        // Registered stores always downcast; the map and the store list
        // are only ever written together in register().
        if let Some(store) = self.stores[id.index()].downcast_mut::<ComponentStore<T>>() {
            store.insert(entity.index(), component);
            self.masks[entity.index() as usize].insert(id.index());
        }
    }

    /// Test whether an entity has a component of type `T`.
    /// Pure bit test - no payload access. False for dead/stale handles
    /// and unregistered types.
    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }
        match self.type_ids.get(&TypeId::of::<T>()) {
            Some(id) => self.masks[entity.index() as usize].contains(id.index()),
            None => false,
        }
    }

    /// Get a component of a live entity. `None` when the presence bit is
    /// clear or the handle is dead/stale.
    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        if !self.has::<T>(entity) {
            return None;
        }
        let id = self.type_ids.get(&TypeId::of::<T>())?;
        self.stores[id.index()]
            .downcast_ref::<ComponentStore<T>>()
            .and_then(|store| store.get(entity.index()))
    }

    /// Get a mutable component of a live entity.
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.has::<T>(entity) {
            return None;
        }
        let id = self.type_ids.get(&TypeId::of::<T>()).copied()?;
        self.stores[id.index()]
            .downcast_mut::<ComponentStore<T>>()
            .and_then(|store| store.get_mut(entity.index()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
