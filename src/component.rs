//! Component Storage
//!
//! Components are plain data attached to entities. This module provides
//! `ComponentStore<T>` - a dense array sized to the full entity pool and
//! indexed directly by entity index - plus the small integer id assigned
//! to each component type on registration.
//!
//! Unlike archetype ECSes (which group entities by component sets), we
//! use one flat array per type. For PS1-scale games (hundreds of
//! entities), the simpler layout is fine and easier to reason about.
//!
//! Presence is tracked by the registry's per-entity bitmask, not here:
//! the store keeps whatever payload was last written to a slot, and a
//! destroyed entity's payload is simply left stale behind a cleared bit.

use serde::{Serialize, Deserialize};
use crate::entity::MAX_ENTITIES;

/// Hard cap on distinct component types. Exceeding it is a configuration
/// error surfaced at registration time, never mid-frame.
pub const MAX_COMPONENT_TYPES: usize = 32;

/// Small integer id for a component type, assigned by
/// [`Registry::register`](crate::registry::Registry::register) in call
/// order. Doubles as the bit position in entity presence masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentTypeId(u8);

impl ComponentTypeId {
    pub(crate) fn new(index: u8) -> Self {
        Self(index)
    }

    /// Bit position / store index for this type.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Dense storage for a single component type.
///
/// One slot per entity index, allocated up front. Slots are overwritten
/// in place on insert and never compacted; whether a slot is meaningful
/// is the presence mask's call.
pub struct ComponentStore<T> {
    data: Vec<Option<T>>,
}

impl<T> ComponentStore<T> {
    /// Create storage with one slot per entity in the pool.
    pub fn new() -> Self {
        let mut data = Vec::with_capacity(MAX_ENTITIES);
        data.resize_with(MAX_ENTITIES, || None);
        Self { data }
    }

    /// Write a component into an entity's slot, replacing any previous
    /// payload (stale or live).
    pub fn insert(&mut self, index: u32, component: T) {
        self.data[index as usize] = Some(component);
    }

    /// Get a reference to the payload at an entity's slot.
    pub fn get(&self, index: u32) -> Option<&T> {
        self.data.get(index as usize).and_then(|opt| opt.as_ref())
    }

    /// Get a mutable reference to the payload at an entity's slot.
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.data.get_mut(index as usize).and_then(|opt| opt.as_mut())
    }
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut store: ComponentStore<i32> = ComponentStore::new();
        store.insert(5, 42);
        assert_eq!(store.get(5), Some(&42));
        assert_eq!(store.get(4), None);
    }

    #[test]
    fn test_overwrite_in_place() {
        let mut store: ComponentStore<&str> = ComponentStore::new();
        store.insert(3, "first");
        store.insert(3, "second");
        assert_eq!(store.get(3), Some(&"second"));
    }

    #[test]
    fn test_full_pool_addressable() {
        let mut store: ComponentStore<u32> = ComponentStore::new();
        let last = (MAX_ENTITIES - 1) as u32;
        store.insert(last, 999);
        assert_eq!(store.get(last), Some(&999));
    }

    #[test]
    fn test_get_mut() {
        let mut store: ComponentStore<i32> = ComponentStore::new();
        store.insert(0, 10);
        if let Some(v) = store.get_mut(0) {
            *v += 5;
        }
        assert_eq!(store.get(0), Some(&15));
    }
}
