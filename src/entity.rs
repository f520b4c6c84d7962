//! Entity Identifiers and Allocation
//!
//! Entities are lightweight identifiers that reference game objects.
//! The allocator hands out indices from a fixed pool of `MAX_ENTITIES`
//! slots through a FIFO free list, so a destroyed index becomes eligible
//! for reuse exactly once, and only after the indices queued ahead of it.
//!
//! Each slot also carries a generation counter. When a slot is freed the
//! generation increments, invalidating any handles still held elsewhere:
//! a reference to a dead enemy won't accidentally match a new enemy that
//! reused the slot.

use std::collections::VecDeque;
use fixedbitset::FixedBitSet;
use log::warn;
use serde::{Serialize, Deserialize};

/// Hard cap on simultaneously live entities. Component stores are sized
/// to this up front, so it doubles as the fixed memory budget per type.
pub const MAX_ENTITIES: usize = 1024;

/// A unique identifier for a game entity.
///
/// Consists of an index (which slot in the entity pool) and a generation
/// (which version of that slot). Two entities with the same index but
/// different generations are different entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Index into component storage, `< MAX_ENTITIES` for live entities
    index: u32,
    /// Generation counter - increments when the slot is reused
    generation: u32,
}

impl Entity {
    /// Should only be called by EntityAllocator.
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Get the index of this entity (for component array access).
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Get the generation of this entity.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// A null/invalid entity reference. Returned by `allocate` on pool
    /// exhaustion; also useful for "no target" fields.
    pub const NULL: Entity = Entity { index: u32::MAX, generation: 0 };

    /// Check if this is the null entity.
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

/// Allocates and tracks entity lifetimes over a fixed slot pool.
///
/// The free list starts seeded with every index in `0..MAX_ENTITIES` and
/// is consumed front-to-back; freed indices rejoin at the tail.
pub struct EntityAllocator {
    /// Generation counter for each slot
    generations: Vec<u32>,
    /// FIFO free list of slot indices
    free: VecDeque<u32>,
    /// One bit per slot: set while the slot is live
    live: FixedBitSet,
    /// Number of currently alive entities
    alive_count: u32,
}

impl EntityAllocator {
    /// Create an allocator with the full slot pool free.
    pub fn new() -> Self {
        Self {
            generations: vec![0; MAX_ENTITIES],
            free: (0..MAX_ENTITIES as u32).collect(),
            live: FixedBitSet::with_capacity(MAX_ENTITIES),
            alive_count: 0,
        }
    }

    /// Allocate a new entity. Returns `Entity::NULL` when the pool is
    /// exhausted - callers must check before use.
    pub fn allocate(&mut self) -> Entity {
        let Some(index) = self.free.pop_front() else {
            warn!("entity pool exhausted ({MAX_ENTITIES} live)");
            return Entity::NULL;
        };
        self.live.insert(index as usize);
        self.alive_count += 1;
        Entity::new(index, self.generations[index as usize])
    }

    /// Free an entity, queueing its slot for reuse.
    /// Returns true if the entity was alive and is now freed; false for
    /// null, stale, or already-freed handles.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        // Increment generation to invalidate existing references
        self.generations[entity.index as usize] += 1;
        self.live.set(entity.index as usize, false);
        self.free.push_back(entity.index);
        self.alive_count -= 1;
        true
    }

    /// Check if an entity is currently alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        let idx = entity.index as usize;
        idx < MAX_ENTITIES
            && self.live.contains(idx)
            && self.generations[idx] == entity.generation
    }

    /// Get the number of currently alive entities.
    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Iterate over all live entities, in index order.
    pub fn iter_live(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live
            .ones()
            .map(|idx| Entity::new(idx as u32, self.generations[idx]))
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
