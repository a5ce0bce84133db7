//! # Entity — Lightweight Identity
//!
//! An [`Entity`] is a handle, not a container. The [`Scene`](super::scene::Scene)
//! that created it owns all of its components; the handle only names them.
//!
//! Handles use generational indices: a slot index paired with a generation
//! counter. When a slot is recycled after removal, its generation increments,
//! so any stale handle held by game code fails lookups safely instead of
//! aliasing a different entity.

use std::fmt;

/// A lightweight handle to an entity owned by one [`Scene`](super::scene::Scene).
///
/// Created via [`Scene::add_entity`](super::scene::Scene::add_entity) and
/// destroyed via [`Scene::remove_entity`](super::scene::Scene::remove_entity).
/// A handle is only valid for the scene that created it, and only while its
/// generation matches.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    /// Slot index, recycled after removal.
    pub(crate) index: u32,
    /// Bumped each time the slot is reused, so stale handles are detectable.
    pub(crate) generation: u32,
}

impl Entity {
    /// Returns the raw slot index. Useful for diagnostics, not for general use.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation counter.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Allocates and recycles entity slots for one scene.
///
/// Pops from the free list when available, otherwise grows. Removal bumps the
/// slot's generation and pushes the index back onto the free list.
pub(crate) struct EntityAllocator {
    /// One generation counter per slot ever allocated.
    generations: Vec<u32>,
    /// Slots available for reuse.
    free_list: Vec<u32>,
    /// Next fresh index when the free list is empty.
    len: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Allocate a handle, reusing a freed slot when one exists.
    pub fn allocate(&mut self) -> Entity {
        if let Some(index) = self.free_list.pop() {
            // Generation was already bumped when the slot was freed.
            let generation = self.generations[index as usize];
            Entity { index, generation }
        } else {
            let index = self.len;
            self.len += 1;
            self.generations.push(0);
            Entity {
                index,
                generation: 0,
            }
        }
    }

    /// Free a slot. Returns `false` if the handle was already stale.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        let idx = entity.index as usize;
        if idx < self.generations.len() && self.generations[idx] == entity.generation {
            self.generations[idx] += 1;
            self.free_list.push(entity.index);
            true
        } else {
            false
        }
    }

    /// Check whether a handle still refers to a live slot.
    pub fn is_alive(&self, entity: Entity) -> bool {
        let idx = entity.index as usize;
        idx < self.generations.len() && self.generations[idx] == entity.generation
    }

    /// Number of currently live entities.
    pub fn alive_count(&self) -> usize {
        (self.len as usize) - self.free_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let e1 = alloc.allocate();
        assert_eq!(e0.index, 0);
        assert_eq!(e1.index, 1);
        assert_eq!(e0.generation, 0);
        assert_eq!(e1.generation, 0);
    }

    #[test]
    fn recycle_bumps_generation() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        assert!(alloc.deallocate(e0));
        let reused = alloc.allocate();
        assert_eq!(reused.index, 0);
        assert_eq!(reused.generation, 1);
    }

    #[test]
    fn stale_handle_detected() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        assert!(alloc.is_alive(e0));
        alloc.deallocate(e0);
        assert!(!alloc.is_alive(e0));
    }

    #[test]
    fn double_free_returns_false() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        assert!(alloc.deallocate(e0));
        assert!(!alloc.deallocate(e0));
    }

    #[test]
    fn alive_count_tracks_removals() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let _e1 = alloc.allocate();
        assert_eq!(alloc.alive_count(), 2);
        alloc.deallocate(e0);
        assert_eq!(alloc.alive_count(), 1);
    }
}
