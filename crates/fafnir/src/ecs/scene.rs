//! # Scene — The Owned Entity Graph
//!
//! A [`Scene`] owns every entity and component for one loaded level or level
//! segment. Entities live in an insertion-ordered list (iteration order is a
//! determinism contract), and each entity holds an ordered list of component
//! slots.
//!
//! ## Mutation during iteration
//!
//! Systems add and remove entities while other systems are still walking the
//! scene in the same tick. The contract is index-free snapshot iteration:
//! a system captures the identity list with [`Scene::snapshot`] at the start
//! of its pass and resolves liveness per visit. Entities removed mid-pass are
//! skipped when reached; entities added mid-pass wait for the next pass.
//!
//! ## Slot take/restore
//!
//! Behavior dispatch needs to call a component's hooks with `&mut Scene` in
//! hand. To avoid aliasing, the dispatcher takes the component box out of its
//! slot for the duration of the callback and restores it afterwards; if the
//! callback removed the entity, the component is simply dropped. Each slot
//! carries a scene-unique id so a restore never lands in the wrong slot after
//! surrounding components were removed.

use std::any::TypeId;
use std::collections::HashMap;

use crate::ecs::component::Component;
use crate::ecs::entity::{Entity, EntityAllocator};
use crate::error::ModelError;

/// One component attached to an entity. `component` is `None` only while the
/// behavior dispatcher has it taken out for a callback.
struct ComponentSlot {
    component: Option<Box<dyn Component>>,
    /// Whether `on_start` has already run for this instance.
    started: bool,
    /// Scene-unique slot id, stable across add/remove of sibling slots.
    id: u64,
}

#[derive(Default)]
struct EntityRecord {
    slots: Vec<ComponentSlot>,
}

/// Owns the entity graph for one loaded level/level-segment.
pub struct Scene {
    allocator: EntityAllocator,
    /// Live entities in insertion order.
    order: Vec<Entity>,
    /// Component storage, keyed by entity slot index.
    records: HashMap<u32, EntityRecord>,
    /// Non-owning transform hierarchy: child index to parent handle.
    parents: HashMap<u32, Entity>,
    /// Non-owning transform hierarchy: parent index to ordered children.
    children: HashMap<u32, Vec<Entity>>,
    /// Name of the scene behavior to run on load (metadata only; the
    /// surrounding application maps it to a setup routine).
    behavior_name: String,
    next_slot_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_behavior("")
    }

    /// Create a scene with the given scene-behavior name.
    pub fn with_behavior(behavior_name: impl Into<String>) -> Self {
        Self {
            allocator: EntityAllocator::new(),
            order: Vec::new(),
            records: HashMap::new(),
            parents: HashMap::new(),
            children: HashMap::new(),
            behavior_name: behavior_name.into(),
            next_slot_id: 0,
        }
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// The scene-behavior name used to run on-load setup.
    pub fn behavior_name(&self) -> &str {
        &self.behavior_name
    }

    pub fn set_behavior_name(&mut self, name: impl Into<String>) {
        self.behavior_name = name.into();
    }

    // ── Entity lifecycle ─────────────────────────────────────────────

    /// Create an empty entity owned by this scene, appended to the end of the
    /// iteration order. O(1) amortized.
    pub fn add_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.order.push(entity);
        self.records.insert(entity.index, EntityRecord::default());
        entity
    }

    /// Remove an entity, detaching all of its components immediately.
    ///
    /// Fails with [`ModelError::EntityNotOwned`] if the entity is not owned by
    /// this scene (stale handle, or a handle from a different scene).
    pub fn remove_entity(&mut self, entity: Entity) -> Result<(), ModelError> {
        self.ensure_owned(entity)?;

        // Drop all components.
        self.records.remove(&entity.index);
        self.order.retain(|&e| e != entity);

        // Detach hierarchy links in both directions. Links are non-owning, so
        // children survive their parent's removal.
        if let Some(parent) = self.parents.remove(&entity.index) {
            if let Some(siblings) = self.children.get_mut(&parent.index) {
                siblings.retain(|&c| c != entity);
            }
        }
        if let Some(orphans) = self.children.remove(&entity.index) {
            for child in orphans {
                self.parents.remove(&child.index);
            }
        }

        self.allocator.deallocate(entity);
        Ok(())
    }

    /// Whether this scene owns the entity and it is still alive.
    pub fn contains(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity) && self.records.contains_key(&entity.index)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.order.len()
    }

    /// Iterate live entities in insertion order. Lazy and restartable; for
    /// iteration that must tolerate structural mutation, use [`snapshot`](Self::snapshot).
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }

    /// Capture the identity list for one system pass. Callers re-check
    /// [`contains`](Self::contains) per visit so removals are skipped and
    /// additions wait for the next pass.
    pub fn snapshot(&self) -> Vec<Entity> {
        self.order.clone()
    }

    // ── Components ──────────────────────────────────────────────────

    /// Attach a component to an entity, appended after its existing components.
    ///
    /// Fails with [`ModelError::SingletonViolation`] if the component declares
    /// itself singleton-per-entity and an instance of the same type is already
    /// attached.
    pub fn add_component<C: Component>(
        &mut self,
        entity: Entity,
        component: C,
    ) -> Result<(), ModelError> {
        self.add_boxed_component(entity, Box::new(component))
    }

    /// Attach an already-boxed component. Used by scene loading, where the
    /// concrete type is only known to the registry adapter.
    pub fn add_boxed_component(
        &mut self,
        entity: Entity,
        component: Box<dyn Component>,
    ) -> Result<(), ModelError> {
        self.ensure_owned(entity)?;

        let type_id = component.as_any().type_id();
        let record = self.records.get_mut(&entity.index).expect("owned entity has a record");
        if component.singleton() && record_has_type(record, type_id) {
            return Err(ModelError::SingletonViolation {
                entity,
                component: component.component_id(),
            });
        }

        let id = self.next_slot_id;
        self.next_slot_id += 1;
        record.slots.push(ComponentSlot {
            component: Some(component),
            started: false,
            id,
        });
        Ok(())
    }

    /// Get the single component of type `T` on an entity.
    ///
    /// Fails with [`ModelError::ComponentNotFound`] if absent and
    /// [`ModelError::AmbiguousComponent`] if more than one instance exists
    /// (use [`components`](Self::components) for multi-instance types).
    pub fn component<T: Component>(&self, entity: Entity) -> Result<&T, ModelError> {
        self.ensure_owned(entity)?;
        let mut matches = self.components::<T>(entity);
        let first = matches.next().ok_or(ModelError::ComponentNotFound {
            entity,
            type_name: std::any::type_name::<T>(),
        })?;
        if matches.next().is_some() {
            return Err(ModelError::AmbiguousComponent {
                entity,
                type_name: std::any::type_name::<T>(),
            });
        }
        Ok(first)
    }

    /// Mutable variant of [`component`](Self::component).
    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, ModelError> {
        self.ensure_owned(entity)?;
        let type_name = std::any::type_name::<T>();
        let record = self.records.get_mut(&entity.index).expect("owned entity has a record");
        let mut found: Option<usize> = None;
        for (i, slot) in record.slots.iter().enumerate() {
            let is_match = slot
                .component
                .as_ref()
                .is_some_and(|c| c.as_any().is::<T>());
            if is_match {
                if found.is_some() {
                    return Err(ModelError::AmbiguousComponent { entity, type_name });
                }
                found = Some(i);
            }
        }
        let index = found.ok_or(ModelError::ComponentNotFound { entity, type_name })?;
        let component = record.slots[index]
            .component
            .as_mut()
            .expect("match implies a present component");
        Ok(component
            .as_any_mut()
            .downcast_mut::<T>()
            .expect("match implies type T"))
    }

    /// All components of type `T` on an entity, in attachment order. Empty if
    /// the entity has none or is not owned by this scene.
    pub fn components<T: Component>(&self, entity: Entity) -> impl Iterator<Item = &T> + '_ {
        self.record(entity)
            .into_iter()
            .flat_map(|r| r.slots.iter())
            .filter_map(|s| s.component.as_deref())
            .filter_map(|c| c.as_any().downcast_ref::<T>())
    }

    /// Whether the entity has at least one component of type `T`.
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components::<T>(entity).next().is_some()
    }

    /// Detach every component of type `T` from an entity. Returns the number
    /// removed.
    ///
    /// A component whose slot is currently taken by the behavior dispatcher
    /// (its own callback is running) is not removed; it survives until entity
    /// removal.
    pub fn remove_components<T: Component>(&mut self, entity: Entity) -> Result<usize, ModelError> {
        self.ensure_owned(entity)?;
        let record = self.records.get_mut(&entity.index).expect("owned entity has a record");
        let before = record.slots.len();
        record
            .slots
            .retain(|s| !s.component.as_ref().is_some_and(|c| c.as_any().is::<T>()));
        Ok(before - record.slots.len())
    }

    // ── Hierarchy (non-owning) ──────────────────────────────────────

    /// Link `child` under `parent` for transform purposes. The link is
    /// non-owning: the scene remains the sole owner of entity lifetime, and
    /// removing either side only clears the link.
    pub fn set_parent(&mut self, child: Entity, parent: Entity) -> Result<(), ModelError> {
        self.ensure_owned(child)?;
        self.ensure_owned(parent)?;
        self.clear_parent(child)?;
        self.parents.insert(child.index, parent);
        self.children.entry(parent.index).or_default().push(child);
        Ok(())
    }

    /// Remove `child`'s parent link, if any.
    pub fn clear_parent(&mut self, child: Entity) -> Result<(), ModelError> {
        self.ensure_owned(child)?;
        if let Some(parent) = self.parents.remove(&child.index) {
            if let Some(siblings) = self.children.get_mut(&parent.index) {
                siblings.retain(|&c| c != child);
            }
        }
        Ok(())
    }

    pub fn parent_of(&self, child: Entity) -> Option<Entity> {
        if !self.contains(child) {
            return None;
        }
        self.parents.get(&child.index).copied()
    }

    /// Children of `parent`, in the order the links were made.
    pub fn children_of(&self, parent: Entity) -> Vec<Entity> {
        if !self.contains(parent) {
            return Vec::new();
        }
        self.children.get(&parent.index).cloned().unwrap_or_default()
    }

    // ── Type-erased access (serialization, behavior dispatch) ────────

    /// Iterate an entity's components in attachment order as trait objects.
    pub(crate) fn raw_components(&self, entity: Entity) -> impl Iterator<Item = &dyn Component> + '_ {
        self.record(entity)
            .into_iter()
            .flat_map(|r| r.slots.iter())
            .filter_map(|s| s.component.as_deref())
    }

    /// Slot ids of an entity's components at this moment. The behavior
    /// dispatcher captures these per visit so components attached during the
    /// visit wait for the next pass.
    pub(crate) fn slot_ids(&self, entity: Entity) -> Vec<u64> {
        self.record(entity)
            .map(|r| r.slots.iter().map(|s| s.id).collect())
            .unwrap_or_default()
    }

    /// Take a component out of its slot for a behavior callback. Returns the
    /// component and its started flag, or `None` if the slot is gone or
    /// already taken.
    pub(crate) fn take_slot(
        &mut self,
        entity: Entity,
        slot_id: u64,
    ) -> Option<(Box<dyn Component>, bool)> {
        if !self.contains(entity) {
            return None;
        }
        let record = self.records.get_mut(&entity.index)?;
        let slot = record.slots.iter_mut().find(|s| s.id == slot_id)?;
        let component = slot.component.take()?;
        Some((component, slot.started))
    }

    /// Put a taken component back. If the entity or the slot disappeared
    /// during the callback, the component is dropped, which is the correct
    /// outcome for a behavior that removed its own entity.
    pub(crate) fn restore_slot(
        &mut self,
        entity: Entity,
        slot_id: u64,
        component: Box<dyn Component>,
        started: bool,
    ) {
        if !self.contains(entity) {
            return;
        }
        let Some(record) = self.records.get_mut(&entity.index) else {
            return;
        };
        let Some(slot) = record.slots.iter_mut().find(|s| s.id == slot_id) else {
            return;
        };
        slot.component = Some(component);
        slot.started = started;
    }

    // ── Internals ────────────────────────────────────────────────────

    fn ensure_owned(&self, entity: Entity) -> Result<(), ModelError> {
        if self.contains(entity) {
            Ok(())
        } else {
            Err(ModelError::EntityNotOwned(entity))
        }
    }

    fn record(&self, entity: Entity) -> Option<&EntityRecord> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        self.records.get(&entity.index)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

fn record_has_type(record: &EntityRecord, type_id: TypeId) -> bool {
    record
        .slots
        .iter()
        .any(|s| s.component.as_ref().is_some_and(|c| c.as_any().type_id() == type_id))
}
