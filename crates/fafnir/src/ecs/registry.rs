//! # Component Registry — ComponentId to Factory/Adapter Table
//!
//! Serialization and dynamic creation need to go from a [`ComponentId`] found
//! in a scene file to a concrete component type. The registry is an explicit
//! table built at startup by `register::<T>()` calls; there is no reflection
//! or process-wide discovery.
//!
//! Each registered type gets a [`ComponentAdapter`]: a factory plus a
//! serialize/deserialize function-pointer pair over `serde_json::Value`.

use std::any::TypeId;
use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ecs::component::{Component, ComponentId, ComponentKind};

type CreateFn = fn() -> Box<dyn Component>;
type ToValueFn = fn(&dyn Component) -> Result<serde_json::Value, serde_json::Error>;
type FromValueFn = fn(&serde_json::Value) -> Result<Box<dyn Component>, serde_json::Error>;

/// Factory and serde adapters for one registered component type.
pub struct ComponentAdapter {
    id: ComponentId,
    create: CreateFn,
    to_value: ToValueFn,
    from_value: FromValueFn,
}

impl ComponentAdapter {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Create a default-initialized instance of the component type.
    pub fn create(&self) -> Box<dyn Component> {
        (self.create)()
    }

    /// Serialize a component into its persisted payload.
    ///
    /// # Panics
    ///
    /// Panics if `component` is not an instance of the adapter's type; callers
    /// look adapters up by the component's own `TypeId`, so a mismatch is a
    /// programming error.
    pub fn to_value(&self, component: &dyn Component) -> Result<serde_json::Value, serde_json::Error> {
        (self.to_value)(component)
    }

    /// Deserialize a persisted payload back into a component.
    pub fn from_value(&self, value: &serde_json::Value) -> Result<Box<dyn Component>, serde_json::Error> {
        (self.from_value)(value)
    }
}

/// The explicit (ComponentId -> adapter) table. Built once at startup.
pub struct ComponentRegistry {
    by_id: HashMap<&'static str, ComponentAdapter>,
    by_type: HashMap<TypeId, &'static str>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_type: HashMap::new(),
        }
    }

    /// Register a component type.
    ///
    /// # Panics
    ///
    /// Panics if the [`ComponentId`] is already registered. Ids must be unique
    /// across all component types; a collision is a startup programming error.
    pub fn register<T>(&mut self)
    where
        T: ComponentKind + Default + Serialize + DeserializeOwned,
    {
        let id = T::ID;
        if self.by_id.contains_key(id.0) {
            panic!("component id `{id}` is already registered");
        }

        let adapter = ComponentAdapter {
            id,
            create: || Box::new(T::default()),
            to_value: |component| {
                let concrete = component
                    .as_any()
                    .downcast_ref::<T>()
                    .expect("adapter invoked with a component of the wrong type");
                serde_json::to_value(concrete)
            },
            from_value: |value| {
                let concrete: T = serde_json::from_value(value.clone())?;
                Ok(Box::new(concrete))
            },
        };

        self.by_id.insert(id.0, adapter);
        self.by_type.insert(TypeId::of::<T>(), id.0);
    }

    /// Look up the adapter for a ComponentId as found in a scene file.
    pub fn adapter(&self, id: &str) -> Option<&ComponentAdapter> {
        self.by_id.get(id)
    }

    /// Look up the adapter for a live component by its concrete type.
    pub fn adapter_for_type(&self, type_id: TypeId) -> Option<&ComponentAdapter> {
        let id = self.by_type.get(&type_id)?;
        self.by_id.get(id)
    }

    /// All registered ids, sorted for stable presentation.
    pub fn ids(&self) -> Vec<ComponentId> {
        let mut ids: Vec<ComponentId> = self.by_id.values().map(|a| a.id).collect();
        ids.sort_by_key(|id| id.0);
        ids
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
