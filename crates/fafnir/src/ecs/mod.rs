//! Entity-component model: scene-owned entities, capability-based components,
//! and the ComponentId registry used by serialization.

mod component;
mod entity;
mod registry;
mod scene;

pub use component::{Behavior, BehaviorContext, Component, ComponentId, ComponentKind};
pub use entity::Entity;
pub use registry::{ComponentAdapter, ComponentRegistry};
pub use scene::Scene;
