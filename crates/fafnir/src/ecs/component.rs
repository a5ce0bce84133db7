//! # Component — Capability-Based Component Model
//!
//! A component is a unit of data or behavior attached to an entity. Instead of
//! a deep inheritance tree, components expose a small capability set through
//! one object-safe trait:
//!
//! - every component has a stable [`ComponentId`] (used by serialization and
//!   the [`ComponentRegistry`](super::registry::ComponentRegistry));
//! - a component may declare itself singleton-per-entity;
//! - a component may opt into per-tick dispatch by returning its [`Behavior`]
//!   view from [`Component::as_behavior_mut`];
//! - a component may reference assets by [`AssetId`], which serialization
//!   resolves through the asset store on load.
//!
//! Storage is `Box<dyn Component>` with `downcast_ref`/`downcast_mut` for
//! typed access. No unsafe code; type correctness is checked at runtime.
//!
//! Plain-data components use [`impl_data_component!`]; behavior components
//! implement [`Component`] by hand so they can wire up `as_behavior_mut`.

use std::any::Any;
use std::fmt;

use crate::asset::{AssetId, AssetStore};
use crate::ecs::{Entity, Scene};

/// Stable identifier for a component type, unique across all registered types.
///
/// This is the name that appears in scene definition files, so renaming one
/// breaks existing scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub &'static str);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The object-safe component trait. One instance belongs to at most one
/// entity at a time; the owning [`Scene`] enforces this by construction.
pub trait Component: Any + Send + Sync {
    /// The stable identifier of this component's type.
    fn component_id(&self) -> ComponentId;

    /// Whether at most one instance of this type may exist per entity.
    /// [`Scene::add_component`] rejects a second instance when `true`.
    fn singleton(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The behavior view of this component, if it participates in per-tick
    /// dispatch. Data components return `None` (the default).
    fn as_behavior_mut(&mut self) -> Option<&mut dyn Behavior> {
        None
    }

    /// Asset ids embedded in this component's data. Scene loading verifies
    /// each is registered in the asset store before the scene is exposed.
    fn asset_refs(&self) -> Vec<AssetId> {
        Vec::new()
    }
}

/// Compile-time metadata for a concrete component type. Required for
/// registration in the [`ComponentRegistry`](super::registry::ComponentRegistry);
/// [`impl_data_component!`] generates it together with [`Component`].
pub trait ComponentKind: Component + Sized {
    /// The stable identifier. Must match what `component_id` returns.
    const ID: ComponentId;
    /// Singleton-per-entity declaration. Must match what `singleton` returns.
    const SINGLETON: bool = false;
}

/// Everything a behavior callback may touch: the owning scene (the component
/// itself is temporarily detached, so the borrow is safe), the entity the
/// component is attached to, and the asset store.
pub struct BehaviorContext<'a> {
    pub scene: &'a mut Scene,
    pub entity: Entity,
    pub assets: &'a AssetStore,
}

/// Per-tick hooks for behavior components.
///
/// `on_start` runs exactly once, on the first scheduled pass after the
/// component is attached, before any `on_update`/`on_fixed_update` of the
/// same instance. The started flag lives in the scene's component slot, not
/// in the component, so user types don't have to track it.
///
/// While a hook runs, the component is detached from its slot. A callback
/// that removes its own component type therefore cannot reach the running
/// instance: [`Scene::remove_components`] reports only what it actually
/// detached, and the instance stays attached until its entity is removed.
pub trait Behavior {
    fn on_start(&mut self, _ctx: &mut BehaviorContext<'_>) {}

    /// Variable-rate hook. `dt` is the actual elapsed frame time in seconds.
    fn on_update(&mut self, _ctx: &mut BehaviorContext<'_>, _dt: f32) {}

    /// Fixed-rate hook. The elapsed time is always the scheduler's fixed
    /// delta, by contract, so none is passed.
    fn on_fixed_update(&mut self, _ctx: &mut BehaviorContext<'_>) {}
}

/// Implement [`Component`] and [`ComponentKind`] for a plain-data type.
///
/// # Example
///
/// ```ignore
/// struct Lifetime { remaining: f32 }
/// impl_data_component!(Lifetime, "lifetime");
/// impl_data_component!(Health, "health", singleton = true);
/// ```
#[macro_export]
macro_rules! impl_data_component {
    ($ty:ty, $id:expr) => {
        $crate::impl_data_component!($ty, $id, singleton = false);
    };
    ($ty:ty, $id:expr, singleton = $singleton:expr) => {
        impl $crate::ecs::Component for $ty {
            fn component_id(&self) -> $crate::ecs::ComponentId {
                <$ty as $crate::ecs::ComponentKind>::ID
            }

            fn singleton(&self) -> bool {
                <$ty as $crate::ecs::ComponentKind>::SINGLETON
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }

        impl $crate::ecs::ComponentKind for $ty {
            const ID: $crate::ecs::ComponentId = $crate::ecs::ComponentId($id);
            const SINGLETON: bool = $singleton;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Health(u32);
    impl_data_component!(Health, "health", singleton = true);

    #[derive(Default)]
    struct Buff(&'static str);
    impl_data_component!(Buff, "buff");

    #[test]
    fn macro_wires_id_and_singleton() {
        let h = Health(10);
        assert_eq!(h.component_id(), ComponentId("health"));
        assert!(h.singleton());
        assert_eq!(Health::ID, ComponentId("health"));
        assert!(Health::SINGLETON);

        let b = Buff("haste");
        assert!(!b.singleton());
        assert!(!Buff::SINGLETON);
    }

    #[test]
    fn data_components_have_no_behavior_view() {
        let mut h = Health(1);
        assert!(h.as_behavior_mut().is_none());
        assert!(h.asset_refs().is_empty());
    }

    #[test]
    fn downcast_through_any() {
        let boxed: Box<dyn Component> = Box::new(Health(7));
        let h = boxed.as_any().downcast_ref::<Health>().unwrap();
        assert_eq!(h.0, 7);
        assert!(boxed.as_any().downcast_ref::<Buff>().is_none());
    }
}
