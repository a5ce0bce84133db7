//! Built-in data components. All are serde-serializable and covered by
//! [`register_builtin_components`].

use std::any::Any;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::asset::AssetId;
use crate::ecs::{Component, ComponentId, ComponentKind, ComponentRegistry};
use crate::impl_data_component;

/// 2D position, rotation (radians), and scale. Singleton per entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform {
    pub fn from_translation(translation: Vec2) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl_data_component!(Transform, "transform", singleton = true);

/// Marks the entity whose transform frames the view. Singleton per entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

impl_data_component!(Camera, "camera", singleton = true);

/// Axis-aligned collision box, offset from the entity's transform. An entity
/// may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Collider {
    pub half_extents: Vec2,
    pub offset: Vec2,
}

impl_data_component!(Collider, "collider");

/// A playable sound reference. Multi-instance, so one entity can carry a
/// footstep source and a voice source side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSource {
    pub sound: AssetId,
    pub volume: f32,
    pub looping: bool,
}

impl AudioSource {
    pub fn new(sound: AssetId) -> Self {
        Self {
            sound,
            ..Self::default()
        }
    }
}

impl Default for AudioSource {
    fn default() -> Self {
        Self {
            sound: AssetId::nil(),
            volume: 1.0,
            looping: false,
        }
    }
}

// Implemented by hand rather than via the macro so asset_refs can report the
// sound reference for load-time resolution.
impl Component for AudioSource {
    fn component_id(&self) -> ComponentId {
        Self::ID
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn asset_refs(&self) -> Vec<AssetId> {
        if self.sound.is_nil() {
            Vec::new()
        } else {
            vec![self.sound]
        }
    }
}

impl ComponentKind for AudioSource {
    const ID: ComponentId = ComponentId("audio_source");
}

/// Register the shipped component set. Call once while building the registry
/// at startup.
pub fn register_builtin_components(registry: &mut ComponentRegistry) {
    registry.register::<Transform>();
    registry.register::<Camera>();
    registry.register::<Collider>();
    registry.register::<AudioSource>();
}
