//! Convenience re-exports for application code.

pub use crate::asset::{
    AssetId, AssetInfo, AssetStore, InputMap, InputMapLoader, InputMapRule, SoundLoader,
    SoundRule, Texture, TextureLoader, TextureRule,
};
pub use crate::backend::{
    AudioBackend, InputBackend, InputProvider, NullAudio, NullInput, Sound, SoundFormat,
};
pub use crate::components::{
    register_builtin_components, AudioSource, Camera, Collider, Transform,
};
pub use crate::ecs::{
    Behavior, BehaviorContext, Component, ComponentId, ComponentKind, ComponentRegistry, Entity,
    Scene,
};
pub use crate::error::{AssetError, ModelError, SceneError};
pub use crate::impl_data_component;
pub use crate::scene_def::{
    load_scene, load_scene_from_file, save_scene, save_scene_to_file, SceneDef,
};
pub use crate::schedule::{BehaviorSystem, FixedSystem, Scheduler, VariableSystem};
pub use crate::time::Time;
