//! # Scene Serialization — Flat, Versionless JSON
//!
//! A scene file is a flat entity array. Component order within an entity is
//! preserved (components are an array, not a map), children are indices into
//! the entity array, and asset references appear only as id strings. The
//! format is deliberately human-diffable; level files live in version control.
//!
//! Loading is all-or-nothing: an unknown component type, a malformed payload,
//! an asset reference the store does not know, or a child list that is not a
//! forest (index out of range, one entity under two parents, or a cycle)
//! aborts the load, and no partially-built scene escapes. Saving is forgiving instead; a component
//! type without a registry adapter is skipped with a debug log, matching the
//! expectation that runtime-only components (scratch state, behavior wiring)
//! simply don't persist.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::asset::AssetStore;
use crate::ecs::{ComponentRegistry, Entity, Scene};
use crate::error::SceneError;

/// One persisted component: its registry id and its serde payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDef {
    pub id: String,
    pub data: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityDef {
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    /// Indices into [`SceneDef::entities`].
    #[serde(default)]
    pub children: Vec<usize>,
}

/// The on-disk scene document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDef {
    /// Scene-behavior name run on load by the surrounding application.
    #[serde(default)]
    pub behavior: String,
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

/// Serialize a scene. Entities appear in iteration order; components without
/// a registered adapter are skipped.
pub fn save_scene(scene: &Scene, registry: &ComponentRegistry) -> Result<SceneDef, SceneError> {
    let order: Vec<Entity> = scene.entities().collect();
    let index_of: HashMap<Entity, usize> =
        order.iter().enumerate().map(|(i, &e)| (e, i)).collect();

    let mut entities = Vec::with_capacity(order.len());
    for &entity in &order {
        let mut components = Vec::new();
        for component in scene.raw_components(entity) {
            match registry.adapter_for_type(component.as_any().type_id()) {
                Some(adapter) => components.push(ComponentDef {
                    id: adapter.id().0.to_string(),
                    data: adapter.to_value(component)?,
                }),
                None => log::debug!(
                    "not persisting unregistered component `{}` on {entity}",
                    component.component_id()
                ),
            }
        }

        let children = scene
            .children_of(entity)
            .iter()
            .filter_map(|child| index_of.get(child).copied())
            .collect();

        entities.push(EntityDef { components, children });
    }

    Ok(SceneDef {
        behavior: scene.behavior_name().to_string(),
        entities,
    })
}

/// Build a fresh scene from a definition. All-or-nothing: any error aborts
/// the load and nothing is returned.
pub fn load_scene(
    def: &SceneDef,
    registry: &ComponentRegistry,
    assets: &AssetStore,
) -> Result<Scene, SceneError> {
    let mut scene = Scene::with_behavior(def.behavior.clone());

    let mut handles = Vec::with_capacity(def.entities.len());
    for entity_def in &def.entities {
        let entity = scene.add_entity();
        for component_def in &entity_def.components {
            let adapter = registry
                .adapter(&component_def.id)
                .ok_or_else(|| SceneError::UnknownComponentType(component_def.id.clone()))?;
            let component =
                adapter
                    .from_value(&component_def.data)
                    .map_err(|source| SceneError::MalformedComponent {
                        id: component_def.id.clone(),
                        source,
                    })?;
            for asset in component.asset_refs() {
                if !assets.is_registered(asset) {
                    return Err(SceneError::UnresolvedAsset {
                        component: component_def.id.clone(),
                        id: asset,
                    });
                }
            }
            scene.add_boxed_component(entity, component)?;
        }
        handles.push(entity);
    }

    // Hierarchy links resolve in a second pass, once every index has a
    // handle. A hand-authored file can list anything, so the links are
    // validated as a forest: each entity under at most one parent, no link
    // closing a cycle back onto its own ancestry.
    let mut parent_of: Vec<Option<usize>> = vec![None; handles.len()];
    for (index, entity_def) in def.entities.iter().enumerate() {
        for &child in &entity_def.children {
            if child >= handles.len() {
                return Err(SceneError::InvalidChildIndex { index, child });
            }
            if let Some(first) = parent_of[child] {
                return Err(SceneError::DuplicateChildLink {
                    child,
                    first,
                    second: index,
                });
            }
            let mut ancestor = Some(index);
            while let Some(current) = ancestor {
                if current == child {
                    return Err(SceneError::HierarchyCycle { index, child });
                }
                ancestor = parent_of[current];
            }
            parent_of[child] = Some(index);
            scene.set_parent(handles[child], handles[index])?;
        }
    }

    log::info!(
        "loaded scene `{}`: {} entities",
        scene.behavior_name(),
        scene.entity_count()
    );
    Ok(scene)
}

/// Save a scene as pretty-printed JSON.
pub fn save_scene_to_file(
    scene: &Scene,
    registry: &ComponentRegistry,
    path: impl AsRef<Path>,
) -> Result<(), SceneError> {
    let def = save_scene(scene, registry)?;
    let json = serde_json::to_string_pretty(&def)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_scene_from_file(
    path: impl AsRef<Path>,
    registry: &ComponentRegistry,
    assets: &AssetStore,
) -> Result<Scene, SceneError> {
    let text = fs::read_to_string(path)?;
    let def: SceneDef = serde_json::from_str(&text)?;
    load_scene(&def, registry, assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetId, AssetInfo};
    use crate::backend::Sound;
    use crate::components::{register_builtin_components, AudioSource, Collider, Transform};
    use crate::impl_data_component;
    use glam::Vec2;

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        register_builtin_components(&mut registry);
        registry
    }

    fn store_with_sound(id: AssetId) -> AssetStore {
        let mut store = AssetStore::new();
        store
            .register_asset(AssetInfo::new::<Sound>(id, "sounds/hit.wav"))
            .unwrap();
        store
    }

    #[test]
    fn round_trip_preserves_entities_components_and_refs() {
        let sound = AssetId::new();
        let assets = store_with_sound(sound);
        let registry = registry();

        let mut scene = Scene::with_behavior("arena");
        let player = scene.add_entity();
        scene
            .add_component(player, Transform::from_translation(Vec2::new(3.0, 4.0)))
            .unwrap();
        scene
            .add_component(player, Collider { half_extents: Vec2::splat(0.5), offset: Vec2::ZERO })
            .unwrap();
        scene.add_component(player, AudioSource::new(sound)).unwrap();
        let weapon = scene.add_entity();
        scene
            .add_component(weapon, Transform::default())
            .unwrap();
        scene.set_parent(weapon, player).unwrap();

        let def = save_scene(&scene, &registry).unwrap();
        let restored = load_scene(&def, &registry, &assets).unwrap();

        assert_eq!(restored.behavior_name(), "arena");
        assert_eq!(restored.entity_count(), 2);

        let entities: Vec<Entity> = restored.entities().collect();
        let transform = restored.component::<Transform>(entities[0]).unwrap();
        assert_eq!(transform.translation, Vec2::new(3.0, 4.0));
        let source = restored.component::<AudioSource>(entities[0]).unwrap();
        assert_eq!(source.sound, sound);
        assert_eq!(restored.children_of(entities[0]), vec![entities[1]]);
    }

    #[test]
    fn wire_format_is_flat_json() {
        let registry = registry();
        let mut scene = Scene::with_behavior("menu");
        let e = scene.add_entity();
        scene.add_component(e, Transform::default()).unwrap();

        let def = save_scene(&scene, &registry).unwrap();
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["behavior"], "menu");
        assert_eq!(json["entities"][0]["components"][0]["id"], "transform");
    }

    #[test]
    fn unknown_component_type_aborts_load() {
        let def: SceneDef = serde_json::from_value(serde_json::json!({
            "behavior": "",
            "entities": [
                { "components": [ { "id": "jetpack", "data": {} } ], "children": [] }
            ]
        }))
        .unwrap();

        let result = load_scene(&def, &registry(), &AssetStore::new());
        assert!(matches!(result, Err(SceneError::UnknownComponentType(id)) if id == "jetpack"));
    }

    #[test]
    fn malformed_payload_aborts_load() {
        let def: SceneDef = serde_json::from_value(serde_json::json!({
            "entities": [
                { "components": [ { "id": "transform", "data": { "translation": "northwest" } } ] }
            ]
        }))
        .unwrap();

        let result = load_scene(&def, &registry(), &AssetStore::new());
        assert!(matches!(result, Err(SceneError::MalformedComponent { .. })));
    }

    #[test]
    fn unresolved_asset_reference_aborts_load() {
        let dangling = AssetId::new();
        let mut scene = Scene::new();
        let e = scene.add_entity();
        scene.add_component(e, AudioSource::new(dangling)).unwrap();

        let registry = registry();
        let def = save_scene(&scene, &registry).unwrap();

        // Store knows nothing about the referenced sound.
        let result = load_scene(&def, &registry, &AssetStore::new());
        assert!(matches!(
            result,
            Err(SceneError::UnresolvedAsset { id, .. }) if id == dangling
        ));
    }

    #[test]
    fn invalid_child_index_aborts_load() {
        let def: SceneDef = serde_json::from_value(serde_json::json!({
            "entities": [ { "components": [], "children": [7] } ]
        }))
        .unwrap();

        let result = load_scene(&def, &registry(), &AssetStore::new());
        assert!(matches!(
            result,
            Err(SceneError::InvalidChildIndex { index: 0, child: 7 })
        ));
    }

    #[test]
    fn child_claimed_by_two_parents_aborts_load() {
        let def: SceneDef = serde_json::from_value(serde_json::json!({
            "entities": [
                { "components": [], "children": [2] },
                { "components": [], "children": [2] },
                { "components": [], "children": [] }
            ]
        }))
        .unwrap();

        let result = load_scene(&def, &registry(), &AssetStore::new());
        assert!(matches!(
            result,
            Err(SceneError::DuplicateChildLink { child: 2, first: 0, second: 1 })
        ));
    }

    #[test]
    fn hierarchy_cycle_aborts_load() {
        // Two entities each naming the other as a child.
        let def: SceneDef = serde_json::from_value(serde_json::json!({
            "entities": [
                { "components": [], "children": [1] },
                { "components": [], "children": [0] }
            ]
        }))
        .unwrap();

        let result = load_scene(&def, &registry(), &AssetStore::new());
        assert!(matches!(
            result,
            Err(SceneError::HierarchyCycle { index: 1, child: 0 })
        ));

        // The degenerate form: an entity naming itself.
        let def: SceneDef = serde_json::from_value(serde_json::json!({
            "entities": [ { "components": [], "children": [0] } ]
        }))
        .unwrap();

        let result = load_scene(&def, &registry(), &AssetStore::new());
        assert!(matches!(
            result,
            Err(SceneError::HierarchyCycle { index: 0, child: 0 })
        ));
    }

    #[test]
    fn unregistered_components_are_skipped_on_save() {
        #[derive(Default)]
        struct Scratch;
        impl_data_component!(Scratch, "scratch");

        let mut scene = Scene::new();
        let e = scene.add_entity();
        scene.add_component(e, Transform::default()).unwrap();
        scene.add_component(e, Scratch).unwrap();

        // Registry knows the builtins but not Scratch.
        let def = save_scene(&scene, &registry()).unwrap();
        assert_eq!(def.entities[0].components.len(), 1);
        assert_eq!(def.entities[0].components[0].id, "transform");
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.scene.json");
        let registry = registry();

        let mut scene = Scene::with_behavior("level-1");
        let e = scene.add_entity();
        scene.add_component(e, Transform::default()).unwrap();

        save_scene_to_file(&scene, &registry, &path).unwrap();
        let restored = load_scene_from_file(&path, &registry, &AssetStore::new()).unwrap();
        assert_eq!(restored.behavior_name(), "level-1");
        assert_eq!(restored.entity_count(), 1);
    }
}
