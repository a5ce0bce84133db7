//! Asset discovery plus a scene save/load round trip, end to end:
//! scan a content directory, build a scene referencing a discovered sound,
//! save it to JSON, and load it back through the store.
//!
//! Run with `RUST_LOG=info cargo run --example scene_roundtrip`.

use std::fs;
use std::sync::Arc;

use fafnir::prelude::*;
use glam::Vec2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // A throwaway content root with one sound and its metadata sidecar.
    let content = tempfile::tempdir()?;
    let wav = content.path().join("hit.wav");
    fs::write(&wav, b"RIFF\x00\x00\x00\x00WAVE")?;
    fs::write(
        content.path().join("hit.wav.meta"),
        r#"{ "id": "8f6b9df3-3f0e-4aa1-9c26-5f5d3a1b0c77" }"#,
    )?;

    let audio = Arc::new(NullAudio::new());
    let mut assets = AssetStore::new()
        .with_loader::<Sound>(SoundLoader::new(audio.clone()))
        .with_loader::<Texture>(TextureLoader)
        .with_rule(SoundRule)
        .with_rule(TextureRule)
        .with_rule(InputMapRule);

    let report = assets.register_assets(content.path());
    log::info!(
        "discovered {} assets ({} failures)",
        report.registered,
        report.failures.len()
    );
    let hit: AssetId = "8f6b9df3-3f0e-4aa1-9c26-5f5d3a1b0c77".parse()?;

    let mut registry = ComponentRegistry::new();
    register_builtin_components(&mut registry);

    // Build a small scene: a player with a footstep source, a child camera.
    let mut scene = Scene::with_behavior("roundtrip-demo");
    let player = scene.add_entity();
    scene.add_component(player, Transform::from_translation(Vec2::new(8.0, 2.0)))?;
    scene.add_component(player, AudioSource::new(hit))?;
    let rig = scene.add_entity();
    scene.add_component(rig, Transform::default())?;
    scene.add_component(rig, Camera::default())?;
    scene.set_parent(rig, player)?;

    let path = content.path().join("demo.scene.json");
    save_scene_to_file(&scene, &registry, &path)?;
    log::info!("saved scene:\n{}", fs::read_to_string(&path)?);

    let restored = load_scene_from_file(&path, &registry, &assets)?;
    let entities: Vec<Entity> = restored.entities().collect();
    let source = restored.component::<AudioSource>(entities[0])?;

    // First access materializes the sound; play it through the backend.
    let sound = assets.get_asset::<Sound>(source.sound)?;
    audio.play(&sound)?;
    log::info!(
        "restored `{}` with {} entities; played sound {} ({} play total)",
        restored.behavior_name(),
        restored.entity_count(),
        assets.get_asset_id(&sound)?,
        audio.play_count()
    );

    Ok(())
}
