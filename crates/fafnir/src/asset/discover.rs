//! Shipped discovery rules. Each rule owns its id scheme:
//!
//! - sounds and textures carry a JSON sidecar next to the file
//!   (`hit.wav` + `hit.wav.meta` with an `id` field);
//! - input maps embed the id in the document itself.
//!
//! A rule failure (missing or malformed metadata) fails that file only; the
//! surrounding scan reports it and moves on.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::asset::AssetId;
use crate::asset::kinds::{InputMap, InputMapDoc, Texture};
use crate::asset::store::{AssetInfo, DiscoveryRule};
use crate::backend::Sound;
use crate::error::AssetError;

/// JSON sidecar next to an asset file, e.g. `hit.wav.meta`.
#[derive(Deserialize)]
struct Sidecar {
    id: AssetId,
}

fn sidecar_path(path: &Path) -> PathBuf {
    let mut full = path.as_os_str().to_os_string();
    full.push(".meta");
    PathBuf::from(full)
}

fn sidecar_id(path: &Path) -> Result<AssetId, AssetError> {
    let meta = sidecar_path(path);
    let text = fs::read_to_string(&meta).map_err(|err| AssetError::AssetLoadFailed {
        path: meta.clone(),
        message: format!("missing metadata sidecar: {err}"),
    })?;
    let sidecar: Sidecar = serde_json::from_str(&text).map_err(|err| AssetError::AssetLoadFailed {
        path: meta,
        message: format!("malformed metadata sidecar: {err}"),
    })?;
    Ok(sidecar.id)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase)
}

/// Claims `.wav` and `.ogg` files; id from the sidecar.
pub struct SoundRule;

impl DiscoveryRule for SoundRule {
    fn try_discover(&self, path: &Path) -> Result<Option<AssetInfo>, AssetError> {
        match extension_of(path).as_deref() {
            Some("wav" | "ogg") => {
                let id = sidecar_id(path)?;
                Ok(Some(AssetInfo::new::<Sound>(id, path)))
            }
            _ => Ok(None),
        }
    }
}

/// Claims `.png`, `.jpg`, and `.jpeg` files; id from the sidecar.
pub struct TextureRule;

impl DiscoveryRule for TextureRule {
    fn try_discover(&self, path: &Path) -> Result<Option<AssetInfo>, AssetError> {
        match extension_of(path).as_deref() {
            Some("png" | "jpg" | "jpeg") => {
                let id = sidecar_id(path)?;
                Ok(Some(AssetInfo::new::<Texture>(id, path)))
            }
            _ => Ok(None),
        }
    }
}

/// Claims `.inputmap` files; id read from the document header.
pub struct InputMapRule;

impl DiscoveryRule for InputMapRule {
    fn try_discover(&self, path: &Path) -> Result<Option<AssetInfo>, AssetError> {
        if extension_of(path).as_deref() != Some("inputmap") {
            return Ok(None);
        }
        let text = fs::read_to_string(path).map_err(|err| AssetError::AssetLoadFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let doc: InputMapDoc =
            serde_json::from_str(&text).map_err(|err| AssetError::AssetLoadFailed {
                path: path.to_path_buf(),
                message: format!("malformed input map: {err}"),
            })?;
        Ok(Some(AssetInfo::new::<InputMap>(doc.id, path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetStore;
    use std::any::TypeId;

    const ID_A: &str = "11111111-1111-4111-8111-111111111111";
    const ID_B: &str = "22222222-2222-4222-8222-222222222222";
    const ID_C: &str = "33333333-3333-4333-8333-333333333333";

    fn write_sidecar(path: &Path, id: &str) {
        fs::write(sidecar_path(path), format!(r#"{{ "id": "{id}" }}"#)).unwrap();
    }

    #[test]
    fn sound_rule_needs_a_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("hit.wav");
        fs::write(&wav, b"RIFF").unwrap();

        // Without a sidecar the rule claims the file but fails it.
        assert!(SoundRule.try_discover(&wav).is_err());

        write_sidecar(&wav, ID_A);
        let info = SoundRule.try_discover(&wav).unwrap().unwrap();
        assert_eq!(info.id, ID_A.parse().unwrap());
        assert_eq!(info.type_id, TypeId::of::<Sound>());

        // Unrelated extensions pass through.
        assert!(SoundRule.try_discover(Path::new("hit.png")).unwrap().is_none());
    }

    #[test]
    fn input_map_rule_reads_embedded_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.inputmap");
        fs::write(&path, format!(r#"{{ "id": "{ID_B}", "bindings": {{}} }}"#)).unwrap();

        let info = InputMapRule.try_discover(&path).unwrap().unwrap();
        assert_eq!(info.id, ID_B.parse().unwrap());
        assert_eq!(info.type_id, TypeId::of::<InputMap>());
    }

    #[test]
    fn scan_isolates_per_file_failures() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sfx");
        fs::create_dir(&nested).unwrap();

        let good_wav = nested.join("hit.wav");
        fs::write(&good_wav, b"RIFF").unwrap();
        write_sidecar(&good_wav, ID_A);

        let good_png = dir.path().join("tile.png");
        fs::write(&good_png, b"png").unwrap();
        write_sidecar(&good_png, ID_C);

        // Claimed by SoundRule but missing its sidecar.
        fs::write(dir.path().join("broken.ogg"), b"OggS").unwrap();

        // Claimed by no rule at all; silently ignored.
        fs::write(dir.path().join("notes.txt"), b"todo").unwrap();

        let mut store = AssetStore::new()
            .with_rule(SoundRule)
            .with_rule(TextureRule)
            .with_rule(InputMapRule);
        let report = store.register_assets(dir.path());

        assert_eq!(report.registered, 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].0.ends_with("broken.ogg"));
        assert!(store.is_registered(ID_A.parse().unwrap()));
        assert!(store.is_registered(ID_C.parse().unwrap()));
    }

    #[test]
    fn rescan_of_the_same_root_registers_nothing_new() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("hit.wav");
        fs::write(&wav, b"RIFF").unwrap();
        write_sidecar(&wav, ID_A);

        let mut store = AssetStore::new().with_rule(SoundRule);
        let first = store.register_assets(dir.path());
        assert_eq!(first.registered, 1);

        // Unchanged content: the rescan succeeds but changes nothing.
        let second = store.register_assets(dir.path());
        assert_eq!(second.registered, 0);
        assert!(second.failures.is_empty());
        assert_eq!(store.asset_count(), 1);
    }
}
