//! Built-in asset kinds and their loaders: textures (decoded to RGBA8),
//! sounds (decoded through the audio backend), and input maps.

use std::any::Any;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::asset::AssetId;
use crate::asset::store::{AssetInfo, AssetLoader};
use crate::backend::{AudioBackend, SoundFormat};
use crate::error::AssetError;

// ── Textures ─────────────────────────────────────────────────────────────

/// A decoded image, RGBA8, row-major. Rendering backends upload this; the
/// core only owns the pixels.
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decodes PNG and JPEG files via the `image` crate.
pub struct TextureLoader;

impl AssetLoader for TextureLoader {
    fn load(&self, info: &AssetInfo) -> Result<Arc<dyn Any + Send + Sync>, AssetError> {
        let decoded = image::open(&info.path).map_err(|err| AssetError::AssetLoadFailed {
            path: info.path.clone(),
            message: err.to_string(),
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Arc::new(Texture {
            width,
            height,
            rgba: rgba.into_raw(),
        }))
    }
}

// ── Sounds ───────────────────────────────────────────────────────────────

/// Reads the file bytes and hands them to the audio backend for decoding.
/// The cached instance is the backend's [`Sound`](crate::backend::Sound).
pub struct SoundLoader {
    backend: Arc<dyn AudioBackend>,
}

impl SoundLoader {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self { backend }
    }
}

impl AssetLoader for SoundLoader {
    fn load(&self, info: &AssetInfo) -> Result<Arc<dyn Any + Send + Sync>, AssetError> {
        let ext = info
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let format = SoundFormat::from_extension(ext).ok_or_else(|| AssetError::AssetLoadFailed {
            path: info.path.clone(),
            message: format!("unsupported sound extension `{ext}`"),
        })?;
        let data = fs::read(&info.path).map_err(|err| AssetError::AssetLoadFailed {
            path: info.path.clone(),
            message: err.to_string(),
        })?;
        let sound = self
            .backend
            .create_sound(&data, format)
            .map_err(|err| AssetError::AssetLoadFailed {
                path: info.path.clone(),
                message: err.to_string(),
            })?;
        Ok(Arc::new(sound))
    }
}

// ── Input maps ───────────────────────────────────────────────────────────

/// Action-name to key-name bindings, loaded from an `.inputmap` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputMap {
    bindings: HashMap<String, Vec<String>>,
}

impl InputMap {
    /// Keys bound to an action. Empty for an unknown action.
    pub fn keys_for(&self, action: &str) -> &[String] {
        self.bindings.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_bound(&self, action: &str) -> bool {
        !self.keys_for(action).is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

/// On-disk form of an `.inputmap` file. Unlike sounds and textures, the id is
/// embedded in the document itself rather than a sidecar.
#[derive(Debug, Deserialize)]
pub(crate) struct InputMapDoc {
    pub id: AssetId,
    #[serde(default)]
    pub bindings: HashMap<String, Vec<String>>,
}

pub struct InputMapLoader;

impl AssetLoader for InputMapLoader {
    fn load(&self, info: &AssetInfo) -> Result<Arc<dyn Any + Send + Sync>, AssetError> {
        let text = fs::read_to_string(&info.path).map_err(|err| AssetError::AssetLoadFailed {
            path: info.path.clone(),
            message: err.to_string(),
        })?;
        let doc: InputMapDoc =
            serde_json::from_str(&text).map_err(|err| AssetError::AssetLoadFailed {
                path: info.path.clone(),
                message: err.to_string(),
            })?;
        Ok(Arc::new(InputMap {
            bindings: doc.bindings,
        }))
    }
}
