//! # Asset Store — Registration, Discovery, Lazy Materialization
//!
//! The store is a registry of asset *identities* (id, type, path) plus a cache
//! of *instances* materialized on first access. Registration is cheap metadata
//! work; no file is read until the first [`AssetStore::get_asset`] for its id.
//!
//! Loaders and discovery rules are wired in explicitly at construction with
//! [`with_loader`](AssetStore::with_loader) / [`with_rule`](AssetStore::with_rule);
//! there is no process-wide registry.
//!
//! The instance cache is a state map behind a `Mutex`. Access today is
//! single-threaded; the mutex documents the mutual-exclusion requirement for
//! future threaded loaders rather than buying concurrency now. Each entry is
//! `Materializing`, `Materialized`, or `Failed`:
//!
//! - `Materializing` marks an id whose loader is currently running, so a
//!   loader that (transitively) requests its own id gets a
//!   [`MaterializationCycle`](AssetError::MaterializationCycle) error instead
//!   of deadlocking or recursing;
//! - `Failed` pins the first load error; retrying an asset that failed to
//!   load is not useful mid-run, so subsequent gets return the pinned error.
//!
//! There is no mid-run eviction. The cache lives until the store is dropped
//! with the level that owns it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::asset::AssetId;
use crate::error::AssetError;

/// Registered identity of one asset: what it is, where its bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub id: AssetId,
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub path: PathBuf,
}

impl AssetInfo {
    pub fn new<T: Any>(id: AssetId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            path: path.into(),
        }
    }
}

/// Materializes one asset type from its source file.
pub trait AssetLoader: Send + Sync {
    /// Produce the runtime instance for `info`. The returned value must be of
    /// the type the loader was registered for.
    fn load(&self, info: &AssetInfo) -> Result<Arc<dyn Any + Send + Sync>, AssetError>;
}

/// One file-matching rule used by [`AssetStore::register_assets`]. Each rule
/// owns its id scheme (metadata sidecar, embedded header, ...).
pub trait DiscoveryRule: Send + Sync {
    /// `Ok(None)` if the rule does not apply to this file; `Err` if it applies
    /// but its metadata is missing or malformed.
    fn try_discover(&self, path: &Path) -> Result<Option<AssetInfo>, AssetError>;
}

/// Outcome of one [`AssetStore::register_assets`] scan. A failing file never
/// fails the scan; it lands here instead.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Newly registered assets (idempotent re-registrations not counted).
    pub registered: usize,
    /// Files a rule claimed but could not produce a registration for.
    pub failures: Vec<(PathBuf, AssetError)>,
}

enum AssetSlot {
    /// Loader currently running for this id.
    Materializing,
    Materialized(Arc<dyn Any + Send + Sync>),
    /// First load failed; the message is pinned for subsequent gets.
    Failed(String),
}

/// Asset registry plus lazily-populated instance cache.
pub struct AssetStore {
    infos: HashMap<AssetId, AssetInfo>,
    loaders: HashMap<TypeId, Box<dyn AssetLoader>>,
    rules: Vec<Box<dyn DiscoveryRule>>,
    cache: Mutex<HashMap<AssetId, AssetSlot>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self {
            infos: HashMap::new(),
            loaders: HashMap::new(),
            rules: Vec::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Wire in the loader for asset type `T`.
    pub fn with_loader<T: Any>(mut self, loader: impl AssetLoader + 'static) -> Self {
        self.loaders.insert(TypeId::of::<T>(), Box::new(loader));
        self
    }

    /// Wire in a discovery rule. Rules are consulted in registration order;
    /// the first rule that claims a file wins.
    pub fn with_rule(mut self, rule: impl DiscoveryRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Register one asset identity. Idempotent for an identical registration;
    /// fails with [`AssetError::DuplicateAssetId`] if the id is already bound
    /// to a different path or type.
    pub fn register_asset(&mut self, info: AssetInfo) -> Result<(), AssetError> {
        match self.infos.get(&info.id) {
            Some(existing) if *existing == info => Ok(()),
            Some(_) => Err(AssetError::DuplicateAssetId(info.id)),
            None => {
                log::debug!(
                    "registered asset {} ({}) -> '{}'",
                    info.id,
                    info.type_name,
                    info.path.display()
                );
                self.infos.insert(info.id, info);
                Ok(())
            }
        }
    }

    /// Recursively walk `root` and register every file a discovery rule
    /// claims. A file whose rule fails (missing sidecar, malformed metadata)
    /// is logged and reported; the scan continues.
    pub fn register_assets(&mut self, root: &Path) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        let mut discovered = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    log::warn!("cannot read asset directory '{}': {err}", dir.display());
                    report.failures.push((
                        dir.clone(),
                        AssetError::AssetLoadFailed {
                            path: dir,
                            message: err.to_string(),
                        },
                    ));
                    continue;
                }
            };

            // Sort for a deterministic scan; read_dir order is OS-dependent.
            let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
            paths.sort();

            for path in paths {
                if path.is_dir() {
                    pending.push(path);
                    continue;
                }
                for rule in &self.rules {
                    match rule.try_discover(&path) {
                        Ok(Some(info)) => {
                            discovered.push(info);
                            break;
                        }
                        Ok(None) => continue,
                        Err(err) => {
                            log::warn!("skipping asset '{}': {err}", path.display());
                            report.failures.push((path.clone(), err));
                            break;
                        }
                    }
                }
            }
        }

        for info in discovered {
            let path = info.path.clone();
            // An identical registration also succeeds; only count it the
            // first time so a rescan reports what it actually changed.
            let known = self.infos.get(&info.id).is_some_and(|existing| *existing == info);
            match self.register_asset(info) {
                Ok(()) if !known => report.registered += 1,
                Ok(()) => {}
                Err(err) => {
                    log::warn!("cannot register asset '{}': {err}", path.display());
                    report.failures.push((path, err));
                }
            }
        }

        log::info!(
            "asset scan of '{}': {} registered, {} failures",
            root.display(),
            report.registered,
            report.failures.len()
        );
        report
    }

    /// Whether an id is registered (materialized or not).
    pub fn is_registered(&self, id: AssetId) -> bool {
        self.infos.contains_key(&id)
    }

    /// The registered identity for an id, if any.
    pub fn info(&self, id: AssetId) -> Option<&AssetInfo> {
        self.infos.get(&id)
    }

    /// Number of registered assets.
    pub fn asset_count(&self) -> usize {
        self.infos.len()
    }

    // ── Access ───────────────────────────────────────────────────────

    /// Get the instance for an asset, materializing it through its loader on
    /// first access. Repeated calls return clones of the same `Arc`.
    pub fn get_asset<T: Any + Send + Sync>(&self, id: AssetId) -> Result<Arc<T>, AssetError> {
        let info = self.infos.get(&id).ok_or(AssetError::AssetNotRegistered(id))?;
        if info.type_id != TypeId::of::<T>() {
            return Err(AssetError::AssetTypeMismatch {
                id,
                registered: info.type_name,
                requested: std::any::type_name::<T>(),
            });
        }

        {
            let mut cache = self.cache.lock().expect("asset cache poisoned");
            match cache.get(&id) {
                Some(AssetSlot::Materialized(instance)) => {
                    return downcast_instance(instance.clone(), info);
                }
                Some(AssetSlot::Materializing) => {
                    return Err(AssetError::MaterializationCycle(id));
                }
                Some(AssetSlot::Failed(message)) => {
                    return Err(AssetError::AssetLoadFailed {
                        path: info.path.clone(),
                        message: message.clone(),
                    });
                }
                None => {
                    cache.insert(id, AssetSlot::Materializing);
                }
            }
        }

        // Lock released while the loader runs so the cycle guard above, not
        // the mutex, handles reentrant gets.
        let result = match self.loaders.get(&info.type_id) {
            Some(loader) => loader.load(info),
            None => Err(AssetError::AssetLoadFailed {
                path: info.path.clone(),
                message: format!("no loader registered for `{}`", info.type_name),
            }),
        };

        let mut cache = self.cache.lock().expect("asset cache poisoned");
        match result {
            Ok(instance) => {
                log::debug!("materialized asset {} from '{}'", id, info.path.display());
                cache.insert(id, AssetSlot::Materialized(instance.clone()));
                drop(cache);
                downcast_instance(instance, info)
            }
            Err(err) => {
                log::warn!("failed to materialize asset {id}: {err}");
                cache.insert(id, AssetSlot::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Reverse lookup: the id of an instance previously produced by
    /// [`get_asset`](Self::get_asset), matched by `Arc` pointer identity.
    pub fn get_asset_id<T: Any + Send + Sync>(&self, instance: &Arc<T>) -> Result<AssetId, AssetError> {
        let needle = Arc::as_ptr(instance) as *const ();
        let cache = self.cache.lock().expect("asset cache poisoned");
        for (id, slot) in cache.iter() {
            if let AssetSlot::Materialized(held) = slot
                && Arc::as_ptr(held) as *const () == needle
            {
                return Ok(*id);
            }
        }
        Err(AssetError::AssetInstanceNotManaged)
    }
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast_instance<T: Any + Send + Sync>(
    instance: Arc<dyn Any + Send + Sync>,
    info: &AssetInfo,
) -> Result<Arc<T>, AssetError> {
    instance.downcast::<T>().map_err(|_| AssetError::AssetLoadFailed {
        path: info.path.clone(),
        message: format!(
            "loader for `{}` produced a value of a different type",
            info.type_name
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Blob(#[allow(dead_code)] Vec<u8>);

    /// Loader that counts invocations and returns a fixed payload.
    struct BlobLoader {
        calls: Arc<AtomicU32>,
        fail: bool,
    }

    impl AssetLoader for BlobLoader {
        fn load(&self, info: &AssetInfo) -> Result<Arc<dyn Any + Send + Sync>, AssetError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AssetError::AssetLoadFailed {
                    path: info.path.clone(),
                    message: "corrupt payload".into(),
                });
            }
            Ok(Arc::new(Blob(vec![1, 2, 3])))
        }
    }

    fn store_with_blob_loader(fail: bool) -> (AssetStore, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let store = AssetStore::new().with_loader::<Blob>(BlobLoader {
            calls: calls.clone(),
            fail,
        });
        (store, calls)
    }

    #[test]
    fn materializes_once_and_returns_identical_arcs() {
        let (mut store, calls) = store_with_blob_loader(false);
        let id = AssetId::new();
        store.register_asset(AssetInfo::new::<Blob>(id, "data/a.blob")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let first = store.get_asset::<Blob>(id).unwrap();
        let second = store.get_asset::<Blob>(id).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregistered_id_is_an_error() {
        let store = AssetStore::new();
        assert!(matches!(
            store.get_asset::<Blob>(AssetId::new()),
            Err(AssetError::AssetNotRegistered(_))
        ));
    }

    #[test]
    fn type_mismatch_names_both_types() {
        struct Sound;
        struct Texture;

        let mut store = AssetStore::new();
        let id = AssetId::new();
        store.register_asset(AssetInfo::new::<Sound>(id, "sounds/x.wav")).unwrap();

        // Registered as a sound, requested as a texture.
        match store.get_asset::<Texture>(id) {
            Err(AssetError::AssetTypeMismatch { registered, requested, .. }) => {
                assert!(registered.contains("Sound"));
                assert!(requested.contains("Texture"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected type mismatch"),
        }
    }

    #[test]
    fn wav_registered_as_sound_rejects_texture_requests() {
        use crate::asset::kinds::{SoundLoader, Texture, TextureLoader};
        use crate::backend::{NullAudio, Sound, SoundFormat};

        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("x.wav");
        fs::write(&wav, b"RIFF\x00\x00\x00\x00WAVE").unwrap();

        let mut store = AssetStore::new()
            .with_loader::<Sound>(SoundLoader::new(Arc::new(NullAudio::new())))
            .with_loader::<Texture>(TextureLoader);
        let id = AssetId::new();
        store.register_asset(AssetInfo::new::<Sound>(id, &wav)).unwrap();

        let sound = store.get_asset::<Sound>(id).unwrap();
        assert_eq!(sound.format, SoundFormat::Wav);

        // Same id requested as a texture: refused before any loader runs.
        assert!(matches!(
            store.get_asset::<Texture>(id),
            Err(AssetError::AssetTypeMismatch { .. })
        ));
        // The sound instance is unaffected.
        assert!(Arc::ptr_eq(&sound, &store.get_asset::<Sound>(id).unwrap()));
    }

    #[test]
    fn duplicate_id_rejected_identical_registration_idempotent() {
        let mut store = AssetStore::new();
        let id = AssetId::new();
        let info = AssetInfo::new::<Blob>(id, "data/a.blob");

        store.register_asset(info.clone()).unwrap();
        store.register_asset(info).unwrap();
        assert_eq!(store.asset_count(), 1);

        assert!(matches!(
            store.register_asset(AssetInfo::new::<Blob>(id, "data/other.blob")),
            Err(AssetError::DuplicateAssetId(_))
        ));
    }

    #[test]
    fn failed_load_is_pinned_and_not_retried() {
        let (mut store, calls) = store_with_blob_loader(true);
        let id = AssetId::new();
        store.register_asset(AssetInfo::new::<Blob>(id, "data/bad.blob")).unwrap();

        assert!(store.get_asset::<Blob>(id).is_err());
        assert!(matches!(
            store.get_asset::<Blob>(id),
            Err(AssetError::AssetLoadFailed { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_loader_is_a_load_failure() {
        let mut store = AssetStore::new();
        let id = AssetId::new();
        store.register_asset(AssetInfo::new::<Blob>(id, "data/a.blob")).unwrap();
        assert!(matches!(
            store.get_asset::<Blob>(id),
            Err(AssetError::AssetLoadFailed { .. })
        ));
    }

    #[test]
    fn reverse_lookup_by_instance_identity() {
        let (mut store, _calls) = store_with_blob_loader(false);
        let id = AssetId::new();
        store.register_asset(AssetInfo::new::<Blob>(id, "data/a.blob")).unwrap();

        let instance = store.get_asset::<Blob>(id).unwrap();
        assert_eq!(store.get_asset_id(&instance).unwrap(), id);

        let stranger = Arc::new(Blob(vec![]));
        assert!(matches!(
            store.get_asset_id(&stranger),
            Err(AssetError::AssetInstanceNotManaged)
        ));
    }
}
