//! Error taxonomy: model errors are programming errors surfaced immediately;
//! asset errors go to the `get_asset`/`register_asset` caller; serialization
//! errors are fatal to the scene-load operation as a whole.

use std::path::PathBuf;

use thiserror::Error;

use crate::asset::AssetId;
use crate::ecs::{ComponentId, Entity};

/// Errors from the scene/entity/component model. These indicate misuse of the
/// API, not recoverable runtime conditions.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("entity {0} is not owned by this scene")]
    EntityNotOwned(Entity),

    #[error("entity {entity} has no component of type `{type_name}`")]
    ComponentNotFound {
        entity: Entity,
        type_name: &'static str,
    },

    #[error("entity {entity} has multiple components of type `{type_name}`; use `components::<T>()`")]
    AmbiguousComponent {
        entity: Entity,
        type_name: &'static str,
    },

    #[error("component `{component}` is singleton-per-entity and entity {entity} already has one")]
    SingletonViolation {
        entity: Entity,
        component: ComponentId,
    },
}

/// Errors from asset registration, discovery, and materialization.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset {0} is not registered")]
    AssetNotRegistered(AssetId),

    #[error("asset {id} is registered as `{registered}` but was requested as `{requested}`")]
    AssetTypeMismatch {
        id: AssetId,
        registered: &'static str,
        requested: &'static str,
    },

    #[error("asset {0} is already registered with a different path or type")]
    DuplicateAssetId(AssetId),

    #[error("failed to load asset from '{path}': {message}")]
    AssetLoadFailed { path: PathBuf, message: String },

    #[error("asset {0} is already materializing (cyclic load)")]
    MaterializationCycle(AssetId),

    #[error("instance was not produced by this asset store")]
    AssetInstanceNotManaged,
}

/// Errors from scene serialization. A scene either loads completely or not at
/// all; any of these aborts the load with no partial state exposed.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("unknown component type `{0}`")]
    UnknownComponentType(String),

    #[error("malformed payload for component `{id}`: {source}")]
    MalformedComponent {
        id: String,
        source: serde_json::Error,
    },

    #[error("component `{component}` references unregistered asset {id}")]
    UnresolvedAsset { component: String, id: AssetId },

    #[error("entity {index} lists child index {child}, which is out of range")]
    InvalidChildIndex { index: usize, child: usize },

    #[error("entity {child} is listed as a child of both entity {first} and entity {second}")]
    DuplicateChildLink {
        child: usize,
        first: usize,
        second: usize,
    },

    #[error("child index {child} of entity {index} closes a hierarchy cycle")]
    HierarchyCycle { index: usize, child: usize },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
