//! # Fafnir — 2D Game Engine Runtime Core
//!
//! The simulation heart of a 2D engine: the world model, the clock, and the
//! content pipeline. Rendering, audio devices, and input hardware live in the
//! host application behind the narrow [`backend`] contracts; this crate owns
//! what happens between frames.
//!
//! ## Architecture
//!
//! - [`ecs`] — scene-owned entities with generational handles, a
//!   capability-based [`Component`](ecs::Component) trait, and the explicit
//!   [`ComponentRegistry`](ecs::ComponentRegistry) serialization uses.
//! - [`schedule`] — the dual-rate [`Scheduler`](schedule::Scheduler): a
//!   fixed-step schedule on a time accumulator plus a once-per-frame
//!   variable-step schedule, and the [`BehaviorSystem`](schedule::BehaviorSystem)
//!   that dispatches per-component hooks.
//! - [`asset`] — stable [`AssetId`](asset::AssetId)s, sidecar-driven content
//!   discovery, and the lazily-materializing [`AssetStore`](asset::AssetStore).
//! - [`scene_def`] — flat JSON scene files; save is forgiving, load is
//!   all-or-nothing.
//! - [`components`] — the shipped data components (`Transform`, `Camera`,
//!   `Collider`, `AudioSource`).
//!
//! ## A minimal frame loop
//!
//! ```no_run
//! use std::time::Duration;
//! use fafnir::prelude::*;
//!
//! let mut scene = Scene::new();
//! let assets = AssetStore::new();
//! let mut scheduler = Scheduler::new(Duration::from_millis(10))
//!     .with_fixed(BehaviorSystem)
//!     .with_variable(BehaviorSystem);
//! let mut time = Time::new();
//!
//! loop {
//!     time.update();
//!     scheduler.advance(&mut scene, &assets, time.delta());
//!     # break;
//! }
//! ```

pub mod asset;
pub mod backend;
pub mod components;
pub mod ecs;
pub mod error;
pub mod prelude;
pub mod scene_def;
pub mod schedule;
pub mod time;
