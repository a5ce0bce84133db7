//! Asset pipeline: stable ids, content discovery, and the
//! lazily-materializing [`AssetStore`].

mod discover;
mod id;
mod kinds;
mod store;

pub use discover::{InputMapRule, SoundRule, TextureRule};
pub use id::AssetId;
pub use kinds::{InputMap, InputMapLoader, SoundLoader, Texture, TextureLoader};
pub use store::{AssetInfo, AssetLoader, AssetStore, DiscoveryReport, DiscoveryRule};
