//! Fatchat message core
//!
//! The chat message value object used by the client UI, together with the
//! loader that fills in its photo or file attachment.

pub mod assets;
pub mod config;
mod error;
pub mod logging;
pub mod models;

pub use assets::{spawn_asset_load, AssetCompletion, AssetLoader, AssetLocator};
pub use config::AssetConfig;
pub use error::AssetLoadError;
pub use models::{
    Asset, AssetKind, AssetState, ChatMessage, Conversation, FileAsset, LoadStart, LoadTicket,
    PhotoAsset,
};
