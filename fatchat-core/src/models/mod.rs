mod asset;
mod conversation;
pub mod input;
mod message;

pub use asset::{Asset, AssetKind, AssetState, FileAsset, PhotoAsset};
pub use conversation::Conversation;
pub use message::{ChatMessage, LoadStart, LoadTicket};
