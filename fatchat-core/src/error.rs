//! Errors surfaced by asset loading.
//!
//! A failed load never leaves a partially populated asset behind: the message
//! keeps its `AssetKind` and `asset()` stays `None`.

use std::time::Duration;

use thiserror::Error;

use crate::models::AssetKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetLoadError {
    /// The locator was empty, malformed, or used an unsupported scheme.
    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    /// Network or filesystem access failed, or the server answered with an error status.
    #[error("asset unreachable: {0}")]
    AssetUnreachable(String),

    /// The content was fetched but is not usable as the declared kind.
    #[error("asset could not be decoded: {0}")]
    AssetDecodeError(String),

    #[error("asset is {size} bytes, limit is {limit}")]
    AssetTooLarge { size: u64, limit: u64 },

    #[error("asset load timed out after {0:?}")]
    Timeout(Duration),

    /// Loading was requested on a message that carries no attachment.
    #[error("message has no attachment to load")]
    NoAttachmentExpected,

    #[error("an asset load is already in progress")]
    LoadInProgress,

    /// A completion arrived for a load that is no longer pending.
    #[error("asset completion does not match the pending load")]
    UnexpectedCompletion,

    /// Nobody is listening for background load results.
    #[error("asset completion receiver has been dropped")]
    CompletionChannelClosed,

    #[error("loaded {found} asset for a {expected} message")]
    KindMismatch { expected: AssetKind, found: AssetKind },

    #[error("no message with id {0}")]
    MessageNotFound(String),
}

impl AssetLoadError {
    /// Whether calling `load_asset` again could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AssetLoadError::AssetUnreachable(_) | AssetLoadError::Timeout(_)
        )
    }
}
