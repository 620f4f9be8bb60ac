mod loader;
mod locator;

pub use loader::AssetLoader;
pub use locator::AssetLocator;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::AssetLoadError;
use crate::models::{Asset, AssetKind, LoadTicket};

/// Result of a background load, addressed to the message that asked for it
#[derive(Debug)]
pub struct AssetCompletion {
    pub message_id: String,
    pub ticket: LoadTicket,
    pub result: Result<Asset, AssetLoadError>,
}

/// Run a load on a tokio task and report back over `tx`.
///
/// The caller is expected to have put the message into `Loading` already and
/// to pass the ticket it got from `begin_load`.
pub fn spawn_asset_load(
    loader: AssetLoader,
    message_id: String,
    ticket: LoadTicket,
    kind: AssetKind,
    locator: AssetLocator,
    tx: mpsc::UnboundedSender<AssetCompletion>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = loader.load(kind, &locator).await;
        let completion = AssetCompletion {
            message_id,
            ticket,
            result,
        };
        if tx.send(completion).is_err() {
            warn!(locator = %locator, "Completion receiver dropped, discarding asset");
        }
    })
}
