use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use super::asset::{Asset, AssetKind, AssetState};
use crate::assets::{AssetLoader, AssetLocator};
use crate::error::AssetLoadError;

/// Identifies one attempt to load a message's asset.
///
/// A completion is only accepted with the ticket of the load that is
/// currently pending, so results from cancelled attempts are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

/// Outcome of [`ChatMessage::begin_load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStart {
    /// State moved to `Loading`; the caller owes a `complete_load` with this ticket
    Started(LoadTicket),
    /// Asset is already there, nothing to fetch
    AlreadyLoaded,
}

/// One message in a conversation.
///
/// Scalar fields are fixed at construction. `seen` and `replied` only change
/// through their mutators, and the attachment only through the load methods.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    id: String,
    text: String,
    sender_name: String,
    created_date: DateTime<Utc>,
    seen: bool,
    replied: bool,
    asset_kind: AssetKind,
    asset: AssetState,
    load_generation: u64,
}

/// Puts the message back to `Unloaded` if an inline load is dropped mid-flight
struct PendingLoad<'a> {
    message: &'a mut ChatMessage,
    ticket: LoadTicket,
}

impl Drop for PendingLoad<'_> {
    fn drop(&mut self) {
        self.message.abandon_load(self.ticket);
    }
}

impl ChatMessage {
    pub fn new(
        text: impl Into<String>,
        sender_name: impl Into<String>,
        asset_kind: AssetKind,
    ) -> Self {
        Self::with_created_date(text, sender_name, asset_kind, Utc::now())
    }

    pub fn with_created_date(
        text: impl Into<String>,
        sender_name: impl Into<String>,
        asset_kind: AssetKind,
        created_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender_name: sender_name.into(),
            created_date,
            seen: false,
            replied: false,
            asset_kind,
            asset: AssetState::Unloaded,
            load_generation: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    pub fn asset_kind(&self) -> AssetKind {
        self.asset_kind
    }

    pub fn expects_asset(&self) -> bool {
        self.asset_kind.expects_asset()
    }

    pub fn is_seen(&self) -> bool {
        self.seen
    }

    pub fn is_replied(&self) -> bool {
        self.replied
    }

    pub fn mark_seen(&mut self) {
        self.seen = true;
    }

    pub fn set_seen(&mut self, seen: bool) {
        self.seen = seen;
    }

    pub fn mark_replied(&mut self) {
        self.replied = true;
    }

    pub fn set_replied(&mut self, replied: bool) {
        self.replied = replied;
    }

    /// The attachment, once loaded
    pub fn asset(&self) -> Option<&Asset> {
        match &self.asset {
            AssetState::Loaded(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn asset_state(&self) -> &AssetState {
        &self.asset
    }

    /// Error from the most recent failed load, if the message is in `Failed`
    pub fn load_error(&self) -> Option<&AssetLoadError> {
        match &self.asset {
            AssetState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Fetch the attachment at `locator` and store it on the message.
    ///
    /// Rejects messages without an attachment and loads that are already
    /// pending. Once loaded, further calls return `Ok(())` without fetching.
    /// A failed load may be retried. Locators the loader refuses are reported
    /// without touching the asset state. If the returned future is dropped
    /// before it finishes, the message goes back to `Unloaded`.
    pub async fn load_asset(
        &mut self,
        locator: &AssetLocator,
        loader: &AssetLoader,
    ) -> Result<(), AssetLoadError> {
        if !self.expects_asset() {
            return Err(AssetLoadError::NoAttachmentExpected);
        }
        loader.check_locator(locator)?;

        let ticket = match self.begin_load()? {
            LoadStart::Started(ticket) => ticket,
            LoadStart::AlreadyLoaded => return Ok(()),
        };

        let mut pending = PendingLoad {
            message: self,
            ticket,
        };
        let result = loader.load(pending.message.asset_kind, locator).await;
        pending.message.complete_load(ticket, result)
    }

    /// Same as [`load_asset`](Self::load_asset), parsing the locator first.
    /// A malformed locator is reported without touching the asset state.
    pub async fn load_asset_from(
        &mut self,
        locator: &str,
        loader: &AssetLoader,
    ) -> Result<(), AssetLoadError> {
        if !self.expects_asset() {
            return Err(AssetLoadError::NoAttachmentExpected);
        }
        let locator = AssetLocator::parse(locator)?;
        self.load_asset(&locator, loader).await
    }

    /// Move into `Loading`. Pair with [`complete_load`](Self::complete_load)
    /// when the fetch runs elsewhere.
    pub fn begin_load(&mut self) -> Result<LoadStart, AssetLoadError> {
        if !self.expects_asset() {
            return Err(AssetLoadError::NoAttachmentExpected);
        }

        match self.asset {
            AssetState::Loaded(_) => Ok(LoadStart::AlreadyLoaded),
            AssetState::Loading => Err(AssetLoadError::LoadInProgress),
            AssetState::Unloaded | AssetState::Failed(_) => {
                self.load_generation += 1;
                debug!(
                    message_id = %self.id,
                    kind = %self.asset_kind,
                    generation = self.load_generation,
                    "Asset load started"
                );
                self.asset = AssetState::Loading;
                Ok(LoadStart::Started(LoadTicket(self.load_generation)))
            }
        }
    }

    fn is_pending(&self, ticket: LoadTicket) -> bool {
        self.asset.is_loading() && ticket.0 == self.load_generation
    }

    /// Apply the result of the load that `ticket` was issued for.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Asset, AssetLoadError>,
    ) -> Result<(), AssetLoadError> {
        if !self.is_pending(ticket) {
            warn!(message_id = %self.id, "Asset completion does not match a pending load");
            return Err(AssetLoadError::UnexpectedCompletion);
        }

        let outcome = result.and_then(|asset| {
            if asset.kind() == self.asset_kind {
                Ok(asset)
            } else {
                Err(AssetLoadError::KindMismatch {
                    expected: self.asset_kind,
                    found: asset.kind(),
                })
            }
        });

        match outcome {
            Ok(asset) => {
                debug!(message_id = %self.id, source = %asset.source(), "Asset loaded");
                self.asset = AssetState::Loaded(asset);
                Ok(())
            }
            Err(err) => {
                warn!(message_id = %self.id, error = %err, "Asset load failed");
                self.asset = AssetState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Drop a pending load, e.g. after aborting the task that was running it
    /// or losing the channel its result would arrive on. Returns whether a
    /// load was pending.
    pub fn cancel_load(&mut self) -> bool {
        if self.asset.is_loading() {
            self.asset = AssetState::Unloaded;
            true
        } else {
            false
        }
    }

    fn abandon_load(&mut self, ticket: LoadTicket) {
        if self.is_pending(ticket) {
            debug!(message_id = %self.id, "Asset load dropped before completion");
            self.asset = AssetState::Unloaded;
        }
    }
}
