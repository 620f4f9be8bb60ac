use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::message::{ChatMessage, LoadStart};
use crate::assets::{spawn_asset_load, AssetCompletion, AssetLoader, AssetLocator};
use crate::error::AssetLoadError;

/// Ordered list of messages owned by a single thread (the UI).
///
/// Attachments are fetched on tokio tasks and handed back as
/// [`AssetCompletion`]s, so the messages themselves are never shared.
#[derive(Debug, Default)]
pub struct Conversation {
    title: String,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            messages: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append a message and return its id
    pub fn push(&mut self, message: ChatMessage) -> String {
        let id = message.id().to_string();
        self.messages.push(message);
        id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().find(|m| m.id() == id)
    }

    pub fn latest(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn unread_count(&self) -> usize {
        self.messages.iter().filter(|m| !m.is_seen()).count()
    }

    /// Mark every message as seen. Returns how many changed.
    pub fn mark_all_seen(&mut self) -> usize {
        let mut changed = 0;
        for message in self.messages.iter_mut().filter(|m| !m.is_seen()) {
            message.mark_seen();
            changed += 1;
        }
        changed
    }

    /// Start loading a message's attachment in the background.
    ///
    /// Returns `Ok(None)` when the asset is already loaded. The result comes
    /// back through `tx` and must be passed to [`apply_completion`](Self::apply_completion).
    /// If the receiving end of `tx` is already gone, or the loader refuses the
    /// locator, nothing is spawned and the message is left untouched. If the
    /// receiver is dropped after the task was spawned, the owner must call
    /// [`ChatMessage::cancel_load`] on the message before loading it again.
    pub fn request_asset(
        &mut self,
        id: &str,
        locator: AssetLocator,
        loader: &AssetLoader,
        tx: mpsc::UnboundedSender<AssetCompletion>,
    ) -> Result<Option<JoinHandle<()>>, AssetLoadError> {
        let message = self
            .get_mut(id)
            .ok_or_else(|| AssetLoadError::MessageNotFound(id.to_string()))?;

        if tx.is_closed() {
            return Err(AssetLoadError::CompletionChannelClosed);
        }
        loader.check_locator(&locator)?;

        let ticket = match message.begin_load()? {
            LoadStart::Started(ticket) => ticket,
            LoadStart::AlreadyLoaded => return Ok(None),
        };

        info!(message_id = %id, locator = %locator, "Requesting asset");
        Ok(Some(spawn_asset_load(
            loader.clone(),
            id.to_string(),
            ticket,
            message.asset_kind(),
            locator,
            tx,
        )))
    }

    /// Route a background load result to its message
    pub fn apply_completion(&mut self, completion: AssetCompletion) -> Result<(), AssetLoadError> {
        let AssetCompletion {
            message_id,
            ticket,
            result,
        } = completion;
        let message = self
            .get_mut(&message_id)
            .ok_or(AssetLoadError::MessageNotFound(message_id))?;
        message.complete_load(ticket, result)
    }
}
