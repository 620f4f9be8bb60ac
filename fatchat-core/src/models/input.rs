//! Validated input for building messages from UI or ingestion data.

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::Deserialize;

use super::asset::AssetKind;
use super::message::ChatMessage;

const MAX_SENDER_NAME_LENGTH: usize = 100;
const MAX_MESSAGE_LENGTH: usize = 10000;

/// Sender names are shown verbatim, so reject control characters
fn validate_sender_name(value: &str, _ctx: &()) -> garde::Result {
    if value.chars().any(|c| c.is_control()) {
        return Err(garde::Error::new("Sender name contains invalid characters"));
    }
    Ok(())
}

/// Input for creating a message
#[derive(Debug, Deserialize, Validate)]
#[garde(context(()))]
pub struct NewChatMessage {
    #[garde(length(max = MAX_MESSAGE_LENGTH))]
    #[serde(default)]
    pub text: String,
    #[garde(length(min = 1, max = MAX_SENDER_NAME_LENGTH), custom(validate_sender_name))]
    pub sender_name: String,
    #[garde(skip)]
    #[serde(default)]
    pub asset_kind: AssetKind,
    #[garde(skip)]
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
}

/// Helper trait to convert garde validation errors to String
pub trait ValidateExt {
    fn validate_input(&self) -> Result<(), String>;
}

impl<T: Validate<Context = ()>> ValidateExt for T {
    fn validate_input(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())
    }
}

impl TryFrom<NewChatMessage> for ChatMessage {
    type Error = String;

    fn try_from(input: NewChatMessage) -> Result<Self, Self::Error> {
        input.validate_input()?;
        let created_date = input.created_date.unwrap_or_else(Utc::now);
        Ok(ChatMessage::with_created_date(
            input.text,
            input.sender_name,
            input.asset_kind,
            created_date,
        ))
    }
}
