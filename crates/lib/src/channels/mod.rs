//! Messaging channel: reply delivery back to the platform (LINE).
//!
//! The [`ReplyClient`] trait is the seam the message handler talks to; [`LineClient`]
//! is the production implementation.

mod line;

use async_trait::async_trait;
use serde::Serialize;

pub use line::LineClient;

/// Outbound message, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    Text { text: String },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        OutboundMessage::Text { text: text.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("line request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line api error: {0}")]
    Api(String),
}

/// Delivers replies and the loading indicator to the messaging platform.
#[async_trait]
pub trait ReplyClient: Send + Sync {
    /// Reply to an event with its single-use reply token.
    async fn reply(&self, reply_token: &str, messages: Vec<OutboundMessage>) -> Result<(), ReplyError>;

    /// Show the loading animation in a one-to-one chat for `seconds`.
    async fn show_loading_indicator(&self, user_id: &str, seconds: u32) -> Result<(), ReplyError>;
}
