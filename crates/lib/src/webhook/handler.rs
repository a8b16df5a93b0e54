//! Message handler: text in, completion out, reply with the event's token.

use crate::channels::{OutboundMessage, ReplyClient, ReplyError};
use crate::llm::{CompletionClient, CompletionError};
use crate::webhook::event::MessageEvent;
use std::sync::Arc;

/// How long the loading animation is requested for.
pub const LOADING_INDICATOR_SECONDS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// Answers text message events using the injected completion and reply clients.
#[derive(Clone)]
pub struct MessageHandler {
    completion: Arc<dyn CompletionClient>,
    reply: Arc<dyn ReplyClient>,
}

impl MessageHandler {
    pub fn new(completion: Arc<dyn CompletionClient>, reply: Arc<dyn ReplyClient>) -> Self {
        Self { completion, reply }
    }

    /// Handle one text message event. Non-text events are a no-op.
    /// At most one reply is sent, always with `event.reply_token`.
    pub async fn handle(&self, event: &MessageEvent) -> Result<(), HandlerError> {
        let Some(user_text) = event.text() else {
            return Ok(());
        };

        if let Some(user_id) = event.source.user_id() {
            if let Err(e) = self
                .reply
                .show_loading_indicator(user_id, LOADING_INDICATOR_SECONDS)
                .await
            {
                log::warn!("handler: loading indicator failed: {}", e);
            }
        }

        let response_text = self.completion.generate(user_text).await?;
        self.reply
            .reply(&event.reply_token, vec![OutboundMessage::text(response_text)])
            .await?;
        log::debug!("handler: replied to event");
        Ok(())
    }
}
