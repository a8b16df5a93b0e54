//! Event dispatcher: verify, parse, then hand text message events to the handler in order.

use crate::webhook::event::{Event, WebhookPayload};
use crate::webhook::handler::MessageHandler;
use crate::webhook::{signature, WebhookError};

/// Verifies and dispatches one webhook delivery at a time. Immutable after construction.
#[derive(Clone)]
pub struct Dispatcher {
    channel_secret: String,
    handler: MessageHandler,
}

impl Dispatcher {
    pub fn new(channel_secret: String, handler: MessageHandler) -> Self {
        Self {
            channel_secret,
            handler,
        }
    }

    /// Verify `signature` over the raw `body`, parse it, and handle each supported event
    /// sequentially in payload order. Events that do not fit the schema are skipped;
    /// a body that is not a webhook envelope is a parse error. The first handler
    /// failure stops the delivery.
    pub async fn dispatch(&self, body: &[u8], signature: &str) -> Result<(), WebhookError> {
        if !signature::verify(body, signature, &self.channel_secret) {
            return Err(WebhookError::Auth);
        }
        let payload: WebhookPayload = serde_json::from_slice(body)?;
        log::debug!(
            "webhook: {} event(s) for {}",
            payload.events.len(),
            payload.destination.as_deref().unwrap_or("-")
        );
        for (i, event) in payload.parse_events().enumerate() {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    log::warn!("webhook: event {} does not fit the schema, skipping: {}", i, e);
                    continue;
                }
            };
            match &event {
                Event::Message(ev) if ev.text().is_some() => {
                    log::debug!("webhook: event {} is a text message, handling", i);
                    self.handler.handle(ev).await?;
                }
                Event::Message(_) => {
                    log::debug!("webhook: event {} is a non-text message, skipping", i);
                }
                Event::Unknown => {
                    log::debug!("webhook: event {} has an unsupported type, skipping", i);
                }
            }
        }
        Ok(())
    }
}
