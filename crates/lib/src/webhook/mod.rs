//! LINE webhook core: signature verification, payload types, dispatch, and the message handler.

mod dispatcher;
pub mod event;
mod handler;
pub mod signature;
#[cfg(test)]
pub(crate) mod testing;

use axum::http::StatusCode;

pub use dispatcher::Dispatcher;
pub use event::{Event, MessageContent, MessageEvent, Source, TextMessageContent, WebhookPayload};
pub use handler::{HandlerError, MessageHandler, LOADING_INDICATOR_SECONDS};
pub use signature::{sign, verify, SIGNATURE_HEADER};

/// Why a webhook delivery was not fully handled.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Signature missing, malformed, or not matching the body.
    #[error("invalid signature")]
    Auth,
    #[error("malformed webhook payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("downstream failure: {0}")]
    Downstream(#[from] HandlerError),
}

impl WebhookError {
    /// HTTP status the front door answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Auth | WebhookError::Parse(_) => StatusCode::BAD_REQUEST,
            WebhookError::Downstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
