//! LINE webhook payload types.
//!
//! Only the fields the relay reads are modelled. Unknown event and message types
//! deserialize into an explicit catch-all variant. Events are parsed one at a time
//! so a single event that does not fit the schema cannot sink the whole delivery.

use serde::Deserialize;

/// Webhook request body: `{"destination": "...", "events": [...]}`.
/// Events stay raw until [`WebhookPayload::parse_events`].
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    /// Bot user id that received the events.
    #[serde(default)]
    pub destination: Option<String>,
    pub events: Vec<serde_json::Value>,
}

impl WebhookPayload {
    /// Each raw event parsed on its own, in payload order.
    pub fn parse_events(&self) -> impl Iterator<Item = Result<Event, serde_json::Error>> + '_ {
        self.events.iter().map(Event::deserialize)
    }
}

/// One webhook event, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    Message(MessageEvent),
    /// follow, unfollow, join, postback, etc. Skipped.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub source: Source,
    pub reply_token: String,
    pub message: MessageContent,
}

/// Where the event came from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Source {
    #[serde(rename_all = "camelCase")]
    User { user_id: String },
    #[serde(rename_all = "camelCase")]
    Group {
        group_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Room {
        room_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
}

impl Source {
    /// The user id when the source is a one-to-one chat with a user.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Source::User { user_id } => Some(user_id),
            Source::Group { .. } | Source::Room { .. } => None,
        }
    }
}

/// Message body, tagged by `type`. Only text is acted on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text(TextMessageContent),
    /// image, video, audio, file, location, sticker.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextMessageContent {
    pub id: String,
    pub text: String,
}

impl MessageEvent {
    /// Text of the message when it is a text message.
    pub fn text(&self) -> Option<&str> {
        match &self.message {
            MessageContent::Text(t) => Some(&t.text),
            MessageContent::Other => None,
        }
    }
}
