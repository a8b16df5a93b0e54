//! LINE Messaging API client: reply and loading animation.

use crate::channels::{OutboundMessage, ReplyClient, ReplyError};
use async_trait::async_trait;
use serde::Serialize;

const LINE_API_BASE: &str = "https://api.line.me";

/// Client for the LINE Messaging API, authorized with a channel access token.
#[derive(Clone)]
pub struct LineClient {
    base_url: String,
    channel_access_token: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyMessageRequest<'a> {
    reply_token: &'a str,
    messages: &'a [OutboundMessage],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowLoadingAnimationRequest<'a> {
    chat_id: &'a str,
    loading_seconds: u32,
}

impl LineClient {
    pub fn new(channel_access_token: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| LINE_API_BASE.to_string());
        Self {
            base_url,
            channel_access_token,
            client: reqwest::Client::new(),
        }
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), ReplyError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.channel_access_token)
            .json(body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ReplyError::Api(format!("{} {} {}", path, status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReplyClient for LineClient {
    /// POST /v2/bot/message/reply
    async fn reply(&self, reply_token: &str, messages: Vec<OutboundMessage>) -> Result<(), ReplyError> {
        let body = ReplyMessageRequest {
            reply_token,
            messages: &messages,
        };
        self.post_json("/v2/bot/message/reply", &body).await
    }

    /// POST /v2/bot/chat/loading/start. Only valid for one-to-one chats with a user.
    async fn show_loading_indicator(&self, user_id: &str, seconds: u32) -> Result<(), ReplyError> {
        let body = ShowLoadingAnimationRequest {
            chat_id: user_id,
            loading_seconds: seconds,
        };
        self.post_json("/v2/bot/chat/loading/start", &body).await
    }
}
