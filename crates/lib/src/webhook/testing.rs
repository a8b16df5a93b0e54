//! Recording fakes for the completion and reply clients.

use crate::channels::{OutboundMessage, ReplyClient, ReplyError};
use crate::llm::{CompletionClient, CompletionError};
use async_trait::async_trait;
use std::sync::Mutex;

pub(crate) struct FakeCompletion {
    answer: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    pub(crate) fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            answer: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
            .clone()
            .ok_or_else(|| CompletionError::Api("429 quota exceeded".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplyCall {
    Loading { user_id: String, seconds: u32 },
    Reply { token: String, messages: Vec<OutboundMessage> },
}

#[derive(Default)]
pub(crate) struct FakeReply {
    fail_loading: bool,
    fail_reply: bool,
    calls: Mutex<Vec<ReplyCall>>,
}

impl FakeReply {
    pub(crate) fn failing_loading() -> Self {
        Self {
            fail_loading: true,
            ..Default::default()
        }
    }

    pub(crate) fn failing_reply() -> Self {
        Self {
            fail_reply: true,
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<ReplyCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Reply tokens used, in call order.
    pub(crate) fn replies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ReplyCall::Reply { token, .. } => Some(token),
                ReplyCall::Loading { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ReplyClient for FakeReply {
    async fn reply(&self, reply_token: &str, messages: Vec<OutboundMessage>) -> Result<(), ReplyError> {
        self.calls.lock().unwrap().push(ReplyCall::Reply {
            token: reply_token.to_string(),
            messages,
        });
        if self.fail_reply {
            return Err(ReplyError::Api("400 Invalid reply token".to_string()));
        }
        Ok(())
    }

    async fn show_loading_indicator(&self, user_id: &str, seconds: u32) -> Result<(), ReplyError> {
        self.calls.lock().unwrap().push(ReplyCall::Loading {
            user_id: user_id.to_string(),
            seconds,
        });
        if self.fail_loading {
            return Err(ReplyError::Api("500 loading failed".to_string()));
        }
        Ok(())
    }
}
