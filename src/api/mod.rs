//! Request and response payloads for the Workers AI `ai/run` endpoint.

use serde::{Deserialize, Serialize};

use crate::core::message::Message;

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RunMessage {
    pub role: String,
    pub content: String,
}

impl From<&Message> for RunMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct RunRequest {
    pub messages: Vec<RunMessage>,
}

impl RunRequest {
    pub fn from_conversation(conversation: &[Message]) -> Self {
        Self {
            messages: conversation.iter().map(RunMessage::from).collect(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct RunResult {
    #[serde(default)]
    pub response: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

/// Envelope returned by every Cloudflare v4 API call.
#[derive(Deserialize, Debug)]
pub struct RunResponse {
    #[serde(default)]
    pub result: Option<RunResult>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

impl RunResponse {
    /// Collapse the `errors` array into a single human readable line.
    pub fn error_summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .errors
            .iter()
            .filter(|e| !e.message.trim().is_empty())
            .map(|e| match e.code {
                Some(code) => format!("{} (code {code})", e.message.trim()),
                None => e.message.trim().to_string(),
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}
