//! Boundary to the remote text-generation endpoint.
//!
//! [`InferenceGateway`] is a single request/response call: the whole
//! conversation goes out, one assistant message comes back. The session
//! controller never calls it directly; the event loop runs it on a spawned
//! task and feeds the outcome back as an event.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::api::{RunRequest, RunResponse, DEFAULT_BASE_URL};
use crate::core::message::Message;
use crate::utils::url::run_model_url;

pub const API_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";
pub const ACCOUNT_ID_ENV: &str = "CLOUDFLARE_ACC_ID";
pub const BASE_URL_ENV: &str = "CLOUDFLARE_API_BASE_URL";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Why an inference call produced no assistant message.
#[derive(Debug)]
pub enum InferenceError {
    /// The request never completed (DNS, TLS, connection reset, timeout).
    Network(reqwest::Error),
    /// The endpoint rejected the credentials.
    Auth { status: StatusCode, message: String },
    /// Any other non-success answer from the endpoint.
    Api { status: StatusCode, message: String },
    /// The body could not be decoded or did not contain a response.
    MalformedResponse(String),
    /// The task running the call ended without producing an outcome.
    Interrupted(String),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::Network(source) => {
                if source.is_timeout() {
                    write!(f, "Request timed out: {source}")
                } else {
                    write!(f, "Network error: {source}")
                }
            }
            InferenceError::Auth { status, message } => {
                write!(f, "Authentication failed ({status}): {message}")
            }
            InferenceError::Api { status, message } => {
                write!(f, "API error ({status}): {message}")
            }
            InferenceError::MalformedResponse(detail) => {
                write!(f, "Malformed response: {detail}")
            }
            InferenceError::Interrupted(detail) => {
                write!(f, "Inference call interrupted: {detail}")
            }
        }
    }
}

impl StdError for InferenceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            InferenceError::Network(source) => Some(source),
            _ => None,
        }
    }
}

#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Run `model` over the full `conversation` and return the reply. The
    /// returned message always carries the assistant role.
    async fn invoke(&self, model: &str, conversation: &[Message])
        -> Result<Message, InferenceError>;
}

#[derive(Debug)]
pub struct MissingCredential {
    pub variable: &'static str,
}

impl fmt::Display for MissingCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} environment variable not set\n\n\
Please export your Cloudflare credentials:\n\
export {}=\"your-api-token\"\n\
export {}=\"your-account-id\"",
            self.variable, API_TOKEN_ENV, ACCOUNT_ID_ENV
        )
    }
}

impl StdError for MissingCredential {}

#[derive(Clone)]
pub struct WorkersAiCredentials {
    pub api_token: String,
    pub account_id: String,
}

impl fmt::Debug for WorkersAiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkersAiCredentials")
            .field("api_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

impl WorkersAiCredentials {
    pub fn from_env() -> Result<Self, MissingCredential> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MissingCredential> {
        let read = |variable: &'static str| {
            lookup(variable)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(MissingCredential { variable })
        };
        Ok(Self {
            api_token: read(API_TOKEN_ENV)?,
            account_id: read(ACCOUNT_ID_ENV)?,
        })
    }
}

pub struct WorkersAiGateway {
    client: reqwest::Client,
    base_url: String,
    credentials: WorkersAiCredentials,
}

impl WorkersAiGateway {
    pub fn new(
        credentials: WorkersAiCredentials,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            credentials,
        })
    }
}

#[async_trait]
impl InferenceGateway for WorkersAiGateway {
    async fn invoke(
        &self,
        model: &str,
        conversation: &[Message],
    ) -> Result<Message, InferenceError> {
        let url = run_model_url(&self.base_url, &self.credentials.account_id, model);
        debug!(model, messages = conversation.len(), "sending inference request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.credentials.api_token)
            .json(&RunRequest::from_conversation(conversation))
            .send()
            .await
            .map_err(InferenceError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(InferenceError::Network)?;
        debug!(%status, bytes = body.len(), "inference response received");
        parse_run_response(status, &body)
    }
}

/// Turn a raw HTTP answer into the assistant reply or a typed error.
pub(crate) fn parse_run_response(status: StatusCode, body: &str) -> Result<Message, InferenceError> {
    if !status.is_success() {
        let message = summarize_error_body(body);
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                InferenceError::Auth { status, message }
            }
            _ => InferenceError::Api { status, message },
        });
    }

    let envelope: RunResponse = serde_json::from_str(body)
        .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

    if !envelope.success {
        let message = envelope
            .error_summary()
            .unwrap_or_else(|| "request was not successful".to_string());
        return Err(InferenceError::Api { status, message });
    }

    envelope
        .result
        .and_then(|result| result.response)
        .map(Message::assistant)
        .ok_or_else(|| InferenceError::MalformedResponse("missing result.response".to_string()))
}

fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(envelope) = serde_json::from_str::<RunResponse>(trimmed) {
        if let Some(summary) = envelope.error_summary() {
            return summary;
        }
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}
