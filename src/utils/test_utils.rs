use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::catalog::ModelCatalog;
use crate::core::inference::{InferenceError, InferenceGateway};
use crate::core::message::Message;
use crate::core::persistence::{PersistenceError, PersistenceGateway};
use crate::core::session::{SessionController, SessionOptions, Viewport};

pub fn create_test_controller() -> SessionController {
    SessionController::new(ModelCatalog::builtin(), SessionOptions::default())
}

pub fn create_test_controller_with_viewport(width: u16, height: u16) -> SessionController {
    SessionController::new(
        ModelCatalog::builtin(),
        SessionOptions {
            viewport: Viewport::new(width, height),
            ..SessionOptions::default()
        },
    )
}

pub fn create_test_messages() -> Vec<Message> {
    vec![
        Message::user("Hello"),
        Message::assistant("Hi there!"),
        Message::user("How are you?"),
        Message::assistant("I'm doing well, thank you for asking!"),
    ]
}

/// Inference gateway that answers every call with a fixed reply, or fails
/// with a malformed-response error when constructed with [`Self::failing`].
pub struct ScriptedGateway {
    reply: Option<String>,
    calls: Mutex<Vec<(String, Vec<Message>)>>,
}

impl ScriptedGateway {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<Message>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceGateway for ScriptedGateway {
    async fn invoke(
        &self,
        model: &str,
        conversation: &[Message],
    ) -> Result<Message, InferenceError> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), conversation.to_vec()));
        match &self.reply {
            Some(reply) => Ok(Message::assistant(reply.clone())),
            None => Err(InferenceError::MalformedResponse(
                "scripted failure".to_string(),
            )),
        }
    }
}

/// Persistence gateway that keeps saved sessions in memory.
#[derive(Default)]
pub struct RecordingStore {
    sessions: Mutex<Vec<Vec<Message>>>,
}

impl RecordingStore {
    pub fn sessions(&self) -> Vec<Vec<Message>> {
        self.sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersistenceGateway for RecordingStore {
    async fn save_session(&self, conversation: &[Message]) -> Result<i64, PersistenceError> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.push(conversation.to_vec());
        Ok(sessions.len() as i64)
    }
}
