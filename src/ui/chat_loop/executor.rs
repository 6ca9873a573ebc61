use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::conversation::Snapshot;
use crate::core::inference::{InferenceError, InferenceGateway};
use crate::core::persistence::{PersistenceError, PersistenceGateway};
use crate::core::session::{InferenceRequest, SessionCommand, SessionEvent};
use crate::ui::chat_loop::UiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}

/// Runs the side effects the controller asks for. Each piece of remote work
/// runs on its own task and reports back through the UI channel; if the
/// loop has already shut down, the result is dropped.
#[derive(Clone)]
pub struct CommandExecutor {
    inference: Arc<dyn InferenceGateway>,
    persistence: Option<Arc<dyn PersistenceGateway>>,
    event_tx: mpsc::UnboundedSender<UiEvent>,
}

impl CommandExecutor {
    pub fn new(
        inference: Arc<dyn InferenceGateway>,
        persistence: Option<Arc<dyn PersistenceGateway>>,
        event_tx: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            inference,
            persistence,
            event_tx,
        }
    }

    pub fn execute(&self, command: SessionCommand) -> CommandOutcome {
        match command {
            SessionCommand::SpawnInference(request) => {
                self.spawn_inference(request);
                CommandOutcome::Continue
            }
            SessionCommand::SaveSession { conversation } => {
                self.spawn_save(conversation);
                CommandOutcome::Continue
            }
            SessionCommand::Quit => CommandOutcome::Exit,
        }
    }

    pub fn spawn_inference(&self, request: InferenceRequest) -> JoinHandle<()> {
        let gateway = Arc::clone(&self.inference);
        let event_tx = self.event_tx.clone();
        let ticket = request.ticket;

        let call = tokio::spawn(async move {
            let InferenceRequest {
                ticket,
                model,
                conversation,
            } = request;
            match gateway.invoke(&model, &conversation).await {
                Ok(message) => SessionEvent::InferenceCompleted { ticket, message },
                Err(error) => SessionEvent::InferenceFailed { ticket, error },
            }
        });

        tokio::spawn(async move {
            let event = match call.await {
                Ok(event) => event,
                Err(join_error) => {
                    warn!(ticket, %join_error, "inference task ended abnormally");
                    SessionEvent::InferenceFailed {
                        ticket,
                        error: InferenceError::Interrupted(join_error.to_string()),
                    }
                }
            };
            if event_tx.send(UiEvent::Session(event)).is_err() {
                debug!(ticket, "event loop closed; dropping inference result");
            }
        })
    }

    pub fn spawn_save(&self, conversation: Snapshot) -> Option<JoinHandle<()>> {
        let Some(store) = self.persistence.as_ref().map(Arc::clone) else {
            debug!("save requested without a session store");
            return None;
        };
        let event_tx = self.event_tx.clone();

        let save = tokio::spawn(async move { store.save_session(&conversation).await });

        Some(tokio::spawn(async move {
            let event = match save.await {
                Ok(Ok(session_id)) => SessionEvent::SessionSaved { session_id },
                Ok(Err(error)) => SessionEvent::SaveFailed { error },
                Err(join_error) => SessionEvent::SaveFailed {
                    error: PersistenceError::Interrupted {
                        detail: join_error.to_string(),
                    },
                },
            };
            let _ = event_tx.send(UiEvent::Session(event));
        }))
    }
}
