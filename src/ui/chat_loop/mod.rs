//! Main chat event loop.
//!
//! The loop is the only writer of [`SessionController`] state. Terminal
//! input and the results of spawned work arrive on one channel, are applied
//! in arrival order, and the screen is redrawn after each batch.

mod executor;
mod keybindings;
mod lifecycle;

pub use executor::{CommandExecutor, CommandOutcome};
pub use keybindings::{map_key_event, translate_event};
pub use lifecycle::{restore_terminal, setup_terminal, ChatTerminal};

use std::{error::Error, sync::Arc, time::Duration};

use ratatui::crossterm::event::{self, Event};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core::inference::InferenceGateway;
use crate::core::persistence::PersistenceGateway;
use crate::core::session::{SessionController, SessionEvent};
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::utils::logging::DebugSink;

#[derive(Debug)]
pub enum UiEvent {
    Terminal(Event),
    Session(SessionEvent),
}

/// Everything the loop needs, resolved before the terminal is touched.
pub struct ChatContext {
    pub session: SessionController,
    pub theme: Theme,
    pub inference: Arc<dyn InferenceGateway>,
    pub persistence: Option<Arc<dyn PersistenceGateway>>,
    pub debug_sink: Option<DebugSink>,
}

fn spawn_terminal_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Terminal(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Apply one event from the channel. Returns `true` when the session asked
/// to quit.
fn process_event(
    session: &mut SessionController,
    executor: &CommandExecutor,
    debug_sink: &mut Option<DebugSink>,
    event: UiEvent,
) -> bool {
    let session_events = match event {
        UiEvent::Terminal(ev) => {
            if let Some(sink) = debug_sink.as_mut() {
                sink.record(&ev);
            }
            translate_event(session, ev)
        }
        UiEvent::Session(ev) => vec![ev],
    };

    for session_event in session_events {
        if let Some(command) = session.dispatch(session_event) {
            if executor.execute(command) == CommandOutcome::Exit {
                return true;
            }
        }
    }
    false
}

pub async fn run_chat(context: ChatContext) -> Result<(), Box<dyn Error>> {
    let ChatContext {
        mut session,
        theme,
        inference,
        persistence,
        mut debug_sink,
    } = context;

    let mut terminal = setup_terminal()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let reader = spawn_terminal_reader(event_tx.clone());
    let executor = CommandExecutor::new(inference, persistence, event_tx);

    let size = terminal.size()?;
    session.dispatch(SessionEvent::Resize {
        width: size.width,
        height: size.height,
    });
    info!(model = %session.active_model(), "chat session started");

    let result = async {
        terminal.draw(|f| ui(f, &session, &theme))?;

        while let Some(first) = event_rx.recv().await {
            let mut exit = process_event(&mut session, &executor, &mut debug_sink, first);
            while !exit {
                let Ok(next) = event_rx.try_recv() else {
                    break;
                };
                exit = process_event(&mut session, &executor, &mut debug_sink, next);
            }
            if exit {
                debug!("quit requested");
                break;
            }
            terminal.draw(|f| ui(f, &session, &theme))?;
        }
        Ok::<(), Box<dyn Error>>(())
    }
    .await;

    reader.abort();
    restore_terminal(&mut terminal)?;
    info!(messages = session.conversation().len(), "chat session ended");
    result
}
