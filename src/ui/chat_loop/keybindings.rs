//! Translation from terminal input to session events.
//!
//! Nothing here mutates the controller; the mapping only reads the current
//! mode, draft and picker selection to decide which event a key stands for.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui_textarea::{Input as TAInput, Key as TAKey};

use crate::core::session::{Mode, SessionController, SessionEvent};

/// Map one terminal event to the session events it produces. Most events map
/// to at most one; a bracketed paste becomes one edit per character so the
/// input limit applies to pasted text the same way it does to typing.
pub fn translate_event(session: &SessionController, event: Event) -> Vec<SessionEvent> {
    match event {
        Event::Key(key) => map_key_event(session, key).into_iter().collect(),
        Event::Paste(text) => paste_events(session, &text),
        Event::Resize(width, height) => vec![SessionEvent::Resize { width, height }],
        _ => Vec::new(),
    }
}

pub fn map_key_event(session: &SessionController, key: KeyEvent) -> Option<SessionEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Some(SessionEvent::Quit);
    }
    if ctrl && key.code == KeyCode::Char('s') {
        return Some(SessionEvent::SaveRequested);
    }

    match session.mode() {
        Mode::Composing => map_composing_key(session, key, ctrl),
        Mode::AwaitingModelChoice => map_picker_key(session, key, ctrl),
    }
}

fn map_composing_key(session: &SessionController, key: KeyEvent, ctrl: bool) -> Option<SessionEvent> {
    let page = session.transcript_height().saturating_sub(1).max(1);

    match key.code {
        KeyCode::Char('e') if ctrl => Some(SessionEvent::EnterModelPicker),
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) => {
            Some(SessionEvent::EditInput(TAInput {
                key: TAKey::Enter,
                ..TAInput::default()
            }))
        }
        KeyCode::Enter => Some(SessionEvent::SubmitText {
            text: session.draft(),
        }),
        KeyCode::Char('m') if ctrl => Some(SessionEvent::SubmitText {
            text: session.draft(),
        }),
        KeyCode::PageUp => Some(SessionEvent::ScrollUp(page)),
        KeyCode::PageDown => Some(SessionEvent::ScrollDown(page)),
        KeyCode::Home if ctrl => Some(SessionEvent::ScrollToTop),
        KeyCode::End if ctrl => Some(SessionEvent::ScrollToBottom),
        _ => Some(SessionEvent::EditInput(TAInput::from(key))),
    }
}

fn map_picker_key(session: &SessionController, key: KeyEvent, ctrl: bool) -> Option<SessionEvent> {
    match key.code {
        KeyCode::Esc => Some(SessionEvent::CancelModelPicker),
        KeyCode::Enter => session
            .picker()
            .selected_model(session.catalog())
            .map(|model| SessionEvent::ConfirmModelChoice {
                identifier: model.identifier.to_string(),
            }),
        KeyCode::Up => Some(SessionEvent::PickerMoveUp),
        KeyCode::Down => Some(SessionEvent::PickerMoveDown),
        KeyCode::Char('p') if ctrl => Some(SessionEvent::PickerMoveUp),
        KeyCode::Char('n') if ctrl => Some(SessionEvent::PickerMoveDown),
        KeyCode::Backspace => Some(SessionEvent::PickerFilterPop),
        KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            Some(SessionEvent::PickerFilterPush(ch))
        }
        _ => None,
    }
}

fn paste_events(session: &SessionController, text: &str) -> Vec<SessionEvent> {
    match session.mode() {
        Mode::Composing => text
            .replace("\r\n", "\n")
            .chars()
            .filter(|ch| *ch != '\r')
            .map(|ch| {
                let key = if ch == '\n' { TAKey::Enter } else { TAKey::Char(ch) };
                SessionEvent::EditInput(TAInput {
                    key,
                    ..TAInput::default()
                })
            })
            .collect(),
        Mode::AwaitingModelChoice => text
            .chars()
            .filter(|ch| !ch.is_control())
            .map(SessionEvent::PickerFilterPush)
            .collect(),
    }
}
