//! Session controller: the single owner of conversation and UI state.
//!
//! The controller is a synchronous state machine. [`SessionController::dispatch`]
//! applies one [`SessionEvent`] and optionally returns a [`SessionCommand`]
//! for the event loop to execute (spawn an inference call, save a snapshot,
//! quit). Results of that work come back later as ordinary events, so the
//! controller never blocks and never shares its state with another task.
//!
//! Admission control: at most one inference call is outstanding. While one
//! is pending, submissions are ignored and the draft is left untouched.

mod actions;
mod picker;
#[cfg(test)]
mod tests;

pub use actions::{InferenceRequest, SessionCommand, SessionEvent};
pub use picker::ModelPicker;

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use tracing::{debug, info, warn};
use tui_textarea::{Input, Key, TextArea};

use crate::core::catalog::ModelCatalog;
use crate::core::conversation::ConversationBuffer;
use crate::core::message::Message;
use crate::ui::layout::{ScreenAreas, TranscriptLayout};

pub const DEFAULT_INPUT_CHAR_LIMIT: usize = 280;
const INPUT_PLACEHOLDER: &str = "Ask anything...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Composing,
    AwaitingModelChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// One-line status shown between the transcript and the input box. Never
/// part of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Starting model; falls back to the catalog default when absent or unknown.
    pub initial_model: Option<String>,
    pub input_char_limit: usize,
    pub persistence_enabled: bool,
    pub viewport: Viewport,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            initial_model: None,
            input_char_limit: DEFAULT_INPUT_CHAR_LIMIT,
            persistence_enabled: true,
            viewport: Viewport::new(80, 24),
        }
    }
}

pub struct SessionController {
    catalog: ModelCatalog,
    conversation: ConversationBuffer,
    mode: Mode,
    active_model: String,
    pending: Option<u64>,
    next_ticket: u64,
    viewport: Viewport,
    input: TextArea<'static>,
    input_focused: bool,
    input_char_limit: usize,
    notice: Option<Notice>,
    picker: ModelPicker,
    transcript: TranscriptLayout,
    scroll_offset: u16,
    auto_scroll: bool,
    persistence_enabled: bool,
}

fn new_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_placeholder_text(INPUT_PLACEHOLDER);
    input.set_cursor_line_style(Style::default());
    input
}

impl SessionController {
    pub fn new(catalog: ModelCatalog, options: SessionOptions) -> Self {
        let active_model = options
            .initial_model
            .as_deref()
            .and_then(|id| catalog.find(id))
            .unwrap_or_else(|| catalog.default_model())
            .identifier
            .to_string();

        let mut controller = Self {
            catalog,
            conversation: ConversationBuffer::new(),
            mode: Mode::Composing,
            active_model,
            pending: None,
            next_ticket: 1,
            viewport: options.viewport,
            input: new_input(),
            input_focused: true,
            input_char_limit: options.input_char_limit,
            notice: None,
            picker: ModelPicker::default(),
            transcript: TranscriptLayout::build(&[], options.viewport.width),
            scroll_offset: 0,
            auto_scroll: true,
            persistence_enabled: options.persistence_enabled,
        };
        controller.apply_focus_style();
        controller
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn conversation(&self) -> &ConversationBuffer {
        &self.conversation
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn active_model(&self) -> &str {
        &self.active_model
    }

    /// Display alias of the active model, or the identifier if it has none.
    pub fn active_model_label(&self) -> &str {
        self.catalog
            .find(&self.active_model)
            .map(|m| m.display_alias)
            .unwrap_or(&self.active_model)
    }

    pub fn pending_inference(&self) -> bool {
        self.pending.is_some()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn input(&self) -> &TextArea<'static> {
        &self.input
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    /// Current unsent text, lines joined with `\n`.
    pub fn draft(&self) -> String {
        self.input.lines().join("\n")
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn picker(&self) -> &ModelPicker {
        &self.picker
    }

    pub fn transcript(&self) -> &TranscriptLayout {
        &self.transcript
    }

    pub fn persistence_enabled(&self) -> bool {
        self.persistence_enabled
    }

    /// Apply a batch of events in order, collecting the resulting commands.
    pub fn dispatch_all(
        &mut self,
        events: impl IntoIterator<Item = SessionEvent>,
    ) -> Vec<SessionCommand> {
        events
            .into_iter()
            .filter_map(|event| self.dispatch(event))
            .collect()
    }

    pub fn dispatch(&mut self, event: SessionEvent) -> Option<SessionCommand> {
        match event {
            SessionEvent::SubmitText { text } => self.submit_text(text),
            SessionEvent::InferenceCompleted { ticket, message } => {
                self.complete_inference(ticket, message);
                None
            }
            SessionEvent::InferenceFailed { ticket, error } => {
                if self.take_pending(ticket) {
                    warn!(ticket, %error, "inference failed");
                    self.notice = Some(Notice::error(error.to_string()));
                    self.clamp_scroll();
                }
                None
            }
            SessionEvent::EnterModelPicker => {
                if self.mode == Mode::Composing {
                    self.picker = ModelPicker::open(&self.catalog, &self.active_model);
                    self.mode = Mode::AwaitingModelChoice;
                    self.set_input_focus(false);
                }
                None
            }
            SessionEvent::CancelModelPicker => {
                if self.mode == Mode::AwaitingModelChoice {
                    self.leave_picker();
                }
                None
            }
            SessionEvent::ConfirmModelChoice { identifier } => {
                self.confirm_model(identifier);
                None
            }
            SessionEvent::Resize { width, height } => {
                self.resize(width, height);
                None
            }
            SessionEvent::SaveRequested => self.request_save(),
            SessionEvent::SessionSaved { session_id } => {
                info!(session_id, "session saved");
                self.set_notice(Notice::info(format!("Conversation saved as session #{session_id}")));
                None
            }
            SessionEvent::SaveFailed { error } => {
                warn!(%error, "saving session failed");
                self.set_notice(Notice::error(format!("Save failed: {error}")));
                None
            }
            SessionEvent::EditInput(input) => {
                self.edit_input(input);
                None
            }
            SessionEvent::PickerMoveUp => {
                if self.mode == Mode::AwaitingModelChoice {
                    self.picker.move_up(&self.catalog);
                }
                None
            }
            SessionEvent::PickerMoveDown => {
                if self.mode == Mode::AwaitingModelChoice {
                    self.picker.move_down(&self.catalog);
                }
                None
            }
            SessionEvent::PickerFilterPush(ch) => {
                if self.mode == Mode::AwaitingModelChoice {
                    self.picker.push_filter(ch);
                }
                None
            }
            SessionEvent::PickerFilterPop => {
                if self.mode == Mode::AwaitingModelChoice {
                    self.picker.pop_filter();
                }
                None
            }
            SessionEvent::ScrollUp(lines) => {
                self.scroll_offset = self.transcript_scroll().saturating_sub(lines);
                self.auto_scroll = false;
                None
            }
            SessionEvent::ScrollDown(lines) => {
                let max = self.max_scroll();
                self.scroll_offset = self.transcript_scroll().saturating_add(lines).min(max);
                self.auto_scroll = self.scroll_offset >= max;
                None
            }
            SessionEvent::ScrollToTop => {
                self.scroll_offset = 0;
                self.auto_scroll = false;
                None
            }
            SessionEvent::ScrollToBottom => {
                self.auto_scroll = true;
                self.scroll_offset = self.max_scroll();
                None
            }
            SessionEvent::Quit => Some(SessionCommand::Quit),
        }
    }

    /// Rows of the transcript available on screen for the current viewport.
    pub fn transcript_height(&self) -> u16 {
        ScreenAreas::split(self.viewport.area(), self.notice.is_some())
            .transcript
            .height
    }

    /// First transcript row to show.
    pub fn transcript_scroll(&self) -> u16 {
        let max = self.max_scroll();
        if self.auto_scroll {
            max
        } else {
            self.scroll_offset.min(max)
        }
    }

    fn max_scroll(&self) -> u16 {
        let total = u16::try_from(self.transcript.line_count()).unwrap_or(u16::MAX);
        total.saturating_sub(self.transcript_height())
    }

    fn submit_text(&mut self, text: String) -> Option<SessionCommand> {
        if self.mode != Mode::Composing || text.trim().is_empty() {
            return None;
        }
        if self.pending.is_some() {
            debug!("submission ignored while an inference call is pending");
            return None;
        }

        self.append(Message::user(text));
        self.input = new_input();
        self.apply_focus_style();

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending = Some(ticket);
        if matches!(self.notice, Some(Notice { kind: NoticeKind::Error, .. })) {
            self.notice = None;
        }
        debug!(ticket, model = %self.active_model, "spawning inference");

        Some(SessionCommand::SpawnInference(InferenceRequest {
            ticket,
            model: self.active_model.clone(),
            conversation: self.conversation.snapshot(),
        }))
    }

    fn complete_inference(&mut self, ticket: u64, message: Message) {
        if !self.take_pending(ticket) {
            return;
        }
        // The gateway contract says assistant; enforce it for the transcript.
        self.append(Message::assistant(message.content));
        if matches!(self.notice, Some(Notice { kind: NoticeKind::Error, .. })) {
            self.notice = None;
            self.clamp_scroll();
        }
        debug!(ticket, messages = self.conversation.len(), "inference completed");
    }

    /// Clear the pending flag if `ticket` is the outstanding call.
    fn take_pending(&mut self, ticket: u64) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            debug!(ticket, pending = ?self.pending, "discarding stale inference result");
            false
        }
    }

    fn append(&mut self, message: Message) {
        self.conversation.append(message);
        self.transcript.extend(self.conversation.as_slice());
        self.auto_scroll = true;
    }

    fn confirm_model(&mut self, identifier: String) {
        if self.mode != Mode::AwaitingModelChoice {
            return;
        }
        let Some(model) = self.catalog.find(&identifier) else {
            debug!(%identifier, "ignoring unknown model choice");
            return;
        };
        let alias = model.display_alias;
        self.active_model = identifier;
        info!(model = %self.active_model, "model switched");
        self.leave_picker();
        self.set_notice(Notice::info(format!("Model set to {alias}")));
    }

    fn leave_picker(&mut self) {
        self.mode = Mode::Composing;
        self.picker = ModelPicker::default();
        self.set_input_focus(true);
    }

    fn request_save(&mut self) -> Option<SessionCommand> {
        if !self.persistence_enabled {
            self.set_notice(Notice::info("Saving is disabled for this session"));
            return None;
        }
        Some(SessionCommand::SaveSession {
            conversation: self.conversation.snapshot(),
        })
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport::new(width, height);
        if self.transcript.width() != width {
            self.transcript = TranscriptLayout::build(self.conversation.as_slice(), width);
        }
        self.clamp_scroll();
    }

    fn edit_input(&mut self, input: Input) {
        if self.mode != Mode::Composing {
            return;
        }
        let inserts_text = match input.key {
            // Ctrl+M is a line break in the textarea.
            Key::Char('m') if input.ctrl && !input.alt => true,
            Key::Char(_) | Key::Tab => !input.ctrl && !input.alt,
            Key::Enter => true,
            _ => false,
        };
        if inserts_text && self.draft_len() >= self.input_char_limit {
            return;
        }
        self.input.input(input);
    }

    /// Characters in the draft, counting each line break as one.
    fn draft_len(&self) -> usize {
        let lines = self.input.lines();
        let chars: usize = lines.iter().map(|line| line.chars().count()).sum();
        chars + lines.len().saturating_sub(1)
    }

    fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    fn set_input_focus(&mut self, focused: bool) {
        self.input_focused = focused;
        self.apply_focus_style();
    }

    fn apply_focus_style(&mut self) {
        let cursor = if self.input_focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.input.set_cursor_style(cursor);
    }
}
