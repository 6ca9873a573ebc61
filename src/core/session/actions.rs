use tui_textarea::Input;

use crate::core::conversation::Snapshot;
use crate::core::inference::InferenceError;
use crate::core::message::Message;
use crate::core::persistence::PersistenceError;

/// Everything that can change session state. Keyboard input, window resizes
/// and finished background tasks all arrive as one of these.
#[derive(Debug)]
pub enum SessionEvent {
    SubmitText {
        text: String,
    },
    InferenceCompleted {
        ticket: u64,
        message: Message,
    },
    InferenceFailed {
        ticket: u64,
        error: InferenceError,
    },
    EnterModelPicker,
    CancelModelPicker,
    ConfirmModelChoice {
        identifier: String,
    },
    Resize {
        width: u16,
        height: u16,
    },
    SaveRequested,
    SessionSaved {
        session_id: i64,
    },
    SaveFailed {
        error: PersistenceError,
    },
    /// Raw edit forwarded to the draft text area.
    EditInput(Input),
    PickerMoveUp,
    PickerMoveDown,
    PickerFilterPush(char),
    PickerFilterPop,
    ScrollUp(u16),
    ScrollDown(u16),
    ScrollToTop,
    ScrollToBottom,
    Quit,
}

/// Work the controller asks the event loop to perform outside of itself.
#[derive(Debug)]
pub enum SessionCommand {
    SpawnInference(InferenceRequest),
    SaveSession { conversation: Snapshot },
    Quit,
}

#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Identifies the outstanding call; the result event must echo it.
    pub ticket: u64,
    pub model: String,
    pub conversation: Snapshot,
}
