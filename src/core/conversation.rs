//! Append-only conversation history.
//!
//! The buffer is the only source of truth for both rendering and persistence.
//! Messages are never reordered or removed once appended; anything that needs
//! the history outside the event loop takes a [`Snapshot`].

use std::sync::Arc;

use crate::core::message::Message;

/// Immutable copy of the conversation at a point in time. Cheap to clone and
/// safe to move into spawned tasks.
pub type Snapshot = Arc<[Message]>;

#[derive(Debug, Clone, Default)]
pub struct ConversationBuffer {
    messages: Vec<Message>,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::from(self.messages.as_slice())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a ConversationBuffer {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
