use crate::api::Message;

/// Ordered messages of the active session.
///
/// Every mutation names the session it targets; mutations for any other
/// session are refused, so the store never mixes conversations.
#[derive(Debug, Default)]
pub struct MessageStore {
    session_id: Option<String>,
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn is_active(&self, session_id: &str) -> bool {
        self.session_id.as_deref() == Some(session_id)
    }

    /// Switch to a new session and drop everything held for the old one.
    pub fn reset(&mut self, session_id: &str) {
        self.session_id = Some(session_id.to_string());
        self.messages.clear();
    }

    /// Replace the list with a fetch result. Entries from another session are
    /// skipped.
    pub fn replace(&mut self, session_id: &str, messages: Vec<Message>) -> bool {
        if !self.is_active(session_id) {
            return false;
        }
        let before = messages.len();
        self.messages = messages
            .into_iter()
            .filter(|m| m.session_id == session_id)
            .collect();
        if self.messages.len() != before {
            tracing::debug!(
                session_id,
                skipped = before - self.messages.len(),
                "message store: fetch carried foreign messages"
            );
        }
        true
    }

    /// Append a pushed message verbatim, in arrival order.
    pub fn append(&mut self, message: Message) -> bool {
        if !self.is_active(&message.session_id) {
            tracing::debug!(
                message_id = message.id,
                message_session = %message.session_id,
                "message store: ignoring message for inactive session"
            );
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Empty the list if `session_id` is the active session.
    pub fn clear_for(&mut self, session_id: &str) -> bool {
        if !self.is_active(session_id) {
            return false;
        }
        self.messages.clear();
        true
    }
}
