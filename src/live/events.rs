use serde::Deserialize;

use crate::api::Message;
use crate::error::LiveError;

/// A push event delivered over the live update socket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    NewMessage { message: Message },
    ClearHistory { session_id: String },
    #[serde(other)]
    Unknown,
}

pub fn parse_event(raw: &str) -> Result<LiveEvent, LiveError> {
    serde_json::from_str(raw).map_err(|e| LiveError::Malformed(format!("{e}: {}", preview(raw))))
}

/// What a live channel reports back to its owner. Every signal names the
/// session the channel was opened for so stale channels can be ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSignal {
    pub session_id: String,
    pub kind: LiveSignalKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiveSignalKind {
    Connected,
    Disconnected { reason: String },
    Event(LiveEvent),
}

impl LiveSignal {
    pub fn connected(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            kind: LiveSignalKind::Connected,
        }
    }

    pub fn disconnected(session_id: &str, reason: impl Into<String>) -> Self {
        Self {
            session_id: session_id.to_string(),
            kind: LiveSignalKind::Disconnected {
                reason: reason.into(),
            },
        }
    }

    pub fn event(session_id: &str, event: LiveEvent) -> Self {
        Self {
            session_id: session_id.to_string(),
            kind: LiveSignalKind::Event(event),
        }
    }
}

fn preview(raw: &str) -> String {
    const MAX: usize = 120;
    if raw.chars().count() <= MAX {
        raw.to_string()
    } else {
        let cut: String = raw.chars().take(MAX).collect();
        format!("{cut}…")
    }
}
