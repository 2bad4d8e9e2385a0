use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use super::composer::Composer;
use super::session::SessionRequest;
use super::store::MessageStore;
use super::summary::{SUMMARY_FAILED, SummaryCache, SummaryPanel};
use crate::api::{Message, Role, Session};
use crate::error::ApiError;
use crate::live::{LiveEvent, LiveSignal, LiveSignalKind};

pub const SEND_FAILED: &str = "Failed to send message. Please try again.";
pub const SESSION_FAILED: &str = "Failed to create new session";

/// Completion of some asynchronous piece of work, queued for the controller.
#[derive(Debug)]
pub enum Update {
    Session {
        request: SessionRequest,
        result: Result<Session, ApiError>,
    },
    Fetched {
        session_id: String,
        query: String,
        result: Result<Vec<Message>, ApiError>,
    },
    Sent {
        session_id: String,
        draft: String,
        result: Result<(), ApiError>,
    },
    Summary {
        session_id: String,
        request: u64,
        requested_at: Instant,
        result: Result<String, ApiError>,
    },
    Uploaded {
        session_id: String,
        result: Result<(), ApiError>,
    },
    Live(LiveSignal),
}

impl From<LiveSignal> for Update {
    fn from(signal: LiveSignal) -> Self {
        Self::Live(signal)
    }
}

/// Follow-up work the controller must do after an update was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `session` just became active: register it and reopen the live
    /// channel; load its history when `load_history` is set.
    SessionActivated {
        session: Session,
        load_history: bool,
    },
}

/// Everything the chat screen renders. Mutated only by the controller task.
#[derive(Debug)]
pub struct ChatState {
    role: Role,
    session: Option<Session>,
    store: MessageStore,
    online: bool,
    search: String,
    composer: Composer,
    summary: SummaryPanel,
    summary_cache: SummaryCache,
    summary_request: u64,
    show_original: HashSet<i64>,
    notice: Option<String>,
    recording: bool,
    replacing: bool,
}

impl ChatState {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            session: None,
            store: MessageStore::new(),
            online: true,
            search: String::new(),
            composer: Composer::new(),
            summary: SummaryPanel::default(),
            summary_cache: SummaryCache::default(),
            summary_request: 0,
            show_original: HashSet::new(),
            notice: None,
            recording: false,
            replacing: false,
        }
    }

    pub fn set_summary_ttl(&mut self, ttl: Duration) {
        self.summary_cache = SummaryCache::new(ttl);
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    pub fn summary(&self) -> &SummaryPanel {
        &self.summary
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn is_replacing(&self) -> bool {
        self.replacing
    }

    pub fn showing_original(&self, message_id: i64) -> bool {
        self.show_original.contains(&message_id)
    }

    fn is_active(&self, session_id: &str) -> bool {
        self.session_id() == Some(session_id)
    }

    // ── Local edits ──────────────────────────────────────────────────────

    pub fn toggle_original(&mut self, message_id: i64) {
        if !self.show_original.remove(&message_id) {
            self.show_original.insert(message_id);
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn close_summary(&mut self) {
        self.summary.open = false;
    }

    pub(crate) fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    /// Returns true when the query actually changed.
    pub(crate) fn set_search(&mut self, query: &str) -> bool {
        if self.search == query {
            return false;
        }
        query.clone_into(&mut self.search);
        true
    }

    /// Capture the draft for sending: `(session_id, text)`.
    pub(crate) fn begin_send(&mut self) -> Option<(String, String)> {
        let session_id = self.session_id()?.to_string();
        let text = self.composer.begin_send()?;
        Some((session_id, text))
    }

    /// Mark a clear-chat in flight; returns the session being replaced.
    pub(crate) fn begin_replace(&mut self) -> Option<String> {
        if self.replacing {
            return None;
        }
        let previous = self.session_id()?.to_string();
        self.replacing = true;
        Some(previous)
    }

    /// Open the summary panel. A fresh cached summary is shown directly;
    /// otherwise the panel enters loading and the new request id is returned.
    pub(crate) fn begin_summary(&mut self, now: Instant) -> Option<(String, u64)> {
        self.summary.open = true;
        let session_id = self.session_id()?.to_string();

        if let Some(text) = self.summary_cache.fresh(now) {
            self.summary.text = text.to_string();
            self.summary.loading = false;
            return None;
        }

        self.summary_request += 1;
        self.summary.loading = true;
        self.summary.text.clear();
        Some((session_id, self.summary_request))
    }

    // ── Reconciliation ───────────────────────────────────────────────────

    pub fn apply(&mut self, update: Update) -> Option<Effect> {
        match update {
            Update::Session { request, result } => self.apply_session(request, result),
            Update::Fetched {
                session_id,
                query,
                result,
            } => {
                self.apply_fetch(&session_id, &query, result);
                None
            }
            Update::Sent {
                session_id,
                draft,
                result,
            } => {
                self.apply_sent(&session_id, draft, result);
                None
            }
            Update::Summary {
                session_id,
                request,
                requested_at,
                result,
            } => {
                self.apply_summary(&session_id, request, requested_at, result);
                None
            }
            Update::Uploaded { session_id, result } => {
                match result {
                    Ok(()) => {
                        tracing::debug!(session_id = %session_id, "audio upload accepted");
                        self.online = true;
                    }
                    Err(e) => tracing::error!(session_id = %session_id, "audio upload failed: {e}"),
                }
                None
            }
            Update::Live(signal) => {
                self.apply_live(signal);
                None
            }
        }
    }

    fn activate(&mut self, session: Session) {
        self.store.reset(&session.id);
        self.summary_cache.invalidate();
        self.summary_request += 1;
        self.summary.loading = false;
        self.summary.text.clear();
        self.show_original.clear();
        self.session = Some(session);
    }

    fn apply_session(
        &mut self,
        request: SessionRequest,
        result: Result<Session, ApiError>,
    ) -> Option<Effect> {
        match request {
            SessionRequest::Join | SessionRequest::Fresh => {
                if self.session.is_some() {
                    tracing::debug!("session already active; ignoring late join");
                    return None;
                }
                match result {
                    Ok(session) => {
                        self.activate(session.clone());
                        Some(Effect::SessionActivated {
                            session,
                            load_history: true,
                        })
                    }
                    Err(e) => {
                        tracing::warn!("failed to init session: {e}");
                        self.online = false;
                        None
                    }
                }
            }
            SessionRequest::Replace { previous } => {
                self.replacing = false;
                if !self.is_active(&previous) {
                    tracing::debug!(previous = %previous, "stale session replacement dropped");
                    return None;
                }
                match result {
                    Ok(session) => {
                        self.activate(session.clone());
                        self.online = true;
                        Some(Effect::SessionActivated {
                            session,
                            load_history: false,
                        })
                    }
                    Err(e) => {
                        tracing::error!("failed to create new session: {e}");
                        self.notice = Some(SESSION_FAILED.to_string());
                        None
                    }
                }
            }
        }
    }

    fn apply_fetch(&mut self, session_id: &str, query: &str, result: Result<Vec<Message>, ApiError>) {
        if !self.is_active(session_id) {
            tracing::debug!(session_id, "fetch for inactive session dropped");
            return;
        }
        if query != self.search {
            tracing::debug!(query, "superseded fetch dropped");
            return;
        }
        match result {
            Ok(messages) => {
                self.store.replace(session_id, messages);
                self.online = true;
            }
            Err(e) => {
                tracing::warn!("fetch failed: {e}");
                self.online = false;
            }
        }
    }

    fn apply_sent(&mut self, session_id: &str, draft: String, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                tracing::debug!(session_id, "send accepted; awaiting push");
                self.online = true;
                self.composer.finish_send(draft, true);
            }
            Err(e) => {
                tracing::error!(session_id, "send failed: {e}");
                if e.is_connectivity() {
                    self.online = false;
                }
                self.composer.finish_send(draft, false);
                self.notice = Some(SEND_FAILED.to_string());
            }
        }
    }

    fn apply_summary(
        &mut self,
        session_id: &str,
        request: u64,
        requested_at: Instant,
        result: Result<String, ApiError>,
    ) {
        if result.is_ok() {
            self.online = true;
        }
        if !self.is_active(session_id) || request != self.summary_request {
            tracing::debug!(session_id, request, "superseded summary dropped");
            return;
        }
        self.summary.loading = false;
        match result {
            Ok(text) => {
                self.summary_cache.store(text.clone(), requested_at);
                self.summary.text = text;
            }
            Err(e) => {
                tracing::error!("summary generation failed: {e}");
                SUMMARY_FAILED.clone_into(&mut self.summary.text);
            }
        }
    }

    fn apply_live(&mut self, signal: LiveSignal) {
        if !self.is_active(&signal.session_id) {
            tracing::debug!(channel = %signal.session_id, "signal from stale live channel dropped");
            return;
        }
        match signal.kind {
            LiveSignalKind::Connected => self.online = true,
            LiveSignalKind::Disconnected { reason } => {
                tracing::debug!("offline: {reason}");
                self.online = false;
            }
            LiveSignalKind::Event(LiveEvent::NewMessage { message }) => {
                self.store.append(message);
            }
            LiveSignalKind::Event(LiveEvent::ClearHistory { session_id }) => {
                if self.store.clear_for(&session_id) {
                    self.show_original.clear();
                } else {
                    tracing::debug!(session_id = %session_id, "clear_history for another session ignored");
                }
            }
            LiveSignalKind::Event(LiveEvent::Unknown) => {
                tracing::debug!("unknown live event ignored");
            }
        }
    }
}
