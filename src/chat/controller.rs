use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::audio::{AudioCapture, Microphone, default_microphone};
use super::session::{self, SessionRequest};
use super::state::{ChatState, Effect, Update};
use crate::api::{BackendClient, Role};
use crate::config::Config;
use crate::live::{Backoff, LiveHandle, spawn_live_channel};

const UPDATE_QUEUE_CAPACITY: usize = 256;

/// Owns the chat state and is the only place it changes.
///
/// User actions mutate state synchronously and spawn the matching backend
/// call; every completion comes back as an [`Update`] on one queue and is
/// applied by [`ChatController::process_next`] or [`ChatController::drain`].
pub struct ChatController {
    client: Arc<BackendClient>,
    live_url: String,
    backoff: Backoff,
    entry: SessionRequest,
    state: ChatState,
    audio: AudioCapture,
    live: Option<LiveHandle>,
    tx: mpsc::Sender<Update>,
    rx: mpsc::Receiver<Update>,
}

impl ChatController {
    pub fn new(
        client: Arc<BackendClient>,
        role: Role,
        live_url: impl Into<String>,
        backoff: Backoff,
        microphone: Box<dyn Microphone>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(UPDATE_QUEUE_CAPACITY);
        Self {
            client,
            live_url: live_url.into(),
            backoff,
            entry: SessionRequest::Join,
            state: ChatState::new(role),
            audio: AudioCapture::new(microphone),
            live: None,
            tx,
            rx,
        }
    }

    pub fn from_config(config: &Config, client: Arc<BackendClient>, role: Role) -> Self {
        Self::new(
            client,
            role,
            config.backend.ws_url.clone(),
            Backoff::from_config(&config.reliability),
            default_microphone(),
        )
    }

    /// Enter through a brand-new session rather than the shared demo one.
    pub fn with_fresh_session(mut self) -> Self {
        self.entry = SessionRequest::Fresh;
        self
    }

    pub fn with_summary_ttl(mut self, ttl: Duration) -> Self {
        self.state.set_summary_ttl(ttl);
        self
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ChatState {
        &mut self.state
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    fn spawn<F>(&self, work: F)
    where
        F: Future<Output = Update> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let update = work.await;
            if tx.send(update).await.is_err() {
                tracing::debug!("chat view closed; discarding late result");
            }
        });
    }

    // ── Operations ───────────────────────────────────────────────────────

    /// Resolve the entry session (shared demo unless configured otherwise);
    /// history and the live channel follow once it arrives.
    pub fn init(&mut self) {
        self.request_session(self.entry.clone());
    }

    fn request_session(&self, request: SessionRequest) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = session::resolve(&client, &request).await;
            Update::Session { request, result }
        });
    }

    /// Change the search filter and refetch: non-empty queries search, an
    /// empty query restores the full history.
    pub fn set_search(&mut self, query: &str) {
        if self.state.set_search(query) {
            self.refresh();
        }
    }

    /// Fetch history for the current filter. No-op before a session exists.
    pub fn refresh(&self) {
        let Some(session_id) = self.state.session_id().map(str::to_string) else {
            return;
        };
        let query = self.state.search().to_string();
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.fetch(&query).await;
            Update::Fetched {
                session_id,
                query,
                result,
            }
        });
    }

    /// Send the composer draft. Returns false when nothing was sent.
    pub fn send(&mut self) -> bool {
        let Some((session_id, draft)) = self.state.begin_send() else {
            return false;
        };
        let role = self.state.role();
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.send_chat(role, &draft).await;
            Update::Sent {
                session_id,
                draft,
                result,
            }
        });
        true
    }

    /// Supersede the active session with a brand-new one.
    pub fn clear_chat(&mut self) -> bool {
        let Some(previous) = self.state.begin_replace() else {
            return false;
        };
        self.request_session(SessionRequest::Replace { previous });
        true
    }

    pub fn open_summary(&mut self) {
        let requested_at = Instant::now();
        let Some((session_id, request)) = self.state.begin_summary(requested_at) else {
            return;
        };
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.summary().await;
            Update::Summary {
                session_id,
                request,
                requested_at,
                result,
            }
        });
    }

    pub fn close_summary(&mut self) {
        self.state.close_summary();
    }

    /// Write the summary on screen to `<dir>/<session>.md`.
    pub async fn save_summary(&self, dir: &Path) -> Result<PathBuf> {
        let panel = self.state.summary();
        if !panel.has_summary() {
            bail!("no summary to save");
        }
        let session = self.state.session().context("no active session")?;

        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join(format!("{}.md", session.id));
        let body = format!(
            "# Visit summary\n\n- Session: {}\n- Languages: {} / {}\n- Saved: {}\n\n{}\n",
            session.id,
            session.doctor_lang,
            session.patient_lang,
            chrono::Local::now().format("%Y-%m-%d %H:%M"),
            panel.text.trim_end(),
        );
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "summary saved");
        Ok(path)
    }

    pub fn start_recording(&mut self) {
        self.audio.start();
        self.state.set_recording(self.audio.is_recording());
    }

    /// Finish the recording and upload it; the resulting message arrives over
    /// the live channel.
    pub fn stop_recording(&mut self) {
        let upload = self.audio.stop();
        self.state.set_recording(false);
        let Some(upload) = upload else {
            return;
        };
        let Some(session_id) = self.state.session_id().map(str::to_string) else {
            tracing::warn!("recording finished without a session; discarded");
            return;
        };
        let role = self.state.role();
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.upload_audio(role, upload).await;
            Update::Uploaded { session_id, result }
        });
    }

    // ── Reconciliation loop ──────────────────────────────────────────────

    pub fn apply(&mut self, update: Update) {
        if let Some(effect) = self.state.apply(update) {
            self.perform(effect);
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::SessionActivated {
                session,
                load_history,
            } => {
                session::register(&self.client, &session);
                if let Some(previous) = self.live.take() {
                    previous.close();
                }
                self.live = Some(spawn_live_channel(
                    self.live_url.clone(),
                    session.id,
                    self.tx.clone(),
                    self.backoff.clone(),
                ));
                if load_history {
                    self.refresh();
                }
            }
        }
    }

    /// Wait for the next completion and apply it.
    pub async fn process_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(update) => {
                self.apply(update);
                true
            }
            None => false,
        }
    }

    /// Apply every completion already queued without waiting.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.rx.try_recv() {
            self.apply(update);
            applied += 1;
        }
        applied
    }

    /// Leave the chat view: close the live channel. Requests still in flight
    /// finish on their own and their results are discarded.
    pub async fn shutdown(mut self) {
        if let Some(live) = self.live.take() {
            live.shutdown().await;
        }
        self.rx.close();
    }
}
