use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::channel::{ConnectionEnd, run_connection};
use super::events::LiveSignal;
use crate::config::ReliabilityConfig;

/// Exponential backoff with equal jitter: each delay lies in
/// `[base / 2, base]`, and `base` doubles up to `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.max(Duration::from_millis(1));
        Self {
            initial,
            max: max.max(initial),
            current: initial,
        }
    }

    pub fn from_config(reliability: &ReliabilityConfig) -> Self {
        Self::new(
            Duration::from_millis(reliability.live_initial_backoff_ms),
            Duration::from_millis(reliability.live_max_backoff_ms),
        )
    }

    pub fn next_delay(&mut self) -> Duration {
        let base = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);

        let half = base / 2;
        let spread = u64::try_from((base - half).as_millis()).unwrap_or(u64::MAX);
        let jitter = if spread == 0 {
            0
        } else {
            rand::rng().random_range(0..=spread)
        };
        half + Duration::from_millis(jitter)
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Owner's handle on a running live channel. Dropping it does not stop the
/// task; call [`LiveHandle::close`].
pub struct LiveHandle {
    session_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl LiveHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Cancel and wait for the socket to be closed.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await
            && !e.is_cancelled()
        {
            tracing::warn!(session_id = %self.session_id, "live channel task panicked: {e}");
        }
    }
}

/// Open the live channel for `session_id` and keep it open until closed,
/// reconnecting with `backoff` whenever the socket drops.
pub fn spawn_live_channel<T>(
    url: String,
    session_id: String,
    tx: mpsc::Sender<T>,
    mut backoff: Backoff,
) -> LiveHandle
where
    T: From<LiveSignal> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    let task_session = session_id.clone();

    let task = tokio::spawn(async move {
        let session_id = task_session;
        loop {
            tracing::debug!(session_id = %session_id, url = %url, "live channel connecting");
            let reason = match run_connection(&url, &session_id, &tx, &task_cancel).await {
                Ok(ConnectionEnd::Cancelled | ConnectionEnd::ReceiverGone) => break,
                Ok(ConnectionEnd::Closed(reason)) => {
                    backoff.reset();
                    reason
                }
                Err(e) => e.to_string(),
            };

            tracing::warn!(session_id = %session_id, "live channel disconnected: {reason}");
            if tx
                .send(LiveSignal::disconnected(&session_id, reason).into())
                .await
                .is_err()
            {
                break;
            }

            let delay = backoff.next_delay();
            tracing::debug!(session_id = %session_id, ?delay, "live channel reconnect scheduled");
            tokio::select! {
                () = task_cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }
        tracing::debug!(session_id = %session_id, "live channel closed");
    });

    LiveHandle {
        session_id,
        cancel,
        task,
    }
}
