use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;

use super::events::{LiveSignal, parse_event};
use crate::error::LiveError;

/// How a single connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEnd {
    /// Owner cancelled the channel; do not reconnect.
    Cancelled,
    /// Server closed the socket or the stream ended.
    Closed(String),
    /// The receiving side of the signal queue is gone.
    ReceiverGone,
}

/// One connection attempt: connect, report `Connected`, forward parsed events
/// until the socket ends or `cancel` fires.
pub async fn run_connection<T>(
    url: &str,
    session_id: &str,
    tx: &mpsc::Sender<T>,
    cancel: &CancellationToken,
) -> Result<ConnectionEnd, LiveError>
where
    T: From<LiveSignal> + Send + 'static,
{
    let connect = tokio_tungstenite::connect_async(url);
    let (ws_stream, _) = tokio::select! {
        () = cancel.cancelled() => return Ok(ConnectionEnd::Cancelled),
        result = connect => result.map_err(|e| LiveError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        })?,
    };
    let (mut write, mut read) = ws_stream.split();

    tracing::info!(session_id, "live channel connected");
    if tx.send(LiveSignal::connected(session_id).into()).await.is_err() {
        return Ok(ConnectionEnd::ReceiverGone);
    }

    loop {
        let frame = tokio::select! {
            () = cancel.cancelled() => {
                let _ = write.send(WsMessage::Close(None)).await;
                return Ok(ConnectionEnd::Cancelled);
            }
            frame = read.next() => frame,
        };

        let Some(frame) = frame else {
            return Ok(ConnectionEnd::Closed("stream ended".into()));
        };
        let frame = frame.map_err(|e| LiveError::Socket(e.to_string()))?;

        let raw = match frame {
            WsMessage::Text(text) => text.to_string(),
            WsMessage::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!(session_id, "live channel: dropping non-UTF-8 binary frame");
                    continue;
                }
            },
            WsMessage::Close(frame) => {
                let reason = frame.map_or_else(
                    || "closed by server".to_string(),
                    |f| format!("closed by server ({}): {}", u16::from(f.code), f.reason.as_str()),
                );
                return Ok(ConnectionEnd::Closed(reason));
            }
            _ => continue,
        };

        match parse_event(&raw) {
            Ok(event) => {
                if tx
                    .send(LiveSignal::event(session_id, event).into())
                    .await
                    .is_err()
                {
                    return Ok(ConnectionEnd::ReceiverGone);
                }
            }
            Err(e) => {
                tracing::warn!(session_id, "live channel: dropping event: {e}");
            }
        }
    }
}
