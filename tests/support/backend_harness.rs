#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use careline::api::{BackendClient, Role};
use careline::chat::{ActiveRecording, ChatController, Microphone, Recording};
use careline::config::Preferences;
use careline::error::AudioError;
use careline::live::Backoff;

pub const PUMP_DEADLINE: Duration = Duration::from_secs(5);

pub fn session_json(id: &str) -> Value {
    json!({
        "id": id,
        "created_at": "2025-03-04T10:00:00",
        "doctor_lang": "en",
        "patient_lang": "es"
    })
}

pub fn message_json(id: i64, session_id: &str, role: &str, text: &str) -> Value {
    json!({
        "id": id,
        "session_id": session_id,
        "role": role,
        "original_text": text,
        "translated_text": null,
        "audio_url": null,
        "timestamp": "2025-03-04T10:01:00"
    })
}

pub fn new_message_event(message: Value) -> Value {
    json!({ "type": "new_message", "message": message })
}

pub fn clear_history_event(session_id: &str) -> Value {
    json!({ "type": "clear_history", "session_id": session_id })
}

/// Mounts the shared demo session and its initial history.
pub async fn mount_demo(server: &MockServer, session_id: &str, history: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/session/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json(session_id)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(history)))
        .mount(server)
        .await;
}

/// Local WebSocket server standing in for the backend's broadcast socket.
/// Every accepted connection receives whatever is pushed afterwards.
pub struct FakeLive {
    pub url: String,
    push: broadcast::Sender<String>,
    connections: Arc<AtomicUsize>,
    accepted: Arc<AtomicUsize>,
}

impl FakeLive {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/ws", listener.local_addr().unwrap());
        let (push, _) = broadcast::channel::<String>(64);
        let connections = Arc::new(AtomicUsize::new(0));
        let accepted = Arc::new(AtomicUsize::new(0));

        let accept_push = push.clone();
        let accept_count = connections.clone();
        let accept_total = accepted.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let mut events = accept_push.subscribe();
                let count = accept_count.clone();
                let total = accept_total.clone();
                tokio::spawn(async move {
                    let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                        return;
                    };
                    count.fetch_add(1, Ordering::SeqCst);
                    total.fetch_add(1, Ordering::SeqCst);
                    let (mut sink, mut frames) = ws.split();
                    loop {
                        tokio::select! {
                            event = events.recv() => {
                                let Ok(event) = event else { break };
                                if sink.send(WsMessage::Text(event.into())).await.is_err() {
                                    break;
                                }
                            }
                            frame = frames.next() => {
                                match frame {
                                    Some(Ok(frame)) if !frame.is_close() => {}
                                    _ => break,
                                }
                            }
                        }
                    }
                    count.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        Self {
            url,
            push,
            connections,
            accepted,
        }
    }

    /// Sockets currently open.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Sockets ever opened.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn push(&self, event: &Value) {
        let _ = self.push.send(event.to_string());
    }
}

pub fn controller(
    server: &MockServer,
    live_url: &str,
    role: Role,
    microphone: Box<dyn Microphone>,
) -> ChatController {
    let client = BackendClient::with_http(
        reqwest::Client::new(),
        &server.uri(),
        Preferences::in_memory(),
    );
    ChatController::new(
        Arc::new(client),
        role,
        live_url,
        Backoff::new(Duration::from_millis(50), Duration::from_millis(200)),
        microphone,
    )
}

/// Apply queued updates until `done` holds or the deadline passes.
pub async fn pump_until<F>(ctrl: &mut ChatController, mut done: F) -> bool
where
    F: FnMut(&ChatController) -> bool,
{
    let deadline = Instant::now() + PUMP_DEADLINE;
    while Instant::now() < deadline {
        if done(ctrl) {
            return true;
        }
        let _ = tokio::time::timeout(Duration::from_millis(20), ctrl.process_next()).await;
    }
    done(ctrl)
}

/// Keep applying updates for `period` regardless of what arrives.
pub async fn settle(ctrl: &mut ChatController, period: Duration) {
    let deadline = Instant::now() + period;
    while Instant::now() < deadline {
        let _ = tokio::time::timeout(Duration::from_millis(20), ctrl.process_next()).await;
    }
}

/// Join the demo session, wait until its live channel is connected and let
/// the initial history land.
pub async fn join(ctrl: &mut ChatController, live: &FakeLive, session_id: &str) {
    ctrl.init();
    let joined = pump_until(ctrl, |c| {
        c.state().session_id() == Some(session_id) && live.connections() > 0
    })
    .await;
    assert!(joined, "session {session_id} never became active");
    settle(ctrl, Duration::from_millis(200)).await;
}

/// Microphone that "records" fixed chunks.
pub struct ScriptedMicrophone {
    pub chunks: Vec<Vec<u8>>,
    pub starts: Arc<Mutex<usize>>,
}

impl ScriptedMicrophone {
    pub fn new(chunks: &[&[u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            starts: Arc::new(Mutex::new(0)),
        }
    }
}

impl Microphone for ScriptedMicrophone {
    fn start(&mut self) -> Result<Box<dyn ActiveRecording>, AudioError> {
        *self.starts.lock().unwrap() += 1;
        Ok(Box::new(ScriptedRecording {
            chunks: self.chunks.clone(),
        }))
    }
}

struct ScriptedRecording {
    chunks: Vec<Vec<u8>>,
}

impl ActiveRecording for ScriptedRecording {
    fn finish(self: Box<Self>) -> Result<Recording, AudioError> {
        Ok(Recording {
            chunks: self.chunks,
            file_name: "recording.webm".into(),
            mime_type: "audio/webm".into(),
        })
    }
}
