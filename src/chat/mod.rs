//! Chat session reconciliation: the message store, optimistic composer,
//! summary cache and audio capture, all driven by [`ChatController`].

pub mod audio;
pub mod composer;
pub mod controller;
#[cfg(feature = "microphone")]
pub mod microphone;
pub mod session;
pub mod state;
pub mod store;
pub mod summary;

pub use audio::{ActiveRecording, AudioCapture, Microphone, NoMicrophone, Recording};
pub use controller::ChatController;
pub use session::SessionRequest;
pub use state::{ChatState, Effect, SEND_FAILED, SESSION_FAILED, Update};
pub use summary::{SUMMARY_FAILED, SUMMARY_TTL};
