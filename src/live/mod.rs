//! Live update channel: one WebSocket per active session delivering
//! `new_message` and `clear_history` pushes.

pub mod channel;
pub mod events;
pub mod supervisor;

pub use events::{LiveEvent, LiveSignal, LiveSignalKind, parse_event};
pub use supervisor::{Backoff, LiveHandle, spawn_live_channel};
