//! Full-screen terminal UI: the landing screen and the chat screen.

mod app;
mod handlers;
mod landing;
pub mod panels;
mod render;
mod screen;
pub mod theme;
pub mod widgets;

pub use app::{run_chat, run_landing};
pub use landing::LandingChoice;
