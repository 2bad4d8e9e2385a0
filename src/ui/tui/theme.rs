use ratatui::style::{Color, Modifier, Style};

use crate::api::Role;

pub const DOCTOR: Color = Color::Blue;
pub const PATIENT: Color = Color::Green;
pub const ONLINE: Color = Color::Green;
pub const OFFLINE: Color = Color::Red;
pub const WARNING: Color = Color::Yellow;
pub const DIM: Color = Color::DarkGray;
pub const TEXT: Color = Color::White;

pub fn role_color(role: Role) -> Color {
    match role {
        Role::Doctor => DOCTOR,
        Role::Patient => PATIENT,
    }
}

pub fn banner_style(role: Role) -> Style {
    Style::default()
        .fg(Color::White)
        .bg(role_color(role))
        .add_modifier(Modifier::BOLD)
}

pub fn author_style(role: Role) -> Style {
    Style::default()
        .fg(role_color(role))
        .add_modifier(Modifier::BOLD)
}

pub fn title_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub fn heading_style() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub fn highlight_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED)
}

pub fn status_style(online: bool) -> Style {
    Style::default().fg(if online { ONLINE } else { OFFLINE })
}

pub fn warning_style() -> Style {
    Style::default().fg(WARNING)
}

pub fn error_style() -> Style {
    Style::default().fg(OFFLINE).add_modifier(Modifier::BOLD)
}

pub fn dim_style() -> Style {
    Style::default().fg(DIM)
}

pub fn text_style() -> Style {
    Style::default().fg(TEXT)
}

pub fn alternate_style() -> Style {
    Style::default().fg(DIM).add_modifier(Modifier::ITALIC)
}

pub fn link_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED)
}

pub fn cursor_style() -> Style {
    Style::default().fg(Color::Black).bg(TEXT)
}

pub fn recording_style() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(OFFLINE)
        .add_modifier(Modifier::BOLD)
}

pub fn keybinding_style() -> Style {
    Style::default().fg(DIM)
}
