use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use super::super::theme;
use super::wrap_indented;
use crate::api::{BackendClient, Message, Role};
use crate::chat::ChatState;

/// Author shown above a message, as seen by `viewer`.
pub fn author_label(message: &Message, viewer: Role) -> &'static str {
    if message.role == viewer {
        "You"
    } else {
        message.role.label()
    }
}

/// Conversation, oldest first, kept scrolled to the newest message unless a
/// message is highlighted.
pub struct MessageList<'a> {
    pub state: &'a ChatState,
    pub client: &'a BackendClient,
    pub cursor: Option<usize>,
}

impl MessageList<'_> {
    fn message_lines(&self, idx: usize, message: &Message, width: usize) -> Vec<Line<'static>> {
        let viewer = self.state.role();
        let mut lines = Vec::new();

        let header_style = if self.cursor == Some(idx) {
            theme::author_style(message.role).patch(theme::highlight_style())
        } else {
            theme::author_style(message.role)
        };
        lines.push(Line::from(vec![
            Span::styled(author_label(message, viewer).to_string(), header_style),
            Span::styled(
                format!("  {}", message.local_time().format("%H:%M")),
                theme::dim_style(),
            ),
        ]));

        let push_wrapped = |lines: &mut Vec<Line<'static>>, text: &str, style: Style| {
            for row in wrap_indented(text, width, "  ") {
                lines.push(Line::from(Span::styled(row, style)));
            }
        };

        push_wrapped(&mut lines, message.display_text(viewer), theme::text_style());

        if self.state.showing_original(message.id)
            && let Some(alternate) = message.alternate_text(viewer)
        {
            let label = if message.role == viewer {
                "Translation"
            } else {
                "Original"
            };
            push_wrapped(&mut lines, &format!("{label}: {alternate}"), theme::alternate_style());
        }

        if let Some(audio) = message.audio_url.as_deref().filter(|u| !u.is_empty()) {
            push_wrapped(
                &mut lines,
                &format!("♪ {}", self.client.resolve(audio)),
                theme::link_style(),
            );
        }

        lines.push(Line::default());
        lines
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Narrower than a message header.
        if area.height == 0 || area.width < 16 {
            return;
        }
        let messages = self.state.messages();
        if messages.is_empty() {
            let text = if self.state.search().is_empty() {
                "  No messages yet. Say hello!".to_string()
            } else {
                format!("  No messages match \"{}\"", self.state.search())
            };
            Line::from(Span::styled(text, theme::dim_style())).render(area, buf);
            return;
        }

        let width = usize::from(area.width);
        let mut lines = Vec::new();
        let mut focus_end = None;
        for (idx, message) in messages.iter().enumerate() {
            lines.extend(self.message_lines(idx, message, width));
            if self.cursor == Some(idx) {
                focus_end = Some(lines.len());
            }
        }

        // Rows are pre-wrapped to the area width, so one line is one row.
        let height = usize::from(area.height);
        let end = focus_end.unwrap_or(lines.len());
        let start = u16::try_from(end.saturating_sub(height)).unwrap_or(u16::MAX);
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((start, 0))
            .render(area, buf);
    }
}
