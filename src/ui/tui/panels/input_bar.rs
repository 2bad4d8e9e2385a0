use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::super::screen::{ChatScreen, Focus};
use super::super::theme;
use super::super::widgets::SpinnerWidget;
use crate::chat::ChatState;

/// Composer line, recording indicator and key hints.
pub struct InputBar<'a> {
    pub state: &'a ChatState,
    pub screen: &'a ChatScreen,
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 {
            return;
        }
        let composer = self.state.composer();
        let focused = self.screen.focus == Focus::Composer;
        let line_area = Rect::new(area.x, area.y, area.width, 1);

        if composer.is_sending() {
            SpinnerWidget::new(&self.screen.spinner, "Sending...").render(line_area, buf);
        } else {
            let mut spans = Vec::with_capacity(4);
            if self.state.is_recording() {
                spans.push(Span::styled(" ● REC ", theme::recording_style()));
                spans.push(Span::raw(" "));
            }
            let label_style = if focused {
                theme::selected_style()
            } else {
                theme::dim_style()
            };
            spans.push(Span::styled("> ", label_style));
            if composer.draft().is_empty() && !focused {
                spans.push(Span::styled("Type a message...", theme::dim_style()));
            } else {
                spans.push(Span::styled(composer.draft(), theme::text_style()));
            }
            if focused {
                spans.push(Span::styled(" ", theme::cursor_style()));
            }
            Line::from(spans).render(line_area, buf);
        }

        let hints = self.screen.status.clone().unwrap_or_else(|| {
            let record = if self.state.is_recording() {
                "^R Stop"
            } else {
                "^R Record"
            };
            format!("Enter Send  Tab Focus  {record}  ^T Summary  ^P Settings  Esc Leave")
        });
        Line::from(Span::styled(hints, theme::keybinding_style()))
            .render(Rect::new(area.x, area.y + 1, area.width, 1), buf);
    }
}
