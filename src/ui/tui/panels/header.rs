use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::super::screen::{ChatScreen, Focus};
use super::super::theme;
use super::super::widgets::TextInputWidget;
use crate::chat::ChatState;

/// Role banner with connection status and session id, then the search field.
pub struct HeaderPanel<'a> {
    pub state: &'a ChatState,
    pub screen: &'a ChatScreen,
}

pub fn connection_label(online: bool) -> &'static str {
    if online { "Connected" } else { "Disconnected" }
}

fn short_id(id: &str) -> String {
    let short: String = id.chars().take(8).collect();
    if short.len() < id.len() {
        format!("{short}...")
    } else {
        short
    }
}

impl Widget for HeaderPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 {
            return;
        }
        let role = self.state.role();
        let online = self.state.is_online();

        buf.set_style(Rect::new(area.x, area.y, area.width, 1), theme::banner_style(role));
        let mut spans = vec![
            Span::styled(format!(" {} ", role.label()), theme::banner_style(role)),
            Span::styled(format!(" ● {} ", connection_label(online)), theme::banner_style(role)),
        ];
        if let Some(session) = self.state.session() {
            spans.push(Span::styled(
                format!(" • Session: {}", short_id(&session.id)),
                theme::banner_style(role),
            ));
        }
        if self.state.is_replacing() {
            spans.push(Span::styled("  starting new session…", theme::banner_style(role)));
        }
        Line::from(spans).render(Rect::new(area.x, area.y, area.width, 1), buf);

        let search_area = Rect::new(area.x + 1, area.y + 1, area.width.saturating_sub(1), 1);
        TextInputWidget::new(&self.screen.search, "Search", self.screen.focus == Focus::Search)
            .placeholder("Search...")
            .render(search_area, buf);

        if !online {
            let hint = " offline ";
            #[allow(clippy::cast_possible_truncation)]
            let width = hint.len() as u16;
            if area.width > width + 20 {
                Line::from(Span::styled(hint, theme::error_style())).render(
                    Rect::new(area.x + area.width - width, area.y + 1, width, 1),
                    buf,
                );
            }
        }
    }
}
