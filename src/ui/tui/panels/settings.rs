use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::super::screen::{SettingsField, SettingsForm};
use super::super::theme;
use super::super::widgets::TextInputWidget;
use super::header::connection_label;
use super::overlay::{centered, frame};
use crate::chat::ChatState;
use crate::config::preferences::language_name;

/// API keys, the clear-chat action and connection details.
pub struct SettingsPanel<'a> {
    pub state: &'a ChatState,
    pub form: &'a SettingsForm,
}

impl Widget for SettingsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = frame(centered(area, 64, 18), buf, "Settings");
        if inner.height < 13 {
            return;
        }
        let row = |offset: u16| Rect::new(inner.x, inner.y + offset, inner.width, 1);
        let field = self.form.field;

        Line::from(Span::styled("API Keys", theme::heading_style())).render(row(0), buf);
        TextInputWidget::new(&self.form.gemini, "Gemini", field == SettingsField::GeminiKey)
            .placeholder("not set")
            .render(row(1), buf);
        TextInputWidget::new(&self.form.openai, "OpenAI", field == SettingsField::OpenAiKey)
            .placeholder("not set")
            .render(row(2), buf);
        Line::from(Span::styled(
            "Keys are stored locally and sent with each request.",
            theme::dim_style(),
        ))
        .render(row(3), buf);

        let clear_style = if field == SettingsField::ClearChat {
            theme::error_style().patch(theme::highlight_style())
        } else {
            theme::warning_style()
        };
        Line::from(Span::styled("[ Clear Chat ]", clear_style)).render(row(5), buf);
        Line::from(Span::styled(
            "Starts a new session; the current messages are no longer shown.",
            theme::dim_style(),
        ))
        .render(row(6), buf);

        Line::from(Span::styled("Connection", theme::heading_style())).render(row(8), buf);
        let online = self.state.is_online();
        Line::from(vec![
            Span::styled("Status: ", theme::dim_style()),
            Span::styled(connection_label(online), theme::status_style(online)),
        ])
        .render(row(9), buf);

        let (session_id, languages) = self.state.session().map_or_else(
            || ("-".to_string(), "-".to_string()),
            |s| {
                (
                    s.id.clone(),
                    format!(
                        "Doctor {} / Patient {}",
                        language_name(&s.doctor_lang),
                        language_name(&s.patient_lang)
                    ),
                )
            },
        );
        Line::from(vec![
            Span::styled("Session: ", theme::dim_style()),
            Span::styled(session_id, theme::text_style()),
        ])
        .render(row(10), buf);
        Line::from(vec![
            Span::styled("Languages: ", theme::dim_style()),
            Span::styled(languages, theme::text_style()),
        ])
        .render(row(11), buf);
        Line::from(vec![
            Span::styled("Role: ", theme::dim_style()),
            Span::styled(self.state.role().label(), theme::author_style(self.state.role())),
        ])
        .render(row(12), buf);

        if inner.height > 13 {
            Line::from(Span::styled("Tab Next  Enter Select  Esc Close", theme::keybinding_style()))
                .render(row(inner.height - 1), buf);
        }
    }
}
