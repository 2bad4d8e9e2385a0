use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::super::theme;

/// Single-line editable field. `cursor` is a byte offset on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
    masked: bool,
}

impl TextInput {
    pub fn new(initial: &str) -> Self {
        Self {
            value: initial.to_string(),
            cursor: initial.len(),
            masked: false,
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn insert(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some((prev, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.value.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            let end = self.cursor + ch.len_utf8();
            self.value.replace_range(self.cursor..end, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some((prev, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Cursor position in chars, which is also its column in `display()`.
    fn cursor_column(&self) -> usize {
        self.value[..self.cursor].chars().count()
    }
}

/// Renders a [`TextInput`] as `label: value` with an inverse-video cursor
/// while focused.
pub struct TextInputWidget<'a> {
    input: &'a TextInput,
    label: &'a str,
    placeholder: &'a str,
    focused: bool,
}

impl<'a> TextInputWidget<'a> {
    pub fn new(input: &'a TextInput, label: &'a str, focused: bool) -> Self {
        Self {
            input,
            label,
            placeholder: "",
            focused,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for TextInputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width < 4 {
            return;
        }

        let label_style = if self.focused {
            theme::selected_style()
        } else {
            theme::dim_style()
        };
        let mut spans = Vec::with_capacity(4);
        if !self.label.is_empty() {
            spans.push(Span::styled(format!("{}: ", self.label), label_style));
        }

        let display = self.input.display();
        if display.is_empty() && !self.focused {
            spans.push(Span::styled(self.placeholder, theme::dim_style()));
        } else if self.focused {
            let column = self.input.cursor_column();
            let before: String = display.chars().take(column).collect();
            let at = display.chars().nth(column).map_or(' ', |c| c);
            let after: String = display.chars().skip(column + 1).collect();
            spans.push(Span::styled(before, theme::text_style()));
            spans.push(Span::styled(at.to_string(), theme::cursor_style()));
            spans.push(Span::styled(after, theme::text_style()));
        } else {
            spans.push(Span::styled(display, theme::text_style()));
        }

        Line::from(spans).render(area, buf);
    }
}
