use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::super::theme;

/// A fixed set of `(value, label)` choices with one selected entry.
#[derive(Debug, Clone)]
pub struct SelectList {
    items: Vec<(String, String)>,
    selected: usize,
}

impl SelectList {
    pub fn new<I, V, L>(items: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        Self {
            items: items
                .into_iter()
                .map(|(v, l)| (v.into(), l.into()))
                .collect(),
            selected: 0,
        }
    }

    /// Preselect the entry whose value is `value`, if present.
    pub fn with_selected(mut self, value: &str) -> Self {
        if let Some(idx) = self.items.iter().position(|(v, _)| v == value) {
            self.selected = idx;
        }
        self
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.items.get(self.selected).map(|(v, _)| v.as_str())
    }
}

/// Vertical list with a `>` marker on the selected row.
pub struct SelectListWidget<'a> {
    list: &'a SelectList,
    focused: bool,
}

impl<'a> SelectListWidget<'a> {
    pub fn new(list: &'a SelectList, focused: bool) -> Self {
        Self { list, focused }
    }
}

impl Widget for SelectListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = usize::from(area.height);
        if rows == 0 || area.width < 6 {
            return;
        }

        let start = (self.list.selected + 1).saturating_sub(rows);
        for (row, (idx, (_, label))) in self
            .list
            .items
            .iter()
            .enumerate()
            .skip(start)
            .take(rows)
            .enumerate()
        {
            let selected = idx == self.list.selected;
            let style = match (selected, self.focused) {
                (true, true) => theme::selected_style(),
                (true, false) => theme::text_style(),
                _ => theme::dim_style(),
            };
            let marker = if selected { "> " } else { "  " };

            #[allow(clippy::cast_possible_truncation)]
            let y = area.y + row as u16;
            Line::from(vec![Span::styled(marker, style), Span::styled(label.as_str(), style)])
                .render(Rect::new(area.x, y, area.width, 1), buf);
        }
    }
}
