use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use super::super::theme;
use super::wrap;

/// Centered box of at most `width` x `height`, clamped to `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Clear `area`, draw a titled border and return the inner region.
pub fn frame(area: Rect, buf: &mut Buffer, title: &str) -> Rect {
    Clear.render(area, buf);
    let block = Block::bordered().title(Span::styled(format!(" {title} "), theme::title_style()));
    let inner = block.inner(area);
    block.render(area, buf);
    inner
}

/// Blocking alert, dismissed with Enter.
pub struct NoticeBox<'a> {
    pub text: &'a str,
}

impl Widget for NoticeBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let outer = centered(area, 50, 6);
        let inner = frame(outer, buf, "Notice");
        if inner.height < 2 {
            return;
        }
        let lines: Vec<Line<'static>> = wrap(self.text, usize::from(inner.width))
            .into_iter()
            .map(|row| Line::from(Span::styled(row, theme::error_style())))
            .collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(Rect::new(inner.x, inner.y, inner.width, inner.height - 1), buf);
        Line::from(Span::styled("Enter OK", theme::keybinding_style())).render(
            Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1),
            buf,
        );
    }
}
