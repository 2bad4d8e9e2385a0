use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use super::super::theme;
use super::super::widgets::{Spinner, SpinnerWidget};
use super::overlay::{centered, frame};
use super::wrap;
use crate::chat::summary::SummaryPanel;

/// Rows scrolled by PageUp / PageDown.
pub const PAGE: u16 = 10;

pub struct SummaryPanelView<'a> {
    pub panel: &'a SummaryPanel,
    pub spinner: &'a Spinner,
    /// First wrapped row shown.
    pub scroll: u16,
}

fn outer(area: Rect) -> Rect {
    centered(
        area,
        area.width.saturating_sub(8).max(40),
        area.height.saturating_sub(4),
    )
}

/// Text region inside the frame; the last two rows hold a gap and the hints.
fn body(outer: Rect) -> Rect {
    let inner = Block::bordered().inner(outer);
    Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(2))
}

/// Largest useful scroll offset for `panel` drawn over `area`.
pub fn max_scroll(panel: &SummaryPanel, area: Rect) -> u16 {
    if panel.loading || panel.text.is_empty() {
        return 0;
    }
    let body = body(outer(area));
    let rows = wrap(&panel.text, usize::from(body.width)).len();
    u16::try_from(rows.saturating_sub(usize::from(body.height))).unwrap_or(u16::MAX)
}

impl Widget for SummaryPanelView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let max = max_scroll(self.panel, area);
        let outer = outer(area);
        let inner = frame(outer, buf, "Visit Summary");
        if inner.height < 3 {
            return;
        }
        let body = body(outer);

        if self.panel.loading {
            SpinnerWidget::new(self.spinner, "Generating summary...")
                .render(Rect::new(body.x, body.y, body.width, 1), buf);
        } else if self.panel.text.is_empty() {
            Line::from(Span::styled("No summary available.", theme::dim_style()))
                .render(Rect::new(body.x, body.y, body.width, 1), buf);
        } else {
            let style = if self.panel.has_summary() {
                theme::text_style()
            } else {
                theme::error_style()
            };
            let lines: Vec<Line<'static>> = wrap(&self.panel.text, usize::from(body.width))
                .into_iter()
                .map(|row| Line::from(Span::styled(row, style)))
                .collect();
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll.min(max), 0))
                .render(body, buf);
        }

        let hints = match (self.panel.has_summary(), max > 0) {
            (true, true) => "↑↓ Scroll  s Save  Esc Close",
            (true, false) => "s Save  Esc Close",
            (false, _) => "Esc Close",
        };
        Line::from(Span::styled(hints, theme::keybinding_style())).render(
            Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1),
            buf,
        );
    }
}
