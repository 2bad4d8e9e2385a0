use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::super::theme;

const FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];
const FRAME_TIME: Duration = Duration::from_millis(120);

/// Wall-clock driven, so the animation speed does not depend on how often
/// the event loop wakes up.
#[derive(Debug, Clone)]
pub struct Spinner {
    epoch: Instant,
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    pub fn frame(&self) -> &'static str {
        frame_at(self.epoch.elapsed())
    }
}

fn frame_at(elapsed: Duration) -> &'static str {
    let step = elapsed.as_millis() / FRAME_TIME.as_millis();
    let idx = usize::try_from(step % FRAMES.len() as u128).unwrap_or_default();
    FRAMES[idx]
}

pub struct SpinnerWidget<'a> {
    spinner: &'a Spinner,
    label: &'a str,
    style: Style,
}

impl<'a> SpinnerWidget<'a> {
    pub fn new(spinner: &'a Spinner, label: &'a str) -> Self {
        Self {
            spinner,
            label,
            style: theme::dim_style(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Widget for SpinnerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        Line::from(vec![
            Span::styled(self.spinner.frame(), theme::title_style()),
            Span::raw(" "),
            Span::styled(self.label, self.style),
        ])
        .render(area, buf);
    }
}
