use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::panels::overlay::{NoticeBox, centered};
use super::panels::summary;
use super::panels::{HeaderPanel, InputBar, MessageList, SettingsPanel, SummaryPanelView};
use super::screen::{ChatScreen, Focus};
use super::theme;
use super::widgets::SpinnerWidget;
use crate::chat::ChatController;

pub(super) fn draw_chat(
    area: Rect,
    buf: &mut Buffer,
    ctrl: &ChatController,
    screen: &mut ChatScreen,
) {
    let state = ctrl.state();
    screen.summary_scroll = screen
        .summary_scroll
        .min(summary::max_scroll(state.summary(), area));
    let screen = &*screen;
    if state.session().is_none() {
        draw_loading(area, buf, state.is_online(), screen);
        return;
    }

    let vertical = Layout::vertical([
        Constraint::Length(2), // Header + search
        Constraint::Length(1), // Separator
        Constraint::Min(3),    // Messages
        Constraint::Length(2), // Composer + hints
    ])
    .split(area);

    HeaderPanel { state, screen }.render(vertical[0], buf);
    Line::from(Span::styled(
        "─".repeat(usize::from(area.width)),
        theme::dim_style(),
    ))
    .render(vertical[1], buf);
    MessageList {
        state,
        client: ctrl.client(),
        cursor: if screen.focus == Focus::Messages {
            screen.cursor
        } else {
            None
        },
    }
    .render(vertical[2], buf);
    InputBar { state, screen }.render(vertical[3], buf);

    if let Some(form) = &screen.settings {
        SettingsPanel { state, form }.render(area, buf);
    } else if state.summary().open {
        SummaryPanelView {
            panel: state.summary(),
            spinner: &screen.spinner,
            scroll: screen.summary_scroll,
        }
        .render(area, buf);
    }

    if let Some(text) = state.notice() {
        NoticeBox { text }.render(area, buf);
    }
}

fn draw_loading(area: Rect, buf: &mut Buffer, online: bool, screen: &ChatScreen) {
    let center = centered(area, 48, 3);
    SpinnerWidget::new(&screen.spinner, "Initializing session...")
        .style(theme::text_style())
        .render(Rect::new(center.x, center.y, center.width, 1), buf);
    let hint = if online {
        "Esc Quit"
    } else {
        "Could not reach the backend.  r Retry  Esc Quit"
    };
    Line::from(Span::styled(hint, theme::keybinding_style()))
        .render(Rect::new(center.x, center.y + 2, center.width, 1), buf);
}
