use crossterm::event::KeyCode;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::theme;
use super::widgets::{SelectList, SelectListWidget};
use crate::api::Role;
use crate::config::LanguagePair;
use crate::config::preferences::SUPPORTED_LANGUAGES;

/// What the landing screen hands to the chat screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingChoice {
    pub role: Role,
    pub languages: LanguagePair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Doctor,
    Patient,
    Role,
}

impl Column {
    fn next(self) -> Self {
        match self {
            Self::Doctor => Self::Patient,
            Self::Patient => Self::Role,
            Self::Role => Self::Doctor,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Doctor => Self::Role,
            Self::Patient => Self::Doctor,
            Self::Role => Self::Patient,
        }
    }
}

pub struct LandingState {
    column: Column,
    doctor_lang: SelectList,
    patient_lang: SelectList,
    role: SelectList,
    pub choice: Option<LandingChoice>,
    pub should_quit: bool,
}

impl LandingState {
    pub fn new(stored: &LanguagePair) -> Self {
        Self {
            column: Column::Doctor,
            doctor_lang: SelectList::new(SUPPORTED_LANGUAGES.iter().copied())
                .with_selected(&stored.doctor),
            patient_lang: SelectList::new(SUPPORTED_LANGUAGES.iter().copied())
                .with_selected(&stored.patient),
            role: SelectList::new([
                ("doctor", "I am a Doctor"),
                ("patient", "I am a Patient"),
            ]),
            choice: None,
            should_quit: false,
        }
    }

    fn focused_list(&mut self) -> &mut SelectList {
        match self.column {
            Column::Doctor => &mut self.doctor_lang,
            Column::Patient => &mut self.patient_lang,
            Column::Role => &mut self.role,
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Tab | KeyCode::Right => self.column = self.column.next(),
            KeyCode::BackTab | KeyCode::Left => self.column = self.column.prev(),
            KeyCode::Up => self.focused_list().up(),
            KeyCode::Down => self.focused_list().down(),
            KeyCode::Enter => {
                if self.column == Column::Role {
                    self.choice = self.current_choice();
                } else {
                    self.column = self.column.next();
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn current_choice(&self) -> Option<LandingChoice> {
        let role = self.role.selected_value()?.parse().ok()?;
        Some(LandingChoice {
            role,
            languages: LanguagePair {
                doctor: self.doctor_lang.selected_value()?.to_string(),
                patient: self.patient_lang.selected_value()?.to_string(),
            },
        })
    }
}

pub struct LandingView<'a> {
    pub state: &'a LandingState,
}

impl Widget for LandingView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);

        Line::from(Span::styled("  Healthcare Translator", theme::title_style()))
            .render(rows[0], buf);
        Line::from(Span::styled(
            "  Breaking language barriers in medical care",
            theme::dim_style(),
        ))
        .render(Rect::new(rows[0].x, rows[0].y + 1, rows[0].width, 1), buf);

        Line::from(Span::styled("  Configure languages, then pick your role", theme::heading_style()))
            .render(rows[1], buf);

        let columns = Layout::horizontal([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(rows[2]);

        let state = self.state;
        render_column(
            columns[0],
            buf,
            "Doctor's Language",
            &state.doctor_lang,
            state.column == Column::Doctor,
        );
        render_column(
            columns[1],
            buf,
            "Patient's Language",
            &state.patient_lang,
            state.column == Column::Patient,
        );
        render_column(columns[2], buf, "Role", &state.role, state.column == Column::Role);

        Line::from(Span::styled(
            "  ←→/Tab Column  ↑↓ Choose  Enter Continue  q Quit",
            theme::keybinding_style(),
        ))
        .render(rows[3], buf);
    }
}

fn render_column(area: Rect, buf: &mut Buffer, title: &str, list: &SelectList, focused: bool) {
    if area.height < 3 {
        return;
    }
    let title_style = if focused {
        theme::selected_style()
    } else {
        theme::heading_style()
    };
    Line::from(Span::styled(format!("  {title}"), title_style))
        .render(Rect::new(area.x, area.y, area.width, 1), buf);

    let inner = Rect::new(
        area.x + 2,
        area.y + 2,
        area.width.saturating_sub(2),
        area.height - 2,
    );
    SelectListWidget::new(list, focused).render(inner, buf);
}
