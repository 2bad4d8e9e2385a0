use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::panels::summary::PAGE;
use super::screen::{ChatScreen, Focus, SettingsField, SettingsForm};
use crate::chat::ChatController;

/// Work the event loop must finish after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    SaveSummary,
}

pub fn handle_key(ctrl: &mut ChatController, screen: &mut ChatScreen, key: KeyEvent) -> Action {
    let ctrl_held = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl_held && key.code == KeyCode::Char('c') {
        screen.should_quit = true;
        return Action::None;
    }

    if ctrl.state().notice().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            ctrl.state_mut().dismiss_notice();
        }
        return Action::None;
    }

    if ctrl.state().session().is_none() {
        match key.code {
            KeyCode::Esc => screen.should_quit = true,
            KeyCode::Char('r') if !ctrl.state().is_online() => ctrl.init(),
            _ => {}
        }
        return Action::None;
    }

    if screen.settings.is_some() {
        handle_settings_key(ctrl, screen, key.code);
        return Action::None;
    }

    if ctrl.state().summary().open {
        return handle_summary_key(ctrl, screen, key.code);
    }

    if ctrl_held {
        match key.code {
            KeyCode::Char('r') => {
                if ctrl.state().is_recording() {
                    ctrl.stop_recording();
                } else {
                    ctrl.start_recording();
                }
            }
            KeyCode::Char('t') => {
                screen.summary_scroll = 0;
                ctrl.open_summary();
            }
            KeyCode::Char('p') => {
                screen.settings = Some(SettingsForm::load(ctrl.client().preferences()));
            }
            _ => {}
        }
        return Action::None;
    }

    match key.code {
        KeyCode::Esc => screen.should_quit = true,
        KeyCode::Tab => {
            screen.focus = screen.focus.next();
            screen.cursor = None;
        }
        code => match screen.focus {
            Focus::Composer => handle_composer_key(ctrl, code),
            Focus::Search => handle_search_key(ctrl, screen, code),
            Focus::Messages => handle_messages_key(ctrl, screen, code),
        },
    }
    Action::None
}

fn handle_composer_key(ctrl: &mut ChatController, code: KeyCode) {
    match code {
        KeyCode::Enter => {
            ctrl.send();
        }
        KeyCode::Char(c) => ctrl.state_mut().composer_mut().insert_char(c),
        KeyCode::Backspace => ctrl.state_mut().composer_mut().delete_char(),
        _ => {}
    }
}

fn handle_search_key(ctrl: &mut ChatController, screen: &mut ChatScreen, code: KeyCode) {
    match code {
        KeyCode::Char(c) => screen.search.insert(c),
        KeyCode::Backspace => screen.search.backspace(),
        KeyCode::Delete => screen.search.delete(),
        KeyCode::Left => screen.search.move_left(),
        KeyCode::Right => screen.search.move_right(),
        KeyCode::Home => screen.search.home(),
        KeyCode::End => screen.search.end(),
        KeyCode::Enter => screen.focus = Focus::Messages,
        _ => return,
    }
    ctrl.set_search(screen.search.value());
}

fn handle_messages_key(ctrl: &mut ChatController, screen: &mut ChatScreen, code: KeyCode) {
    let len = ctrl.state().messages().len();
    match code {
        KeyCode::Up => screen.move_cursor(-1, len),
        KeyCode::Down => screen.move_cursor(1, len),
        KeyCode::PageUp => screen.move_cursor(-10, len),
        KeyCode::PageDown => screen.move_cursor(10, len),
        KeyCode::Enter | KeyCode::Char(' ') => {
            let id = screen
                .cursor
                .and_then(|idx| ctrl.state().messages().get(idx))
                .map(|m| m.id);
            if let Some(id) = id {
                ctrl.state_mut().toggle_original(id);
            }
        }
        _ => {}
    }
}

/// Scroll offsets past the end are clamped when the overlay is drawn.
fn handle_summary_key(ctrl: &mut ChatController, screen: &mut ChatScreen, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => ctrl.close_summary(),
        KeyCode::Char('s') => return Action::SaveSummary,
        KeyCode::Up => screen.summary_scroll = screen.summary_scroll.saturating_sub(1),
        KeyCode::Down => screen.summary_scroll = screen.summary_scroll.saturating_add(1),
        KeyCode::PageUp => screen.summary_scroll = screen.summary_scroll.saturating_sub(PAGE),
        KeyCode::PageDown => screen.summary_scroll = screen.summary_scroll.saturating_add(PAGE),
        KeyCode::Home => screen.summary_scroll = 0,
        _ => {}
    }
    Action::None
}

fn handle_settings_key(ctrl: &mut ChatController, screen: &mut ChatScreen, code: KeyCode) {
    let Some(form) = screen.settings.as_mut() else {
        return;
    };
    match code {
        KeyCode::Esc => {
            screen.settings = None;
            return;
        }
        KeyCode::Tab | KeyCode::Down => {
            form.field = form.field.next();
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.field = form.field.prev();
            return;
        }
        KeyCode::Enter if form.field == SettingsField::ClearChat => {
            ctrl.clear_chat();
            screen.settings = None;
            return;
        }
        _ => {}
    }

    let Some(provider) = form.field.provider() else {
        return;
    };
    let input = form.input_mut(provider);
    match code {
        KeyCode::Char(c) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        _ => return,
    }

    let key = input.value().trim().to_string();
    let preferences = ctrl.client().preferences();
    let saved = if key.is_empty() {
        preferences.clear_api_key(provider)
    } else {
        preferences.set_api_key(provider, &key)
    };
    if let Err(e) = saved {
        tracing::warn!("failed to store {provider} key: {e}");
        screen.status = Some(format!("Could not save {provider} key"));
    }
}
