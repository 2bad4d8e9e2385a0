use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures_util::StreamExt;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::Widget;

use super::handlers::{self, Action};
use super::landing::{LandingChoice, LandingState, LandingView};
use super::render;
use super::screen::ChatScreen;
use crate::chat::ChatController;
use crate::config::LanguagePair;

const TICK: Duration = Duration::from_millis(80);

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Raw mode plus alternate screen for as long as it lives.
struct TerminalGuard {
    terminal: Term,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = crossterm::execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Key presses only; releases, repeats, resizes and mouse input are dropped.
fn key_press(event: Event) -> Option<KeyEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(key),
        _ => None,
    }
}

/// Landing screen: pick languages and a role. `None` when the user quits.
pub async fn run_landing(stored: &LanguagePair) -> Result<Option<LandingChoice>> {
    let mut guard = TerminalGuard::enter()?;
    let mut state = LandingState::new(stored);
    let mut events = EventStream::new();

    loop {
        guard.terminal.draw(|frame| {
            let area = frame.area();
            LandingView { state: &state }.render(area, frame.buffer_mut());
        })?;

        if state.should_quit {
            return Ok(None);
        }
        if let Some(choice) = state.choice.take() {
            return Ok(Some(choice));
        }

        match events.next().await {
            Some(Ok(event)) => {
                if let Some(key) = key_press(event) {
                    state.handle_key(key.code);
                }
            }
            Some(Err(e)) => return Err(e.into()),
            None => return Ok(None),
        }
    }
}

/// Chat screen for an initialized controller. Returns when the user leaves;
/// the live channel is closed on the way out.
pub async fn run_chat(mut ctrl: ChatController, summaries_dir: &Path) -> Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let mut screen = ChatScreen::new();
    ctrl.init();

    let result = chat_loop(&mut guard.terminal, &mut ctrl, &mut screen, summaries_dir).await;
    drop(guard);
    ctrl.shutdown().await;
    result
}

async fn chat_loop(
    terminal: &mut Term,
    ctrl: &mut ChatController,
    screen: &mut ChatScreen,
    summaries_dir: &Path,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ctrl.drain();
        terminal.draw(|frame| {
            let area = frame.area();
            render::draw_chat(area, frame.buffer_mut(), ctrl, screen);
        })?;

        if screen.should_quit {
            return Ok(());
        }

        // completions queue up between ticks and are drained above
        let key = tokio::select! {
            _ = tick.tick() => continue,
            event = events.next() => match event {
                Some(Ok(event)) => match key_press(event) {
                    Some(key) => key,
                    None => continue,
                },
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        };

        screen.status = None;
        if handlers::handle_key(ctrl, screen, key) == Action::SaveSummary {
            screen.status = Some(match ctrl.save_summary(summaries_dir).await {
                Ok(path) => format!("Summary saved to {}", path.display()),
                Err(e) => format!("Could not save summary: {e:#}"),
            });
        }
    }
}
