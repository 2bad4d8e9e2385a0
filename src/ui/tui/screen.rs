use super::widgets::{Spinner, TextInput};
use crate::config::{ApiKeyProvider, Preferences};

/// Which part of the chat screen receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Composer,
    Search,
    Messages,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Self::Composer => Self::Search,
            Self::Search => Self::Messages,
            Self::Messages => Self::Composer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    GeminiKey,
    OpenAiKey,
    ClearChat,
}

impl SettingsField {
    pub fn next(self) -> Self {
        match self {
            Self::GeminiKey => Self::OpenAiKey,
            Self::OpenAiKey => Self::ClearChat,
            Self::ClearChat => Self::GeminiKey,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::GeminiKey => Self::ClearChat,
            Self::OpenAiKey => Self::GeminiKey,
            Self::ClearChat => Self::OpenAiKey,
        }
    }

    pub fn provider(self) -> Option<ApiKeyProvider> {
        match self {
            Self::GeminiKey => Some(ApiKeyProvider::Gemini),
            Self::OpenAiKey => Some(ApiKeyProvider::OpenAi),
            Self::ClearChat => None,
        }
    }
}

/// Settings overlay: masked key fields seeded from stored preferences.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub field: SettingsField,
    pub gemini: TextInput,
    pub openai: TextInput,
}

impl SettingsForm {
    pub fn load(preferences: &Preferences) -> Self {
        let keys = preferences.api_keys();
        Self {
            field: SettingsField::GeminiKey,
            gemini: TextInput::new(keys.gemini.as_deref().unwrap_or_default()).masked(),
            openai: TextInput::new(keys.openai.as_deref().unwrap_or_default()).masked(),
        }
    }

    pub fn input_mut(&mut self, provider: ApiKeyProvider) -> &mut TextInput {
        match provider {
            ApiKeyProvider::Gemini => &mut self.gemini,
            ApiKeyProvider::OpenAi => &mut self.openai,
        }
    }
}

/// Presentation-only state of the chat screen; the conversation itself lives
/// in the controller.
#[derive(Debug)]
pub struct ChatScreen {
    pub focus: Focus,
    pub search: TextInput,
    /// Highlighted message while the list has focus.
    pub cursor: Option<usize>,
    pub settings: Option<SettingsForm>,
    pub spinner: Spinner,
    /// First visible row of the summary overlay.
    pub summary_scroll: u16,
    /// One-line feedback in the footer, e.g. where a summary was saved.
    pub status: Option<String>,
    pub should_quit: bool,
}

impl ChatScreen {
    pub fn new() -> Self {
        Self {
            focus: Focus::Composer,
            search: TextInput::default(),
            cursor: None,
            settings: None,
            spinner: Spinner::new(),
            summary_scroll: 0,
            status: None,
            should_quit: false,
        }
    }

    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = None;
            return;
        }
        let current = self.cursor.unwrap_or(len - 1).min(len - 1);
        self.cursor = Some(current.saturating_add_signed(delta).min(len - 1));
    }
}
