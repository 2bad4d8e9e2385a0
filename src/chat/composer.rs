/// Outbound draft plus the single-flight send protocol.
///
/// [`Composer::begin_send`] clears the draft immediately and hands back the
/// captured text; [`Composer::finish_send`] releases the in-flight flag and,
/// on failure, puts the captured text back.
#[derive(Debug, Default)]
pub struct Composer {
    draft: String,
    sending: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn insert_char(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn delete_char(&mut self) {
        self.draft.pop();
    }

    /// Capture and clear the draft. `None` when there is nothing to send or a
    /// send is already in flight; the draft is left untouched in that case.
    pub fn begin_send(&mut self) -> Option<String> {
        if self.sending || self.draft.trim().is_empty() {
            return None;
        }
        self.sending = true;
        Some(std::mem::take(&mut self.draft))
    }

    pub fn finish_send(&mut self, captured: String, succeeded: bool) {
        self.sending = false;
        if !succeeded {
            self.draft = captured;
        }
    }
}
