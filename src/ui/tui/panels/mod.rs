//! One widget per region of the chat screen. Each is a pure function of
//! [`ChatState`](crate::chat::ChatState) and the screen's presentation state.

pub mod header;
pub mod input_bar;
pub mod messages;
pub mod overlay;
pub mod settings;
pub mod summary;

pub use header::HeaderPanel;
pub use input_bar::InputBar;
pub use messages::MessageList;
pub use settings::SettingsPanel;
pub use summary::SummaryPanelView;

use std::borrow::Cow;

/// Wrap `text` to `width` terminal columns. Wide glyphs count as two columns
/// and blank lines are kept.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    wrap_indented(text, width, "")
}

/// Like [`wrap`], with every row starting with `indent`.
pub(crate) fn wrap_indented(text: &str, width: usize, indent: &str) -> Vec<String> {
    let options = textwrap::Options::new(width.max(indent.len() + 1))
        .initial_indent(indent)
        .subsequent_indent(indent)
        .break_words(true);
    textwrap::wrap(text, options)
        .into_iter()
        .map(Cow::into_owned)
        .collect()
}
