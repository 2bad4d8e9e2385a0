use console::style;
use std::fmt::Display;

use crate::api::Role;

/// Green bold: confirmations after a one-shot command
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// White bold: section headers
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim: timestamps, secondary text
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Yellow: warnings, pending translations
pub fn warn<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

/// Green: stored values, paths, ids
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan underlined: audio links
pub fn url<D: Display>(text: D) -> String {
    style(text).cyan().underlined().to_string()
}

/// Author label in the colour the chat screen uses for that role.
pub fn role<D: Display>(role: Role, text: D) -> String {
    match role {
        Role::Doctor => style(text).blue().bold().to_string(),
        Role::Patient => style(text).green().bold().to_string(),
    }
}

pub fn connection(online: bool) -> String {
    if online {
        success("Connected")
    } else {
        style("Disconnected").red().bold().to_string()
    }
}
