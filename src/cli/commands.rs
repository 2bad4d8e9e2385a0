use std::path::PathBuf;

use careline::api::Role;
use careline::config::ApiKeyProvider;
use clap::{Parser, Subcommand};

/// `careline` - live doctor/patient translation chat in the terminal.
#[derive(Parser, Debug)]
#[command(name = "careline")]
#[command(version)]
#[command(about = "Live translated chat between a doctor and a patient.", long_about = None)]
pub struct Cli {
    /// Log at debug level (overrides `[observability] log_level`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pick languages and a role, then open the chat screen
    Start,

    /// Open the chat screen directly
    Chat {
        /// Which side of the conversation you are (doctor, patient)
        #[arg(short, long)]
        role: Role,

        /// Start a fresh session instead of joining the shared one
        #[arg(long)]
        new: bool,
    },

    /// Send one message into the shared session and exit
    Send {
        #[arg(short, long)]
        role: Role,

        /// Message text
        text: String,
    },

    /// Print the shared session's messages
    History {
        /// Only show messages matching this query
        #[arg(short, long)]
        search: Option<String>,

        /// Whose point of view to print from (doctor, patient)
        #[arg(short, long, default_value = "doctor")]
        role: Role,
    },

    /// Generate and print a visit summary
    Summary {
        /// Also write the summary to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Stream live events for the shared session until Ctrl+C
    Watch,

    /// Upload an audio file as if it had been recorded
    Upload {
        #[arg(short, long)]
        role: Role,

        /// Audio file (webm, wav, ogg, mp3)
        file: PathBuf,
    },

    /// Manage stored languages and API keys
    Prefs {
        #[command(subcommand)]
        prefs_command: PrefsCommands,
    },
}

/// Preference subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PrefsCommands {
    /// Show stored languages and which keys are set
    Show,
    /// Store the language each party speaks
    SetLanguages {
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        patient: String,
    },
    /// Store an API key forwarded to the backend
    SetKey {
        /// Key provider (gemini, openai)
        provider: ApiKeyProvider,
        key: String,
    },
    /// Remove a stored API key
    ClearKey { provider: ApiKeyProvider },
}
