use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `careline`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide how a feature degrades; application glue continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum CarelineError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Preferences ─────────────────────────────────────────────────────
    #[error("preferences: {0}")]
    Preferences(#[from] PreferencesError),

    // ── Backend HTTP ────────────────────────────────────────────────────
    #[error("api: {0}")]
    Api(#[from] ApiError),

    // ── Live update channel ─────────────────────────────────────────────
    #[error("live: {0}")]
    Live(#[from] LiveError),

    // ── Audio capture ───────────────────────────────────────────────────
    #[error("audio: {0}")]
    Audio(#[from] AudioError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Preference store errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("store lock poisoned")]
    Poisoned,
}

// ─── Backend HTTP errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("{endpoint} response could not be decoded: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// True when the backend was never reached (connection refused, timeout).
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

// ─── Live channel errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("connect {url}: {message}")]
    Connect { url: String, message: String },

    #[error("socket: {0}")]
    Socket(String),

    #[error("malformed event: {0}")]
    Malformed(String),
}

// ─── Audio errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("microphone unavailable: {0}")]
    Unavailable(String),

    #[error("microphone access denied: {0}")]
    Denied(String),

    #[error("recording failed: {0}")]
    Recording(String),

    #[error("recording produced no audio")]
    Empty,
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, CarelineError>;
