use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding config, preferences, logs - computed from home, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub reliability: ReliabilityConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            config_path: PathBuf::new(),
            backend: BackendConfig::default(),
            reliability: ReliabilityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join("preferences.toml")
    }

    pub fn summaries_dir(&self) -> PathBuf {
        self.data_dir.join("summaries")
    }

    pub fn log_path(&self) -> PathBuf {
        self.observability
            .log_file
            .as_ref()
            .map_or_else(|| self.data_dir.join("careline.log"), PathBuf::from)
    }
}

// ── Backend ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Root of the HTTP API, e.g. `http://localhost:8000/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Live update socket, e.g. `ws://localhost:8000/api/ws`
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".into()
}

fn default_ws_url() -> String {
    "ws://localhost:8000/api/ws".into()
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// ── Reliability ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    #[serde(default = "default_live_initial_backoff_ms")]
    pub live_initial_backoff_ms: u64,
    #[serde(default = "default_live_max_backoff_ms")]
    pub live_max_backoff_ms: u64,
}

fn default_live_initial_backoff_ms() -> u64 {
    500
}

fn default_live_max_backoff_ms() -> u64 {
    30_000
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            live_initial_backoff_ms: default_live_initial_backoff_ms(),
            live_max_backoff_ms: default_live_max_backoff_ms(),
        }
    }
}

// ── Observability ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log destination while the full-screen UI owns the terminal.
    #[serde(default)]
    pub log_file: Option<String>,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
        }
    }
}
