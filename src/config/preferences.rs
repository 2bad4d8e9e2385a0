//! Durable key-value preferences shared by the landing screen, the session
//! client and the outbound request layer.
//!
//! Values are plain strings, last-write-wins, never versioned. Every read goes
//! to the backing store so a second client process sees updates immediately.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use strum::{Display, EnumString};

use crate::error::PreferencesError;

pub const GEMINI_API_KEY: &str = "gemini_api_key";
pub const OPENAI_API_KEY: &str = "openai_api_key";
pub const DOCTOR_LANG: &str = "doctorLang";
pub const PATIENT_LANG: &str = "patientLang";

pub const DEFAULT_DOCTOR_LANG: &str = "en";
pub const DEFAULT_PATIENT_LANG: &str = "es";

/// Languages offered on the landing screen, as `(tag, display name)`.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("hi", "Hindi"),
    ("fr", "French"),
    ("zh", "Chinese"),
];

pub fn language_name(tag: &str) -> &str {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(code, _)| *code == tag)
        .map_or(tag, |(_, name)| *name)
}

pub fn is_supported_language(tag: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(code, _)| *code == tag)
}

/// Raw string storage behind [`Preferences`].
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferencesError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError>;

    fn remove(&self, key: &str) -> Result<(), PreferencesError>;
}

/// TOML-file backed store (`~/.careline/preferences.toml`).
pub struct FilePreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferencesError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.read_error(e)),
        };
        toml::from_str(&contents).map_err(|e| self.read_error(e))
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        let body = toml::to_string_pretty(values).map_err(|e| self.write_error(e))?;
        std::fs::write(&self.path, body).map_err(|e| self.write_error(e))
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), PreferencesError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| PreferencesError::Poisoned)?;
        let mut values = self.read_all()?;
        apply(&mut values);
        self.write_all(&values)
    }

    fn read_error(&self, e: impl std::fmt::Display) -> PreferencesError {
        PreferencesError::Read {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }

    fn write_error(&self, e: impl std::fmt::Display) -> PreferencesError {
        PreferencesError::Write {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), PreferencesError> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

/// Process-local store for tests and embedders that should not touch disk.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        let values = self.values.lock().map_err(|_| PreferencesError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        let mut values = self.values.lock().map_err(|_| PreferencesError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferencesError> {
        let mut values = self.values.lock().map_err(|_| PreferencesError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ApiKeyProvider {
    Gemini,
    #[strum(serialize = "openai")]
    OpenAi,
}

impl ApiKeyProvider {
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Gemini => GEMINI_API_KEY,
            Self::OpenAi => OPENAI_API_KEY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub doctor: String,
    pub patient: String,
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            doctor: DEFAULT_DOCTOR_LANG.to_string(),
            patient: DEFAULT_PATIENT_LANG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    pub gemini: Option<String>,
    pub openai: Option<String>,
}

/// Typed view over a [`PreferenceStore`]; the single read/write boundary for
/// language choices and forwarded credentials.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPreferenceStore::new()))
    }

    /// Stored language pair; missing or unreadable entries fall back to en/es.
    pub fn languages(&self) -> LanguagePair {
        let read = |key: &str, fallback: &str| match self.store.get(key) {
            Ok(Some(tag)) if !tag.trim().is_empty() => tag,
            Ok(_) => fallback.to_string(),
            Err(e) => {
                tracing::warn!("preferences: reading {key} failed, using {fallback}: {e}");
                fallback.to_string()
            }
        };
        LanguagePair {
            doctor: read(DOCTOR_LANG, DEFAULT_DOCTOR_LANG),
            patient: read(PATIENT_LANG, DEFAULT_PATIENT_LANG),
        }
    }

    pub fn set_languages(&self, pair: &LanguagePair) -> Result<(), PreferencesError> {
        self.store.set(DOCTOR_LANG, &pair.doctor)?;
        self.store.set(PATIENT_LANG, &pair.patient)
    }

    /// Keys to forward; empty strings count as absent.
    pub fn api_keys(&self) -> ApiKeys {
        ApiKeys {
            gemini: self.api_key(ApiKeyProvider::Gemini),
            openai: self.api_key(ApiKeyProvider::OpenAi),
        }
    }

    pub fn api_key(&self, provider: ApiKeyProvider) -> Option<String> {
        match self.store.get(provider.storage_key()) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!("preferences: reading {provider} key failed: {e}");
                None
            }
        }
    }

    pub fn set_api_key(&self, provider: ApiKeyProvider, key: &str) -> Result<(), PreferencesError> {
        self.store.set(provider.storage_key(), key)
    }

    pub fn clear_api_key(&self, provider: ApiKeyProvider) -> Result<(), PreferencesError> {
        self.store.remove(provider.storage_key())
    }
}
