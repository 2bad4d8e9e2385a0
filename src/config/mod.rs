mod env_overrides;
mod loader;
pub mod preferences;
pub mod schema;
#[cfg(test)]
mod test_env;

pub use preferences::{
    ApiKeyProvider, ApiKeys, FilePreferenceStore, LanguagePair, MemoryPreferenceStore,
    PreferenceStore, Preferences,
};
pub use schema::{BackendConfig, Config, ObservabilityConfig, ReliabilityConfig};
