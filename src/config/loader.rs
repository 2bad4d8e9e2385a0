use super::Config;
use crate::error::{ConfigError, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        Self::load_or_init_in(&home.join(".careline"))
    }

    /// Load `config.toml` from `data_dir`, writing defaults on first run.
    pub fn load_or_init_in(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join("config.toml");

        if !data_dir.exists() {
            fs::create_dir_all(data_dir).map_err(ConfigError::Io)?;
        }

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path).map_err(ConfigError::Io)?;
            let mut config: Config = toml::from_str(&contents).map_err(|e| {
                ConfigError::Load(format!("{}: {e}", config_path.display()))
            })?;
            config.config_path.clone_from(&config_path);
            config.data_dir = data_dir.to_path_buf();
            config
        } else {
            let config = Self {
                config_path: config_path.clone(),
                data_dir: data_dir.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> std::result::Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("serialize config: {e}")))?;
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let base = url::Url::parse(&self.backend.base_url).map_err(|e| {
            ConfigError::Validation(format!(
                "backend.base_url is not a URL ({e}): {}",
                self.backend.base_url
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(
                "backend.base_url must use http or https".into(),
            ));
        }

        let ws = url::Url::parse(&self.backend.ws_url).map_err(|e| {
            ConfigError::Validation(format!(
                "backend.ws_url is not a URL ({e}): {}",
                self.backend.ws_url
            ))
        })?;
        if !matches!(ws.scheme(), "ws" | "wss") {
            return Err(ConfigError::Validation(
                "backend.ws_url must use ws or wss".into(),
            ));
        }

        if self.reliability.live_initial_backoff_ms == 0 {
            return Err(ConfigError::Validation(
                "reliability.live_initial_backoff_ms must be positive".into(),
            ));
        }
        if self.reliability.live_max_backoff_ms < self.reliability.live_initial_backoff_ms {
            return Err(ConfigError::Validation(
                "reliability.live_max_backoff_ms must be >= live_initial_backoff_ms".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_env::ScopedEnv;
    use super::*;
    use crate::error::CarelineError;

    fn clean_env() -> ScopedEnv {
        let mut env = ScopedEnv::lock();
        env.unset("CARELINE_BASE_URL")
            .unset("CARELINE_WS_URL")
            .unset("CARELINE_LOG_LEVEL")
            .unset("CARELINE_REQUEST_TIMEOUT_SECS");
        env
    }

    #[test]
    fn first_run_writes_default_config() {
        let _env = clean_env();
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".careline");

        let config = Config::load_or_init_in(&dir).unwrap();

        assert!(dir.join("config.toml").exists());
        assert_eq!(config.data_dir, dir);
        assert_eq!(config.backend.base_url, "http://localhost:8000/api");
    }

    #[test]
    fn existing_config_is_loaded() {
        let _env = clean_env();
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[backend]\nbase_url = \"https://clinic.example/api\"\nws_url = \"wss://clinic.example/api/ws\"\n",
        )
        .unwrap();

        let config = Config::load_or_init_in(tmp.path()).unwrap();
        assert_eq!(config.backend.base_url, "https://clinic.example/api");
        assert_eq!(config.backend.ws_url, "wss://clinic.example/api/ws");
    }

    #[test]
    fn rejects_ws_url_with_http_scheme() {
        let mut config = Config::default();
        config.backend.ws_url = "http://localhost:8000/api/ws".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ws or wss"));
    }

    #[test]
    fn rejects_inverted_backoff_bounds() {
        let mut config = Config::default();
        config.reliability.live_initial_backoff_ms = 5_000;
        config.reliability.live_max_backoff_ms = 1_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn malformed_file_surfaces_as_config_load_error() {
        let _env = clean_env();
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("config.toml"), "[backend\nbase_url = ").unwrap();

        let err = Config::load_or_init_in(tmp.path()).unwrap_err();
        assert!(matches!(err, CarelineError::Config(ConfigError::Load(_))));
        assert!(err.to_string().starts_with("config: failed to load config"));
    }

    #[test]
    fn invalid_env_override_surfaces_as_validation_error() {
        let mut env = clean_env();
        env.set("CARELINE_WS_URL", "http://localhost:8000/api/ws");
        let tmp = tempfile::tempdir().unwrap();

        let err = Config::load_or_init_in(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            CarelineError::Config(ConfigError::Validation(_))
        ));
    }
}
