use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CARELINE_BASE_URL")
            && !url.is_empty()
        {
            self.backend.base_url = url;
        }

        if let Ok(url) = std::env::var("CARELINE_WS_URL")
            && !url.is_empty()
        {
            self.backend.ws_url = url;
        }

        if let Ok(level) = std::env::var("CARELINE_LOG_LEVEL")
            && !level.is_empty()
        {
            self.observability.log_level = level;
        }

        if let Ok(secs) = std::env::var("CARELINE_REQUEST_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
            && secs > 0
        {
            self.backend.request_timeout_secs = secs;
        }
    }
}
