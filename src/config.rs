use serde::{Deserialize, Serialize};

pub const TOKEN_KEY: &str = "paisatrack_token";
pub const USER_KEY: &str = "paisatrack_user";
pub const LOGIN_ROUTE: &str = "/auth/login";
pub const LOGOUT_ENDPOINT: &str = "/auth/logout";
pub const LOGIN_ENDPOINT: &str = "/api/login";
pub const VERIFY_ENDPOINT: &str = "/api/verify-token";

/// Controller settings. Every field can be overridden by the page through a
/// JSON `data-paisatrack-config` attribute on `<body>`; missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub token_key: String,
    pub user_key: String,
    pub login_route: String,
    pub logout_endpoint: String,
    pub login_endpoint: String,
    pub verify_endpoint: String,
    /// Prefix for relative API paths. Empty means same origin.
    pub api_base_url: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            token_key: TOKEN_KEY.to_string(),
            user_key: USER_KEY.to_string(),
            login_route: LOGIN_ROUTE.to_string(),
            logout_endpoint: LOGOUT_ENDPOINT.to_string(),
            login_endpoint: LOGIN_ENDPOINT.to_string(),
            verify_endpoint: VERIFY_ENDPOINT.to_string(),
            api_base_url: String::new(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid controller config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Falls back to the defaults when the override is absent or unreadable.
    pub fn load(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(config) => config,
            Err(error) => {
                log::warn!("{error}; using defaults");
                Self::default()
            }
        }
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    pub fn resolve_url(&self, path: &str) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        if base.is_empty() || !path.starts_with('/') {
            return path.to_string();
        }
        format!("{base}{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_page_contract() {
        let config = AppConfig::default();
        assert_eq!(config.token_key, "paisatrack_token");
        assert_eq!(config.user_key, "paisatrack_user");
        assert_eq!(config.login_route, "/auth/login");
        assert_eq!(config.logout_endpoint, "/auth/logout");
        assert_eq!(config.log_level(), log::Level::Info);
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let config = AppConfig::load(Some(r#"{"login_route":"/login","log_level":"debug"}"#));
        assert_eq!(config.login_route, "/login");
        assert_eq!(config.log_level(), log::Level::Debug);
        assert_eq!(config.token_key, TOKEN_KEY);
    }

    #[test]
    fn broken_override_falls_back_to_defaults() {
        assert_eq!(AppConfig::load(Some("{not json")), AppConfig::default());
        assert_eq!(AppConfig::load(Some("   ")), AppConfig::default());
        assert_eq!(AppConfig::load(None), AppConfig::default());
    }

    #[test]
    fn unknown_log_level_means_info() {
        let config = AppConfig {
            log_level: "chatty".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.log_level(), log::Level::Info);
    }

    #[test]
    fn resolve_url_prefixes_relative_paths_only() {
        let mut config = AppConfig::default();
        assert_eq!(config.resolve_url("/api/accounts"), "/api/accounts");

        config.api_base_url = "http://localhost:5000/".to_string();
        assert_eq!(
            config.resolve_url("/api/accounts"),
            "http://localhost:5000/api/accounts"
        );
        assert_eq!(
            config.resolve_url("https://elsewhere.test/x"),
            "https://elsewhere.test/x"
        );
    }
}
