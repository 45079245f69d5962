//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`OidcConfig`](keyward_identity::OidcConfig) for the identity provider
//! settings and [`StoreConfig`](keyward_store::StoreConfig) for the store.

use keyward_identity::OidcConfig;
use keyward_store::StoreConfig;
use serde::Deserialize;
use std::time::Duration;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// TCP port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Transient store connection.
    pub store: StoreConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// OIDC authentication configuration.
    pub oidc: OidcConfig,
}

fn default_listen_port() -> u16 {
    8080
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session duration in minutes. Also the session cookie's Max-Age.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: u64,

    /// Lifetime of a CSRF state token, in seconds.
    #[serde(default = "default_state_ttl_seconds")]
    pub state_ttl_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// Where a successful login lands.
    #[serde(default = "default_landing_path")]
    pub landing_path: String,

    /// Where requests without a usable session are sent.
    #[serde(default = "default_login_redirect")]
    pub login_redirect: String,
}

fn default_session_duration_minutes() -> u64 {
    60
}

fn default_state_ttl_seconds() -> u64 {
    120
}

fn default_secure_cookies() -> bool {
    true
}

fn default_landing_path() -> String {
    "/dashboard".to_string()
}

fn default_login_redirect() -> String {
    "/".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_session_duration_minutes(),
            state_ttl_seconds: default_state_ttl_seconds(),
            secure_cookies: default_secure_cookies(),
            landing_path: default_landing_path(),
            login_redirect: default_login_redirect(),
        }
    }
}

impl SessionConfig {
    /// Lifetime of a session record and its cookie.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.duration_minutes.saturating_mul(60))
    }

    /// Lifetime of a CSRF state token.
    #[must_use]
    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_seconds)
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that deserialize but cannot work.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` naming every offending setting.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let mut problems: Vec<String> = self
            .oidc
            .missing_fields()
            .into_iter()
            .map(|field| format!("oidc.{field} is empty"))
            .collect();
        if self.store.url.trim().is_empty() {
            problems.push("store.url is empty".to_string());
        }
        if self.session.duration_minutes == 0 {
            problems.push("session.duration_minutes must be positive".to_string());
        }
        if self.store.is_in_memory() && self.store.purge_interval_seconds == 0 {
            problems.push("store.purge_interval_seconds must be positive".to_string());
        }
        if self.session.state_ttl_seconds == 0 {
            problems.push("session.state_ttl_seconds must be positive".to_string());
        }
        for (name, path) in [
            ("session.landing_path", &self.session.landing_path),
            ("session.login_redirect", &self.session.login_redirect),
        ] {
            if !path.starts_with('/') {
                problems.push(format!("{name} must be an absolute path"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(config::ConfigError::Message(format!(
                "invalid configuration: {}",
                problems.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(vars: &[(&str, &str)]) -> config::Environment {
        let mut source = config::Map::new();
        for (key, value) in vars {
            source.insert((*key).to_string(), (*value).to_string());
        }
        config::Environment::default().source(Some(source))
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("STORE__URL", "redis://localhost:6379/0"),
        ("OIDC__BASE_URL", "https://auth.example.com"),
        ("OIDC__REALM", "main"),
        ("OIDC__CLIENT_ID", "keyward"),
        ("OIDC__CLIENT_SECRET", "s3cret"),
        ("OIDC__REDIRECT_URI", "https://app.example.com/auth/callback"),
    ];

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.duration_minutes, 60);
        assert_eq!(config.session_ttl(), Duration::from_secs(3600));
        assert_eq!(config.state_ttl(), Duration::from_secs(120));
        assert!(config.secure_cookies);
        assert_eq!(config.landing_path, "/dashboard");
        assert_eq!(config.login_redirect, "/");
    }

    #[test]
    fn huge_session_duration_saturates() {
        let config = SessionConfig {
            duration_minutes: u64::MAX,
            ..SessionConfig::default()
        };
        assert_eq!(config.session_ttl(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn loads_required_settings_with_defaults() {
        let config = ServerConfig::from_environment(environment(REQUIRED)).expect("load");

        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.store.url, "redis://localhost:6379/0");
        assert_eq!(config.store.read_retries, 2);
        assert_eq!(config.oidc.realm(), "main");
        assert_eq!(
            config.oidc.issuer_url(),
            "https://auth.example.com/realms/main"
        );
        assert_eq!(config.session.duration_minutes, 60);
    }

    #[test]
    fn nested_overrides_are_parsed() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("LISTEN_PORT", "9000"),
            ("SESSION__DURATION_MINUTES", "15"),
            ("SESSION__SECURE_COOKIES", "false"),
            ("STORE__OPERATION_TIMEOUT_MS", "500"),
        ]);

        let config = ServerConfig::from_environment(environment(&vars)).expect("load");

        assert_eq!(config.listen_port, 9000);
        assert_eq!(config.session.session_ttl(), Duration::from_secs(900));
        assert!(!config.session.secure_cookies);
        assert_eq!(config.store.operation_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn memory_store_url_is_accepted() {
        let mut vars = REQUIRED.to_vec();
        vars.retain(|(key, _)| *key != "STORE__URL");
        vars.extend([
            ("STORE__URL", "memory://"),
            ("STORE__PURGE_INTERVAL_SECONDS", "30"),
        ]);

        let config = ServerConfig::from_environment(environment(&vars)).expect("load");
        assert!(config.store.is_in_memory());
        assert_eq!(config.store.purge_interval(), Duration::from_secs(30));
    }

    #[test]
    fn missing_oidc_section_is_fatal() {
        let result = ServerConfig::from_environment(environment(&[(
            "STORE__URL",
            "redis://localhost:6379/0",
        )]));
        assert!(result.is_err());
    }

    #[test]
    fn empty_required_value_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.retain(|(key, _)| *key != "OIDC__CLIENT_SECRET");
        vars.push(("OIDC__CLIENT_SECRET", ""));

        let err = ServerConfig::from_environment(environment(&vars)).expect_err("empty secret");
        assert!(err.to_string().contains("oidc.client_secret is empty"));
    }

    #[test]
    fn relative_landing_path_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("SESSION__LANDING_PATH", "dashboard"));

        let err = ServerConfig::from_environment(environment(&vars)).expect_err("relative path");
        assert!(err.to_string().contains("session.landing_path"));
    }
}
