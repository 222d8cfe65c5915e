use cover_providers::ProviderKind;
use serde::Deserialize;
use std::time::Duration;

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30u64
}

fn default_request_timeout() -> u64 {
    10u64
}

fn default_max_concurrent_searches() -> usize {
    64usize
}

fn default_cover_providers() -> String {
    "deezer,qobuz,spotify".to_string()
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("Unable to read configuration from environment: {0}")]
    Environment(#[from] envy::Error),
    #[error("{0}")]
    UnknownProvider(String),
    #[error("No cover providers enabled")]
    NoProviders,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct QobuzCredentials {
    #[serde(rename = "qobuz_app_id")]
    pub(crate) app_id: Option<String>,
    #[serde(rename = "qobuz_user_auth_token")]
    pub(crate) user_auth_token: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Config {
    #[serde(default = "default_bind_address")]
    pub(crate) bind_address: String,
    #[serde(default = "default_shutdown_timeout")]
    pub(crate) shutdown_timeout: u64,
    #[serde(default = "default_request_timeout")]
    pub(crate) request_timeout: u64,
    #[serde(default = "default_max_concurrent_searches")]
    pub(crate) max_concurrent_searches: usize,
    #[serde(default = "default_cover_providers")]
    pub(crate) cover_providers: String,
    #[serde(default)]
    pub(crate) spotify_access_token: Option<String>,
    #[serde(flatten)]
    pub(crate) qobuz: QobuzCredentials,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        let config = envy::from_env::<Self>()?;
        config.enabled_providers()?;

        Ok(config)
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Enabled providers in configured order, duplicates removed.
    pub(crate) fn enabled_providers(&self) -> Result<Vec<ProviderKind>, ConfigError> {
        let mut kinds = Vec::new();

        for name in self.cover_providers.split(',').map(str::trim) {
            if name.is_empty() {
                continue;
            }
            let kind = name
                .parse::<ProviderKind>()
                .map_err(ConfigError::UnknownProvider)?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        if kinds.is_empty() {
            return Err(ConfigError::NoProviders);
        }

        Ok(kinds)
    }
}
