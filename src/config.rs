use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::error::TextAnalyticsError;
use crate::models::ServiceVersion;

/// Crate-level constants
pub const SDK_NAME: &str = "lexis";
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wait between job status polls unless the caller overrides it.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
/// Page size assumed when a next link carries `$skip` without `$top`.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub const ENV_ENDPOINT: &str = "LANGUAGE_ENDPOINT";
pub const ENV_API_KEY: &str = "LANGUAGE_API_KEY";
pub const ENV_API_VERSION: &str = "LANGUAGE_API_VERSION";
pub const ENV_LOG: &str = "LANGUAGE_LOG";

/// Everything needed to build a client.
#[derive(Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
    pub service_version: ServiceVersion,
    pub poll_interval: Duration,
    pub timeout_secs: u64,
    /// Language sent with documents that carry none.
    pub default_language: Option<String>,
    /// Country hint sent with language-detection inputs that carry none.
    pub default_country_hint: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("service_version", &self.service_version)
            .field("poll_interval", &self.poll_interval)
            .field("timeout_secs", &self.timeout_secs)
            .field("default_language", &self.default_language)
            .field("default_country_hint", &self.default_country_hint)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            service_version: ServiceVersion::latest(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            default_language: None,
            default_country_hint: None,
        }
    }

    /// Read `LANGUAGE_ENDPOINT`, `LANGUAGE_API_KEY` and the optional
    /// `LANGUAGE_API_VERSION` from the process environment.
    pub fn from_env() -> Result<Self, TextAnalyticsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TextAnalyticsError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| TextAnalyticsError::Configuration(format!("{name} is not set")))
        };
        let mut config = Self::new(required(ENV_ENDPOINT)?, required(ENV_API_KEY)?);
        if let Some(version) = lookup(ENV_API_VERSION).filter(|v| !v.trim().is_empty()) {
            config.service_version = version.trim().parse().map_err(|_| {
                TextAnalyticsError::Configuration(format!(
                    "{ENV_API_VERSION}: unknown service version '{version}'"
                ))
            })?;
        }
        Ok(config)
    }
}

/// Filter used when `LANGUAGE_LOG` is unset or unparseable.
pub fn default_log_filter() -> &'static str {
    "lexis=info"
}

/// Install a fmt subscriber filtered by `LANGUAGE_LOG`. A no-op when a
/// global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn new_uses_defaults() {
        let config = ClientConfig::new("https://lang.example.com", "key");
        assert_eq!(config.service_version, ServiceVersion::latest());
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn from_env_reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://lang.example.com"),
            (ENV_API_KEY, "secret"),
            (ENV_API_VERSION, "v3.1"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "https://lang.example.com");
        assert_eq!(config.service_version, ServiceVersion::V3_1);
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_ENDPOINT, "https://lang.example.com")]))
            .unwrap_err();
        assert!(matches!(err, TextAnalyticsError::Configuration(msg) if msg.contains(ENV_API_KEY)));
    }

    #[test]
    fn unknown_version_is_configuration_error() {
        let err = ClientConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "https://lang.example.com"),
            (ENV_API_KEY, "secret"),
            (ENV_API_VERSION, "v9"),
        ]))
        .unwrap_err();
        assert!(matches!(err, TextAnalyticsError::Configuration(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ClientConfig::new("https://lang.example.com", "super-secret");
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn sdk_name_matches_crate() {
        assert_eq!(SDK_NAME, env!("CARGO_PKG_NAME"));
    }
}
