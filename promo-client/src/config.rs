//! Client configuration from the environment.

use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

pub const ENV_BASE_URL: &str = "PROMO_API_BASE_URL";
pub const ENV_AUTH_TOKEN: &str = "PROMO_AUTH_TOKEN";
pub const ENV_SELLER_ID: &str = "PROMO_SELLER_ID";
pub const ENV_TIMEOUT_SECS: &str = "PROMO_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root without a trailing slash.
    pub base_url: String,
    pub auth_token: Option<String>,
    pub seller_id: i64,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            seller_id: 1,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_BASE_URL) {
            config = config.with_base_url(&url);
        }
        config.auth_token = get(ENV_AUTH_TOKEN);
        if let Some(raw) = get(ENV_SELLER_ID) {
            config.seller_id = raw.parse().map_err(|_| ClientError::InvalidConfig {
                key: ENV_SELLER_ID,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|_| ClientError::InvalidConfig {
                key: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = ClientConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:8080/api");
    }

    #[test]
    fn reads_every_key() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://promo.example/api/"),
            (ENV_AUTH_TOKEN, "secret"),
            (ENV_SELLER_ID, "42"),
            (ENV_TIMEOUT_SECS, "5"),
        ]))
        .expect("config");
        assert_eq!(config.base_url, "https://promo.example/api");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.seller_id, 42);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_token_is_no_token() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_AUTH_TOKEN, "  ")])).expect("config");
        assert_eq!(config.auth_token, None);
    }

    #[test]
    fn bad_seller_id_names_the_key() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_SELLER_ID, "seven")])).unwrap_err();
        assert!(err.to_string().contains(ENV_SELLER_ID));
        assert!(err.to_string().contains("seven"));
    }
}
