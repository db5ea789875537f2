//! Environment overrides applied when `use_system_properties` is enabled.
//!
//! Proxy variables (`HTTP_PROXY`, `HTTPS_PROXY`, `NO_PROXY`) are honoured by
//! the transport itself; this module covers the rest.

use std::path::PathBuf;

use log::warn;

use crate::config::{
    ConnectionPoolSettings, ENV_HTTP_AGENT, ENV_HTTP_KEEP_ALIVE, ENV_HTTP_MAX_CONNECTIONS,
    ENV_SSL_CERT_FILE,
};

/// Settings taken from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemOverrides {
    /// PEM trust store replacing the custom TLS context
    pub trust_store: Option<PathBuf>,
    pub keep_alive: Option<bool>,
    /// Per-route cap; the total cap becomes twice this value
    pub max_connections: Option<usize>,
    pub user_agent: Option<String>,
}

impl SystemOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`. Unparsable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let keep_alive = non_empty(ENV_HTTP_KEEP_ALIVE).and_then(|value| {
            match value.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => {
                    warn!("Ignoring {ENV_HTTP_KEEP_ALIVE}={value}: expected true or false");
                    None
                }
            }
        });

        let max_connections = non_empty(ENV_HTTP_MAX_CONNECTIONS).and_then(|value| {
            match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    warn!("Ignoring {ENV_HTTP_MAX_CONNECTIONS}={value}: expected a positive integer");
                    None
                }
            }
        });

        Self {
            trust_store: non_empty(ENV_SSL_CERT_FILE).map(PathBuf::from),
            keep_alive,
            max_connections,
            user_agent: non_empty(ENV_HTTP_AGENT),
        }
    }

    pub fn apply_to_pool(&self, settings: &mut ConnectionPoolSettings) {
        if let Some(keep_alive) = self.keep_alive {
            settings.keep_alive = keep_alive;
        }
        if let Some(max) = self.max_connections {
            settings.max_per_route = max;
            settings.max_total = max.saturating_mul(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_has_no_overrides() {
        let overrides = SystemOverrides::from_lookup(|_| None);
        assert_eq!(overrides, SystemOverrides::default());
    }

    #[test]
    fn test_all_overrides_are_read() {
        let overrides = SystemOverrides::from_lookup(lookup_from(&[
            (ENV_SSL_CERT_FILE, "/etc/ssl/corp.pem"),
            (ENV_HTTP_KEEP_ALIVE, "FALSE"),
            (ENV_HTTP_MAX_CONNECTIONS, "8"),
            (ENV_HTTP_AGENT, "corp-agent/1.0"),
        ]));
        assert_eq!(overrides.trust_store, Some(PathBuf::from("/etc/ssl/corp.pem")));
        assert_eq!(overrides.keep_alive, Some(false));
        assert_eq!(overrides.max_connections, Some(8));
        assert_eq!(overrides.user_agent.as_deref(), Some("corp-agent/1.0"));
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let overrides = SystemOverrides::from_lookup(lookup_from(&[
            (ENV_HTTP_KEEP_ALIVE, "maybe"),
            (ENV_HTTP_MAX_CONNECTIONS, "0"),
            (ENV_HTTP_AGENT, "   "),
        ]));
        assert_eq!(overrides, SystemOverrides::default());
    }

    #[test]
    fn test_max_connections_sets_both_caps() {
        let overrides = SystemOverrides {
            max_connections: Some(5),
            keep_alive: Some(false),
            ..Default::default()
        };
        let mut settings = ConnectionPoolSettings::default();
        overrides.apply_to_pool(&mut settings);
        assert_eq!(settings.max_per_route, 5);
        assert_eq!(settings.max_total, 10);
        assert!(!settings.keep_alive);
    }
}
