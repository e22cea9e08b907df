//! Configuration loading and representation.
//!
//! Settings come from the process environment:
//!
//! - `PARCELTRACK_DATABASE_URL` (default `sqlite://tracker.db?mode=rwc`)
//! - `PARCELTRACK_MAX_CONNECTIONS` (default `5`)

pub const DATABASE_URL_VAR: &str = "PARCELTRACK_DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "PARCELTRACK_MAX_CONNECTIONS";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://tracker.db?mode=rwc";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const IN_MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = match lookup(MAX_CONNECTIONS_VAR) {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "{MAX_CONNECTIONS_VAR} is not a positive integer; using {DEFAULT_MAX_CONNECTIONS}"
                    );
                    DEFAULT_MAX_CONNECTIONS
                }
            },
        };

        Self {
            database_url,
            max_connections,
        }
    }

    /// Private in-memory database (tests/dev).
    pub fn in_memory() -> Self {
        Self {
            database_url: IN_MEMORY_URL.to_string(),
            max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Pool size actually used.
    ///
    /// Every connection to an in-memory SQLite URL opens its own database, so
    /// those are pinned to a single connection.
    pub fn effective_max_connections(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = TrackerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = TrackerConfig::from_lookup(lookup_from(&[
            (DATABASE_URL_VAR, "sqlite:///var/lib/parcels.db"),
            (MAX_CONNECTIONS_VAR, "12"),
        ]));
        assert_eq!(config.database_url, "sqlite:///var/lib/parcels.db");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.effective_max_connections(), 12);
    }

    #[test]
    fn invalid_pool_size_falls_back_to_default() {
        for raw in ["zero", "0", "-3", ""] {
            let config = TrackerConfig::from_lookup(lookup_from(&[(MAX_CONNECTIONS_VAR, raw)]));
            assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        }
    }

    #[test]
    fn in_memory_urls_use_a_single_connection() {
        let config = TrackerConfig::from_lookup(lookup_from(&[
            (DATABASE_URL_VAR, "sqlite::memory:"),
            (MAX_CONNECTIONS_VAR, "8"),
        ]));
        assert!(config.is_in_memory());
        assert_eq!(config.effective_max_connections(), 1);
        assert!(TrackerConfig::in_memory().is_in_memory());
    }
}
