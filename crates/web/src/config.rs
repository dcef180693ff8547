use anyhow::{Context, Result};

use crate::sse::broadcaster::DEFAULT_CAPACITY;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub broadcast_topic: String,
    pub broadcast_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup, falling back to
    /// defaults for anything unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: get("HOST", "127.0.0.1"),
            port: get("PORT", "5000")
                .parse()
                .context("PORT must be a number")?,
            database_url: get("DATABASE_URL", "sqlite://tournament.db?mode=rwc"),
            broadcast_topic: get("BROADCAST_TOPIC", "match_updates"),
            broadcast_capacity: get("BROADCAST_CAPACITY", &DEFAULT_CAPACITY.to_string())
                .parse()
                .context("BROADCAST_CAPACITY must be a number")?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.database_url, "sqlite://tournament.db?mode=rwc");
        assert_eq!(config.broadcast_topic, "match_updates");
        assert_eq!(config.broadcast_capacity, 100);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("BROADCAST_TOPIC", "mat_2"),
            ("BROADCAST_CAPACITY", "16"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.broadcast_topic, "mat_2");
        assert_eq!(config.broadcast_capacity, 16);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
