//! Runtime configuration.
//!
//! Configuration comes from environment variables or, with the `config`
//! feature, from a JSON document. Invalid values are reported as
//! [`ConfigError`] rather than silently replaced by defaults.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `FERROUS_REGISTRY_QUEUE_CAPACITY` | bound of queues built with [`WorkQueue::from_config`](crate::WorkQueue::from_config) | `64` |
//! | `FERROUS_REGISTRY_BACKPRESSURE` | `block` or `reject` | `block` |
//! | `FERROUS_REGISTRY_EXPECTED_KINDS` | comma separated keys that must be registered | empty |
//!
//! Discovery backend selection is not runtime configuration: it is fixed at
//! build time by cargo features (see [`discovery`](crate::discovery)).

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::queue::Backpressure;

pub const ENV_QUEUE_CAPACITY: &str = "FERROUS_REGISTRY_QUEUE_CAPACITY";
pub const ENV_BACKPRESSURE: &str = "FERROUS_REGISTRY_BACKPRESSURE";
pub const ENV_EXPECTED_KINDS: &str = "FERROUS_REGISTRY_EXPECTED_KINDS";

/// Default bound for queues built from configuration.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Settings shared by the registry holder and the work queues.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct RegistryConfig {
    /// Maximum number of items a configured queue holds
    pub queue_capacity: usize,
    /// What producers do when a configured queue is full
    pub backpressure: Backpressure,
    /// Keys that the discovery backend is expected to provide
    pub expected_kinds: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            backpressure: Backpressure::Block,
            expected_kinds: Vec::new(),
        }
    }
}

impl RegistryConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value. Unset variables keep their defaults.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_QUEUE_CAPACITY) {
            config.queue_capacity = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: ENV_QUEUE_CAPACITY,
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = lookup(ENV_BACKPRESSURE) {
            config.backpressure = raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: ENV_BACKPRESSURE,
                value: raw.clone(),
            })?;
        }

        config.expected_kinds = Self::expected_kinds_from_lookup(lookup);

        config.validate()?;
        Ok(config)
    }

    /// Reads only `FERROUS_REGISTRY_EXPECTED_KINDS` from the process
    /// environment. Queue settings are ignored, valid or not.
    pub fn expected_kinds_from_env() -> Vec<String> {
        Self::expected_kinds_from_lookup(|name| env::var(name).ok())
    }

    /// Like [`expected_kinds_from_env`](Self::expected_kinds_from_env), but
    /// through `lookup`.
    pub fn expected_kinds_from_lookup<L>(lookup: L) -> Vec<String>
    where
        L: Fn(&str) -> Option<String>,
    {
        lookup(ENV_EXPECTED_KINDS)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|kind| !kind.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parses configuration from JSON. Missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(document).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes this configuration to pretty-printed JSON.
    #[cfg(feature = "config")]
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks invariants that parsing alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
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
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = RegistryConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_all_variables() {
        let config = RegistryConfig::from_lookup(lookup_from(&[
            (ENV_QUEUE_CAPACITY, "8"),
            (ENV_BACKPRESSURE, "reject"),
            (ENV_EXPECTED_KINDS, "Object1, Object2,,"),
        ]))
        .unwrap();
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.backpressure, Backpressure::Reject);
        assert_eq!(config.expected_kinds, vec!["Object1", "Object2"]);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let err = RegistryConfig::from_lookup(lookup_from(&[(ENV_QUEUE_CAPACITY, "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: ENV_QUEUE_CAPACITY,
                value: "lots".to_string()
            }
        );

        let err = RegistryConfig::from_lookup(lookup_from(&[(ENV_QUEUE_CAPACITY, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroCapacity);

        let err = RegistryConfig::from_lookup(lookup_from(&[(ENV_BACKPRESSURE, "drop")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: ENV_BACKPRESSURE, .. }));
    }

    #[test]
    fn test_expected_kinds_ignore_queue_settings() {
        let lookup = lookup_from(&[
            (ENV_QUEUE_CAPACITY, "0"),
            (ENV_BACKPRESSURE, "drop"),
            (ENV_EXPECTED_KINDS, " Object1 ,Object7"),
        ]);
        assert!(RegistryConfig::from_lookup(&lookup).is_err());
        assert_eq!(
            RegistryConfig::expected_kinds_from_lookup(&lookup),
            vec!["Object1", "Object7"]
        );
        assert!(RegistryConfig::expected_kinds_from_lookup(|_| None).is_empty());
    }
}
