//! Indexer configuration from environment variables.

use std::env;
use std::time::Duration;

use serde_json::Value;

use crate::IndexingError;
use item_indexer_pipeline::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_TASK_POLL_INTERVAL, DEFAULT_TASK_TIMEOUT,
};
use item_indexer_pipeline::IndexerConfig;

const MEILI_URL: &str = "MEILI_URL";
const MEILI_API_KEY: &str = "MEILI_API_KEY";
const MEILI_INDEX: &str = "MEILI_INDEX";
const MEILI_PRIMARY_KEY: &str = "MEILI_PRIMARY_KEY";
const MEILI_INDEX_SETTINGS: &str = "MEILI_INDEX_SETTINGS";
const MEILI_ENSURE_INDEX: &str = "MEILI_ENSURE_INDEX";
const MEILI_BATCH_SIZE: &str = "MEILI_BATCH_SIZE";
const MEILI_TASK_TIMEOUT: &str = "MEILI_TASK_TIMEOUT";
const MEILI_TASK_INTERVAL: &str = "MEILI_TASK_INTERVAL";

/// Build the indexer configuration from the process environment.
///
/// # Environment Variables
///
/// - `MEILI_URL`: Meilisearch URL (required)
/// - `MEILI_API_KEY`: API key (optional)
/// - `MEILI_INDEX`: destination index (required)
/// - `MEILI_PRIMARY_KEY`: primary key used when creating the index
/// - `MEILI_INDEX_SETTINGS`: JSON object applied as index settings at start
/// - `MEILI_ENSURE_INDEX`: create the index when missing (default: true)
/// - `MEILI_BATCH_SIZE`: documents per batch (default: 1000)
/// - `MEILI_TASK_TIMEOUT`: seconds to wait for each task (default: 120)
/// - `MEILI_TASK_INTERVAL`: seconds between task polls (default: 1)
pub fn config_from_env() -> Result<IndexerConfig, IndexingError> {
    config_from_lookup(|key| env::var(key).ok())
}

/// Build the indexer configuration from an arbitrary key lookup.
///
/// Empty values are treated as unset.
pub fn config_from_lookup<F>(lookup: F) -> Result<IndexerConfig, IndexingError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let url = get(MEILI_URL)
        .ok_or_else(|| IndexingError::config(format!("{} is missing", MEILI_URL)))?;
    let index = get(MEILI_INDEX)
        .ok_or_else(|| IndexingError::config(format!("{} is missing", MEILI_INDEX)))?;

    let mut config = IndexerConfig::new(url, index)
        .with_batch_size(parse_or(MEILI_BATCH_SIZE, get(MEILI_BATCH_SIZE), DEFAULT_BATCH_SIZE)?)
        .with_task_timeout(parse_seconds(
            MEILI_TASK_TIMEOUT,
            get(MEILI_TASK_TIMEOUT),
            DEFAULT_TASK_TIMEOUT,
        )?)
        .with_task_poll_interval(parse_seconds(
            MEILI_TASK_INTERVAL,
            get(MEILI_TASK_INTERVAL),
            DEFAULT_TASK_POLL_INTERVAL,
        )?)
        .with_ensure_index(parse_bool(
            MEILI_ENSURE_INDEX,
            get(MEILI_ENSURE_INDEX),
            true,
        )?);

    if let Some(api_key) = get(MEILI_API_KEY) {
        config = config.with_api_key(api_key);
    }
    if let Some(primary_key) = get(MEILI_PRIMARY_KEY) {
        config = config.with_primary_key(primary_key);
    }
    if let Some(raw) = get(MEILI_INDEX_SETTINGS) {
        config = config.with_index_settings(parse_settings(&raw)?);
    }

    Ok(config)
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> Result<T, IndexingError> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| IndexingError::config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

fn parse_seconds(
    key: &str,
    value: Option<String>,
    default: Duration,
) -> Result<Duration, IndexingError> {
    parse_or(key, value, default.as_secs()).map(Duration::from_secs)
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool, IndexingError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(IndexingError::config(format!(
            "{} has an invalid value: {}",
            key, other
        ))),
    }
}

fn parse_settings(raw: &str) -> Result<serde_json::Map<String, Value>, IndexingError> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(settings)) => Ok(settings),
        Ok(_) => Err(IndexingError::config(format!(
            "{} must be a JSON object",
            MEILI_INDEX_SETTINGS
        ))),
        Err(e) => Err(IndexingError::config(format!(
            "{} is not valid JSON: {}",
            MEILI_INDEX_SETTINGS, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = config_from_lookup(lookup(&[
            ("MEILI_URL", "http://localhost:7700"),
            ("MEILI_INDEX", "products"),
        ]))
        .unwrap();

        assert_eq!(config.index_url, "http://localhost:7700");
        assert_eq!(config.index_name, "products");
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.task_timeout, Duration::from_secs(120));
        assert_eq!(config.task_poll_interval, Duration::from_secs(1));
        assert!(config.ensure_index);
        assert!(config.api_key.is_none());
        assert!(config.primary_key.is_none());
        assert!(config.index_settings.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = config_from_lookup(lookup(&[
            ("MEILI_URL", "http://127.0.0.1:7700"),
            ("MEILI_API_KEY", "masterkey"),
            ("MEILI_INDEX", "products"),
            ("MEILI_PRIMARY_KEY", "id"),
            (
                "MEILI_INDEX_SETTINGS",
                r#"{"filterableAttributes": ["author", "rating"], "sortableAttributes": ["rating"]}"#,
            ),
            ("MEILI_ENSURE_INDEX", "false"),
            ("MEILI_BATCH_SIZE", "3"),
            ("MEILI_TASK_TIMEOUT", "30"),
            ("MEILI_TASK_INTERVAL", "0"),
        ]))
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("masterkey"));
        assert_eq!(config.primary_key.as_deref(), Some("id"));
        assert_eq!(config.index_settings.as_ref().map(|s| s.len()), Some(2));
        assert!(!config.ensure_index);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.task_timeout, Duration::from_secs(30));
        assert_eq!(config.task_poll_interval, Duration::ZERO);
    }

    #[test]
    fn test_missing_required_keys() {
        let err = config_from_lookup(lookup(&[("MEILI_INDEX", "products")])).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: MEILI_URL is missing");

        let err = config_from_lookup(lookup(&[
            ("MEILI_URL", "http://localhost:7700"),
            ("MEILI_INDEX", "   "),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: MEILI_INDEX is missing");
    }

    #[test]
    fn test_batch_size_zero_is_clamped() {
        let config = config_from_lookup(lookup(&[
            ("MEILI_URL", "http://localhost:7700"),
            ("MEILI_INDEX", "products"),
            ("MEILI_BATCH_SIZE", "0"),
        ]))
        .unwrap();

        assert_eq!(config.batch_size, 1);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("MEILI_BATCH_SIZE", "many"),
            ("MEILI_TASK_TIMEOUT", "-1"),
            ("MEILI_ENSURE_INDEX", "maybe"),
            ("MEILI_INDEX_SETTINGS", "[1, 2]"),
            ("MEILI_INDEX_SETTINGS", "{not json"),
        ] {
            let result = config_from_lookup(lookup(&[
                ("MEILI_URL", "http://localhost:7700"),
                ("MEILI_INDEX", "products"),
                (key, value),
            ]));
            assert!(
                matches!(result, Err(IndexingError::ConfigError(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }
}
