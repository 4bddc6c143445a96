//! Конфигурация injector'а
//!
//! Источники по приоритету: env (`INJECTOR_*`) > TOML > значения по умолчанию.

use serde::Deserialize;
use std::time::Duration;

use crate::errors::{InjectorError, Result};

pub const ENV_NAME: &str = "INJECTOR_NAME";
pub const ENV_VERBOSE: &str = "INJECTOR_VERBOSE";
pub const ENV_SLOW_FACTORY_MS: &str = "INJECTOR_SLOW_FACTORY_MS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InjectorConfig {
    /// Имя реестра для логов и статистики
    pub name: String,
    /// Писать debug событие на каждое разрешение
    pub verbose_logging: bool,
    /// Порог, после которого вызов recipe считается медленным
    pub slow_factory_threshold_ms: u64,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            verbose_logging: false,
            slow_factory_threshold_ms: 100,
        }
    }
}

impl InjectorConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_verbose_logging(mut self, enabled: bool) -> Self {
        self.verbose_logging = enabled;
        self
    }

    pub fn with_slow_factory_threshold(mut self, threshold: Duration) -> Self {
        self.slow_factory_threshold_ms = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn slow_factory_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_factory_threshold_ms)
    }

    /// Загрузить конфигурацию из TOML, отсутствующие поля берутся по умолчанию
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| InjectorError::Config {
            message: format!("failed to parse injector config: {e}"),
        })
    }

    /// Применить переопределения из переменных окружения процесса
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Применить переопределения из произвольного источника `key -> value`
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_NAME) {
            self.name = name;
        }

        if let Some(raw) = lookup(ENV_VERBOSE) {
            self.verbose_logging = parse_bool(&raw).ok_or_else(|| InjectorError::Config {
                message: format!("{ENV_VERBOSE} must be a boolean, got {raw:?}"),
            })?;
        }

        if let Some(raw) = lookup(ENV_SLOW_FACTORY_MS) {
            self.slow_factory_threshold_ms =
                raw.trim().parse().map_err(|_| InjectorError::Config {
                    message: format!("{ENV_SLOW_FACTORY_MS} must be milliseconds, got {raw:?}"),
                })?;
        }

        Ok(self)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = InjectorConfig::default();
        assert_eq!(config.name, "default");
        assert!(!config.verbose_logging);
        assert_eq!(config.slow_factory_threshold(), Duration::from_millis(100));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = InjectorConfig::from_toml_str("name = \"api\"\nverbose_logging = true\n")
            .expect("valid toml should parse");
        assert_eq!(config.name, "api");
        assert!(config.verbose_logging);
        assert_eq!(config.slow_factory_threshold_ms, 100);
    }

    #[test]
    fn test_from_toml_rejects_unknown_fields() {
        let err = InjectorConfig::from_toml_str("cache_size = 10").unwrap_err();
        assert!(matches!(err, InjectorError::Config { .. }));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_NAME, "worker"),
            (ENV_VERBOSE, "yes"),
            (ENV_SLOW_FACTORY_MS, " 250 "),
        ]
        .into_iter()
        .collect();

        let config = InjectorConfig::default()
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .expect("overrides should apply");

        assert_eq!(config.name, "worker");
        assert!(config.verbose_logging);
        assert_eq!(config.slow_factory_threshold(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_override() {
        let err = InjectorConfig::default()
            .apply_overrides(|key| (key == ENV_VERBOSE).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_VERBOSE));
    }

    #[test]
    fn test_builder_methods() {
        let config = InjectorConfig::default()
            .with_name("custom")
            .with_verbose_logging(true)
            .with_slow_factory_threshold(Duration::from_secs(2));
        assert_eq!(config.name, "custom");
        assert!(config.verbose_logging);
        assert_eq!(config.slow_factory_threshold_ms, 2000);
    }
}
