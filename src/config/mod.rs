use crate::error::{Result, RoutewireError};
use dashmap::DashMap;
use serde::Deserialize;
use std::env;
use std::sync::Arc;

/// Environment key for [`CombineOptions::skip_default_http_error_middleware`].
pub const SKIP_HTTP_ERROR_ENV: &str = "ROUTEWIRE_SKIP_DEFAULT_HTTP_ERROR_MIDDLEWARE";
/// Environment key for [`CombineOptions::skip_default_validation_error_middleware`].
pub const SKIP_VALIDATION_ERROR_ENV: &str = "ROUTEWIRE_SKIP_DEFAULT_VALIDATION_ERROR_MIDDLEWARE";

/// Configuration service
///
/// A key/value snapshot, seeded from the process environment.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration seeded with every environment variable.
    pub fn from_env() -> Self {
        let service = Self::new();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Read a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(RoutewireError::InvalidConfig {
                key: key.to_string(),
                value,
            }),
        }
    }
}

/// Options of [`crate::combine_controllers`]. Both default middlewares are
/// installed unless skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CombineOptions {
    /// Leave out the trailing catch-all HTTP error middleware.
    pub skip_default_http_error_middleware: bool,
    /// Leave out the trailing validation error middleware.
    pub skip_default_validation_error_middleware: bool,
}

impl CombineOptions {
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            skip_default_http_error_middleware: config
                .get_bool(SKIP_HTTP_ERROR_ENV)?
                .unwrap_or(defaults.skip_default_http_error_middleware),
            skip_default_validation_error_middleware: config
                .get_bool(SKIP_VALIDATION_ERROR_ENV)?
                .unwrap_or(defaults.skip_default_validation_error_middleware),
        })
    }
}
