// Registry configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable naming the registry in log output.
pub const ENV_REGISTRY_NAME: &str = "WIREUP_REGISTRY_NAME";

/// Environment variable enabling mock mode (`1` or `true`).
pub const ENV_ALLOW_MOCKING: &str = "WIREUP_ALLOW_MOCKING";

/// Settings fixed when a registry is built.
///
/// Mock mode mutates live singletons, so it stays off unless asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Label attached to log events
    pub name: String,
    /// Whether `resolve_mocked` may attach mock factories
    pub allow_mocking: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            allow_mocking: false,
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for test setup: mocking enabled.
    pub fn for_tests() -> Self {
        Self {
            name: "test".to_string(),
            allow_mocking: true,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn allow_mocking(mut self, allow: bool) -> Self {
        self.allow_mocking = allow;
        self
    }

    /// Read overrides from the environment on top of the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let name = env::var(ENV_REGISTRY_NAME)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.name);

        let allow_mocking = env::var(ENV_ALLOW_MOCKING)
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.allow_mocking);

        Self {
            name,
            allow_mocking,
        }
    }

    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
