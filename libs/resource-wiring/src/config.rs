//! Registry configuration.
//!
//! Loading is lenient: a missing `resource_wiring` section yields
//! [`RegistryConfig::default`]; a present but invalid section is an error.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. an optional YAML file
//! 3. `RESOURCE_WIRING__`-prefixed environment variables

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Top-level section holding the registry settings.
pub const CONFIG_SECTION: &str = "resource_wiring";

/// Prefix for environment overrides, e.g. `RESOURCE_WIRING__EVENT_BUFFER=128`.
pub const ENV_PREFIX: &str = "RESOURCE_WIRING__";

const DEFAULT_EVENT_BUFFER: usize = 64;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid '{CONFIG_SECTION}' config: {source}")]
    InvalidConfig {
        #[source]
        source: Box<figment::Error>,
    },
    #[error("'{CONFIG_SECTION}.event_buffer' must be greater than zero")]
    ZeroEventBuffer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Log a warning when a registration hides another live provider's entry.
    pub warn_on_shadowing: bool,
    /// Capacity of the lifecycle event channel.
    pub event_buffer: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            warn_on_shadowing: true,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl RegistryConfig {
    /// Read the `resource_wiring` section of an already assembled figment.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidConfig` if the section exists but cannot be
    /// deserialized, and `ConfigError::ZeroEventBuffer` if it disables the
    /// event channel.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        if !figment.contains(CONFIG_SECTION) {
            return Ok(Self::default());
        }

        let config: Self = figment
            .extract_inner(CONFIG_SECTION)
            .map_err(|e| ConfigError::InvalidConfig {
                source: Box::new(e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults, then `path` (if given and present), then the environment.
    ///
    /// # Errors
    /// See [`RegistryConfig::from_figment`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::default(CONFIG_SECTION, Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX).map(|key| format!("{CONFIG_SECTION}.{key}").into()),
        );

        Self::from_figment(&figment)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.event_buffer == 0 {
            return Err(ConfigError::ZeroEventBuffer);
        }
        Ok(())
    }
}
