//! Named collection of interpolation configurations.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use kurve_interp::CombinedInterpolatorExtrapolator;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, Validate};
use crate::interpolation::{is_toml, InterpolationConfig};

/// File layout holding several configurations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    configs: Vec<InterpolationConfig>,
}

/// Thread-safe set of named configurations.
///
/// The standard configurations are loaded on creation and are read-only.
///
/// # Example
///
/// ```rust
/// use kurve_config::{InterpolationConfig, InterpolationConfigSet};
///
/// let set = InterpolationConfigSet::new();
/// let smooth = set.build("SMOOTH.NATURAL_CUBIC").unwrap();
///
/// let custom = InterpolationConfig::new("MY.AKIMA")
///     .with_interpolator("AkimaCubicSpline")
///     .with_extrapolator("FlatExtrapolator");
/// set.register(custom).unwrap();
/// assert!(set.names().unwrap().contains(&"MY.AKIMA".to_string()));
/// ```
pub struct InterpolationConfigSet {
    configs: RwLock<HashMap<String, InterpolationConfig>>,
}

impl Default for InterpolationConfigSet {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpolationConfigSet {
    /// Creates a set holding the standard configurations.
    pub fn new() -> Self {
        let configs = InterpolationConfig::standard()
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();
        Self {
            configs: RwLock::new(configs),
        }
    }

    /// Creates a set with no configurations at all.
    pub fn empty() -> Self {
        Self {
            configs: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a configuration, replacing any writable one of the same name.
    pub fn register(&self, config: InterpolationConfig) -> ConfigResult<()> {
        config.validate_or_error()?;

        let mut configs = self
            .configs
            .write()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        if let Some(existing) = configs.get(&config.name) {
            if existing.read_only {
                return Err(ConfigError::ReadOnly {
                    key: config.name.clone(),
                });
            }
        }

        debug!("registering interpolation config '{}'", config.name);
        configs.insert(config.name.clone(), config);
        Ok(())
    }

    /// Gets a configuration by name.
    pub fn get(&self, name: &str) -> ConfigResult<InterpolationConfig> {
        let configs = self
            .configs
            .read()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;
        configs.get(name).cloned().ok_or_else(|| ConfigError::NotFound {
            key: name.to_string(),
        })
    }

    /// Builds the interpolator of a named configuration.
    pub fn build(&self, name: &str) -> ConfigResult<CombinedInterpolatorExtrapolator> {
        self.get(name)?.build()
    }

    /// Sorted configuration names.
    pub fn names(&self) -> ConfigResult<Vec<String>> {
        let configs = self
            .configs
            .read()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;
        let mut names: Vec<String> = configs.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Removes a writable configuration; returns whether it existed.
    pub fn remove(&self, name: &str) -> ConfigResult<bool> {
        let mut configs = self
            .configs
            .write()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        if let Some(existing) = configs.get(name) {
            if existing.read_only {
                return Err(ConfigError::ReadOnly {
                    key: name.to_string(),
                });
            }
        }
        Ok(configs.remove(name).is_some())
    }

    /// Registers every configuration of a JSON document
    /// `{ "configs": [...] }`; returns how many were loaded.
    pub fn load_json(&self, json: &str) -> ConfigResult<usize> {
        let file: ConfigFile = serde_json::from_str(json)?;
        self.register_all(file.configs)
    }

    /// Registers every `[[configs]]` table of a TOML document.
    pub fn load_toml(&self, text: &str) -> ConfigResult<usize> {
        let file: ConfigFile = toml::from_str(text)?;
        self.register_all(file.configs)
    }

    /// Loads a file; `.toml` files are TOML, anything else JSON.
    pub fn load_file(&self, path: impl AsRef<Path>) -> ConfigResult<usize> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let count = if is_toml(path) {
            self.load_toml(&text)?
        } else {
            self.load_json(&text)?
        };
        info!("loaded {} interpolation configs from {}", count, path.display());
        Ok(count)
    }

    /// Writable configurations as a TOML document.
    pub fn export_toml(&self) -> ConfigResult<String> {
        let configs = self
            .configs
            .read()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;
        let mut custom: Vec<InterpolationConfig> =
            configs.values().filter(|c| !c.read_only).cloned().collect();
        custom.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(toml::to_string(&ConfigFile { configs: custom })?)
    }

    /// Validates every configuration before registering any of them.
    fn register_all(&self, configs: Vec<InterpolationConfig>) -> ConfigResult<usize> {
        for config in &configs {
            config.validate_or_error()?;
        }
        let count = configs.len();
        for config in configs {
            self.register(config)?;
        }
        Ok(count)
    }
}
