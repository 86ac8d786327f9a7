//! Run configuration: environments, each with a list of targets.
//!
//! ```toml
//! [defaults]
//! hub = "http://localhost:4444/wd/hub"
//!
//! [environments.local.common]
//! latency_ms = 0
//!
//! [[environments.local.targets]]
//! browser = "chromium"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use integrator_core::{Action, IntegratorError, Suite};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_HUB: &str = "http://localhost:4444/wd/hub";
pub const DEFAULT_ENVIRONMENT: &str = "local";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown environment \"{0}\"")]
    UnknownEnvironment(String),

    #[error("No targets configured{}", for_environment(.environment))]
    NoTargets { environment: Option<String> },
}

fn for_environment(environment: &Option<String>) -> String {
    environment
        .as_ref()
        .map(|name| format!(" for environment \"{}\"", name))
        .unwrap_or_default()
}

/// Settings shared by every environment, plus the environments themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Merged under every target.
    #[serde(default = "default_settings")]
    pub defaults: Map<String, Value>,

    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Merged under every target of this environment.
    #[serde(default)]
    pub common: Map<String, Value>,

    #[serde(default)]
    pub targets: Vec<Map<String, Value>>,
}

fn default_settings() -> Map<String, Value> {
    let mut settings = Map::new();
    settings.insert("hub".to_string(), Value::from(DEFAULT_HUB));
    settings
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        let mut environments = BTreeMap::new();
        environments.insert(
            DEFAULT_ENVIRONMENT.to_string(),
            EnvironmentConfig {
                common: Map::new(),
                targets: vec![Map::new()],
            },
        );
        Self {
            defaults: default_settings(),
            environments,
        }
    }
}

impl IntegratorConfig {
    /// Load configuration from a file, falling back to the built-in default
    /// when the file does not exist. `.json` files are parsed as JSON,
    /// everything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let is_json = path.extension().map_or(false, |ext| ext == "json");
        if is_json {
            serde_json::from_str(content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        } else {
            toml::from_str(content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    /// Every environment, or only the one called `name`.
    pub fn select_environments(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<(&str, &EnvironmentConfig)>, ConfigError> {
        match name {
            None => Ok(self
                .environments
                .iter()
                .map(|(name, env)| (name.as_str(), env))
                .collect()),
            Some(name) => self
                .environments
                .get_key_value(name)
                .map(|(name, env)| vec![(name.as_str(), env)])
                .ok_or_else(|| ConfigError::UnknownEnvironment(name.to_string())),
        }
    }

    /// The fully merged targets of one environment.
    pub fn environment_targets(&self, name: &str, environment: &EnvironmentConfig) -> Vec<TargetConfig> {
        environment
            .targets
            .iter()
            .map(|target| {
                let mut settings = default_settings();
                deep_merge(&mut settings, &self.defaults);
                deep_merge(&mut settings, &environment.common);
                deep_merge(&mut settings, target);

                TargetConfig {
                    environment: name.to_string(),
                    target_name: target_name(target),
                    settings,
                }
            })
            .collect()
    }

    /// Merged targets of the selected environments. Selecting nothing to run
    /// is an error.
    pub fn targets(&self, environment: Option<&str>) -> Result<Vec<TargetConfig>, ConfigError> {
        let targets: Vec<TargetConfig> = self
            .select_environments(environment)?
            .into_iter()
            .flat_map(|(name, env)| self.environment_targets(name, env))
            .collect();

        if targets.is_empty() {
            return Err(ConfigError::NoTargets {
                environment: environment.map(str::to_string),
            });
        }
        Ok(targets)
    }
}

/// One environment target with every layer of settings merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub environment: String,
    pub target_name: String,
    pub settings: Map<String, Value>,
}

impl TargetConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// `environment/target_name`, for logs and result tables.
    pub fn label(&self) -> String {
        format!("{}/{}", self.environment, self.target_name)
    }
}

/// Merge `overlay` into `base`. Tables present on both sides merge key by
/// key; anything else in `overlay` replaces what `base` had.
pub fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        if let (Some(Value::Object(existing)), Value::Object(incoming)) = (base.get_mut(key), value) {
            deep_merge(existing, incoming);
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

/// A short name built from a target's own keys: `browser=chromium,version=40`.
pub fn target_name(target: &Map<String, Value>) -> String {
    if target.is_empty() {
        return "default".to_string();
    }

    target
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}={}", key, s),
            other => format!("{}={}", key, other),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Every action of the suite in definition order, or only `only`.
pub fn select_actions<S>(
    suite: &Suite<S>,
    only: Option<&str>,
) -> Result<Vec<Arc<Action<S>>>, IntegratorError> {
    match only {
        None => Ok(suite.actions().cloned().collect()),
        Some(name) => Ok(vec![suite.registry().require(name)?.clone()]),
    }
}
