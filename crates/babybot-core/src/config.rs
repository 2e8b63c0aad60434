//! Configuration loading and typed config structures for `BabyBot` runs.
//!
//! The canonical configuration lives in `babybot-config.yaml` at the project
//! root. Every section and field has a default, so a missing file, an empty
//! file, and a partial file are all valid.
//!
//! Environment variables override a few world settings after the YAML is
//! read:
//! - `BABYBOT_SEED` overrides `world.seed`
//! - `BABYBOT_MAP` overrides `world.map`
//! - `BABYBOT_MISSION` overrides `world.mission`

use std::path::{Path, PathBuf};

use babybot_planner::PlannerConfig;
use babybot_world::ScenarioConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable overriding `world.seed`.
pub const SEED_ENV: &str = "BABYBOT_SEED";
/// Environment variable overriding `world.map`.
pub const MAP_ENV: &str = "BABYBOT_MAP";
/// Environment variable overriding `world.mission`.
pub const MISSION_ENV: &str = "BABYBOT_MISSION";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value of the wrong shape.
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidOverride {
        /// The environment variable name.
        name: &'static str,
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `babybot-config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BabyBotConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where the world comes from and what the agent must do in it.
    #[serde(default)]
    pub world: WorldSettings,

    /// Layout of generated worlds, used when no map file is given.
    #[serde(default)]
    pub scenario: ScenarioConfig,

    /// Planner tuning.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Episode driver settings.
    #[serde(default)]
    pub episode: EpisodeConfig,
}

impl BabyBotConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields the
    /// defaults (environment overrides still apply).
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file), minus the missing-file case.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        debug!(path = %path.display(), "config file not found, using defaults");
        let mut config = Self::default();
        config.world.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override is malformed.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_yaml(yaml)?;
        config.world.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse YAML without looking at the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error). `RUST_LOG`
    /// takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// World source and mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSettings {
    /// Seed for scenario generation.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// ASCII map file. When unset, a scenario is generated from `seed`.
    #[serde(default)]
    pub map: Option<PathBuf>,

    /// Mission text. Required with a map file; replaces the generated
    /// mission otherwise.
    #[serde(default)]
    pub mission: Option<String>,

    /// Step budget. Defaults to `4 * width * height` of the world.
    #[serde(default)]
    pub max_steps: Option<u32>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            map: None,
            mission: None,
            max_steps: None,
        }
    }
}

impl WorldSettings {
    /// Apply `BABYBOT_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if `BABYBOT_SEED` is not an
    /// unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if the seed override is not
    /// an unsigned integer.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(SEED_ENV) {
            self.seed = val.trim().parse().map_err(|err: std::num::ParseIntError| {
                ConfigError::InvalidOverride {
                    name: SEED_ENV,
                    value: val.clone(),
                    reason: err.to_string(),
                }
            })?;
        }
        if let Some(val) = lookup(MAP_ENV) {
            self.map = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup(MISSION_ENV) {
            self.mission = Some(val);
        }
        Ok(())
    }
}

/// Episode driver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeConfig {
    /// End the episode as soon as the world reports mission success, even
    /// if the planner still has subgoals.
    #[serde(default = "default_true")]
    pub stop_on_success: bool,

    /// Subgoal plan to seed the planner with instead of decomposing the
    /// mission, in execution order (`(GoNextToSubgoal, (3, 5))` etc.).
    #[serde(default)]
    pub plan: Vec<String>,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            stop_on_success: true,
            plan: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_true() -> bool {
    true
}
