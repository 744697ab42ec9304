//! Experiment configuration: run parameters and output artifact naming.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::monitor::types::Tick;

/// Default tick ceiling when the config file does not set one.
pub const DEFAULT_TICK_CEILING: Tick = 5000;

fn default_max_ticks() -> Tick {
    DEFAULT_TICK_CEILING
}

/// Fixed run parameters, read once before setup.
///
/// The four protocol parameters and the seed only influence capacity totals
/// and output artifact names; they never alter monitor logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Minimum-votes threshold used by the agents' voting protocol.
    pub min_votes: u32,
    /// Per-agent storage capacity parameter.
    pub storage: u32,
    /// Per-agent routing capacity parameter.
    pub routing: u32,
    /// Bucket/hashing parameter of the tuple store.
    pub bucket: u32,
    /// Deterministic seed; identical parameters overwrite the same files.
    pub seed: u32,
    /// Hard deadline: the experiment stops once the clock passes this value.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: Tick,
}

impl ExperimentConfig {
    pub fn new(min_votes: u32, storage: u32, routing: u32, bucket: u32, seed: u32) -> Self {
        Self {
            min_votes,
            storage,
            routing,
            bucket,
            seed,
            max_ticks: DEFAULT_TICK_CEILING,
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: Tick) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ticks == 0 {
            return Err(ConfigError::ZeroTickCeiling);
        }
        Ok(())
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|err| ConfigError::ReadFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml(&input)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })
    }

    /// Name of the per-event detail log for a given population size.
    pub fn detail_log_name(&self, population: usize) -> String {
        format!(
            "outputfile_{}_{}_{}_{}_{}_{}.dat",
            self.min_votes, population, self.seed, self.storage, self.routing, self.bucket
        )
    }

    /// Name of the per-agent histogram log for a given population size.
    pub fn histogram_log_name(&self, population: usize) -> String {
        format!(
            "histogramfile_{}_{}_{}_{}_{}_{}.dat",
            self.min_votes, population, self.seed, self.storage, self.routing, self.bucket
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ReadFile { path: String, message: String },
    Parse { message: String },
    ZeroTickCeiling,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFile { path, message } => {
                write!(f, "read config file failed ({path}): {message}")
            }
            ConfigError::Parse { message } => write!(f, "parse config failed: {message}"),
            ConfigError::ZeroTickCeiling => write!(f, "tick ceiling must be positive"),
        }
    }
}

impl Error for ConfigError {}
