//! Engine configuration with documented constants
//!
//! Loaded from TOML (`data/engine.toml` by default). Every field has a
//! default so a partial file is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{EngageError, Result};
use crate::engagement::constants::{
    DIVISION_EPSILON, FIRST_STRIKE_FRACTION, RANDOM_FACTOR_MAX, RANDOM_FACTOR_MIN,
};
use crate::engagement::math::FirstStrikePolicy;

/// Default location of the engine configuration file
pub const DEFAULT_CONFIG_PATH: &str = "data/engine.toml";

/// Tunables for the engagement math and the REST boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether the higher-detection side gets a first strike every round or
    /// only in the first round of an engagement
    pub first_strike_policy: FirstStrikePolicy,

    /// Share of the striking side's full damage dealt as a first strike
    pub first_strike_fraction: f64,

    /// Lower bound of the per-side damage random factor
    pub random_factor_min: f64,

    /// Upper bound of the per-side damage random factor
    pub random_factor_max: f64,

    /// Substituted for A, sigma and b when they are zero at a division
    pub epsilon: f64,

    /// Seed for the damage random factor. `None` draws from entropy.
    pub seed: Option<u64>,

    /// REST boundary settings
    pub api: ApiConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            first_strike_policy: FirstStrikePolicy::EveryRound,
            first_strike_fraction: FIRST_STRIKE_FRACTION,
            random_factor_min: RANDOM_FACTOR_MIN,
            random_factor_max: RANDOM_FACTOR_MAX,
            epsilon: DIVISION_EPSILON,
            seed: None,
            api: ApiConfig::default(),
        }
    }
}

/// Where the unit hierarchy / AAR backend lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root URL; endpoint paths are joined onto it
    pub base_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/".into(),
            timeout_secs: 10,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let numbers = [
            ("random_factor_min", self.random_factor_min),
            ("random_factor_max", self.random_factor_max),
            ("first_strike_fraction", self.first_strike_fraction),
            ("epsilon", self.epsilon),
        ];
        for (name, value) in numbers {
            if !value.is_finite() {
                return Err(EngageError::Config(format!("{} must be a finite number, got {}", name, value)));
            }
        }

        if self.random_factor_min < 0.0 || self.random_factor_min > self.random_factor_max {
            return Err(EngageError::Config(format!(
                "random_factor_min ({}) must be >= 0 and <= random_factor_max ({})",
                self.random_factor_min, self.random_factor_max
            )));
        }

        if !(0.0..=1.0).contains(&self.first_strike_fraction) {
            return Err(EngageError::Config(format!(
                "first_strike_fraction ({}) must be within [0, 1]",
                self.first_strike_fraction
            )));
        }

        if self.epsilon <= 0.0 {
            return Err(EngageError::Config("epsilon must be positive".into()));
        }

        if self.api.base_url.is_empty() {
            return Err(EngageError::Config("api.base_url must be set".into()));
        }

        Ok(())
    }
}

/// Load and validate an engine config from a TOML file
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let contents = fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), policy = ?config.first_strike_policy, "loaded engine config");
    Ok(config)
}

/// Parse and validate an engine config from TOML text
pub fn parse_config(contents: &str) -> Result<EngineConfig> {
    let config: EngineConfig = toml::from_str(contents)
        .map_err(|e| EngageError::Config(format!("Failed to parse engine TOML: {}", e)))?;
    config.validate()?;
    Ok(config)
}
