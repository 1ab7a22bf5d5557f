//! Configuration types for training sessions.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> overrides.

use crate::error::TrainError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level training configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Adaptive restart on stagnation. Disabled when absent.
    #[serde(default)]
    pub stagnation: Option<StagnationConfig>,
    /// Conditions that end the session.
    #[serde(default)]
    pub end: EndConditionsConfig,
    /// Reference model configuration.
    #[serde(default)]
    pub model: ModelConfig,
    /// Reference optimizer configuration.
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    /// Synthetic dataset configuration.
    #[serde(default)]
    pub dataset: DatasetConfig,
}

/// Adaptive restart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagnationConfig {
    /// Error level considered acceptable.
    #[serde(default = "default_required_error")]
    pub required_error: f64,
    /// Consecutive unacceptable iterations tolerated before a reset.
    #[serde(default = "default_cycles")]
    pub cycles: usize,
}

impl Default for StagnationConfig {
    fn default() -> Self {
        Self {
            required_error: default_required_error(),
            cycles: default_cycles(),
        }
    }
}

fn default_required_error() -> f64 {
    0.01
}

fn default_cycles() -> usize {
    5
}

/// Session end conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndConditionsConfig {
    /// Hard cap on iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Stop once the error drops below this value.
    #[serde(default)]
    pub target_error: Option<f64>,
    /// Stop when the best error has not improved by this much...
    #[serde(default)]
    pub min_improvement: Option<f64>,
    /// ...for this many iterations.
    #[serde(default = "default_improvement_cycles")]
    pub improvement_cycles: usize,
}

impl Default for EndConditionsConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            target_error: None,
            min_improvement: None,
            improvement_cycles: default_improvement_cycles(),
        }
    }
}

fn default_max_iterations() -> usize {
    1000
}

fn default_improvement_cycles() -> usize {
    100
}

/// Reference model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_inputs")]
    pub inputs: usize,
    /// Seed for parameter initialization (entropy when absent).
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            inputs: default_inputs(),
            seed: None,
        }
    }
}

fn default_inputs() -> usize {
    1
}

/// Gradient descent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Step used for finite-difference gradients.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            epsilon: default_epsilon(),
        }
    }
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_epsilon() -> f64 {
    1e-6
}

/// Synthetic linear dataset: `y = slope · Σx + intercept + noise`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_slope")]
    pub slope: f64,
    #[serde(default = "default_intercept")]
    pub intercept: f64,
    /// Half-width of the uniform noise added to each target.
    #[serde(default)]
    pub noise: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            slope: default_slope(),
            intercept: default_intercept(),
            noise: 0.0,
        }
    }
}

fn default_samples() -> usize {
    32
}

fn default_slope() -> f64 {
    2.0
}

fn default_intercept() -> f64 {
    1.0
}

impl TrainingConfig {
    /// Reject values no session could be built from.
    pub fn validate(&self) -> Result<(), TrainError> {
        if let Some(stagnation) = &self.stagnation {
            validate_error_level("stagnation.required_error", stagnation.required_error)?;
        }
        if self.end.max_iterations == 0 {
            return Err(TrainError::invalid_config("end.max_iterations must be > 0"));
        }
        if let Some(target) = self.end.target_error {
            validate_error_level("end.target_error", target)?;
        }
        if let Some(min_improvement) = self.end.min_improvement {
            validate_error_level("end.min_improvement", min_improvement)?;
            if self.end.improvement_cycles == 0 {
                return Err(TrainError::invalid_config(
                    "end.improvement_cycles must be > 0",
                ));
            }
        }
        if !(self.optimizer.learning_rate.is_finite() && self.optimizer.learning_rate > 0.0) {
            return Err(TrainError::invalid_config(
                "optimizer.learning_rate must be a positive number",
            ));
        }
        if !(self.optimizer.epsilon.is_finite() && self.optimizer.epsilon > 0.0) {
            return Err(TrainError::invalid_config(
                "optimizer.epsilon must be a positive number",
            ));
        }
        if self.dataset.samples == 0 {
            return Err(TrainError::invalid_config("dataset.samples must be > 0"));
        }
        if !(self.dataset.noise.is_finite() && self.dataset.noise >= 0.0) {
            return Err(TrainError::invalid_config(
                "dataset.noise must be a non-negative number",
            ));
        }
        Ok(())
    }
}

/// Error-like quantities must be finite and non-negative.
pub(crate) fn validate_error_level(field: &str, value: f64) -> Result<(), TrainError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TrainError::invalid_config(format!(
            "{field} must be a finite, non-negative number (got {value})"
        )))
    }
}

/// Individual values set by the caller (e.g. command-line flags).
///
/// Only the fields that are `Some` are layered, so anything else keeps the
/// value from the file or environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub max_iterations: Option<usize>,
    /// Setting this or `cycles` enables adaptive restarts.
    pub required_error: Option<f64>,
    pub cycles: Option<usize>,
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    fn layer(&self, mut figment: Figment) -> Figment {
        if let Some(max) = self.max_iterations {
            figment = figment.merge(Serialized::default("end.max_iterations", max));
        }
        if let Some(required) = self.required_error {
            figment = figment.merge(Serialized::default("stagnation.required_error", required));
        }
        if let Some(cycles) = self.cycles {
            figment = figment.merge(Serialized::default("stagnation.cycles", cycles));
        }
        if let Some(seed) = self.seed {
            figment = figment.merge(Serialized::default("model.seed", seed));
        }
        figment
    }
}

/// Load configuration by layering defaults, an optional TOML file,
/// `STRATAGEM_`-prefixed environment variables and explicit overrides.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<TrainingConfig, TrainError> {
    let mut figment = Figment::from(Serialized::defaults(TrainingConfig::default()));

    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }

    // Environment variables (STRATAGEM_END__MAX_ITERATIONS, STRATAGEM_STAGNATION__CYCLES, etc.)
    figment = figment.merge(Env::prefixed("STRATAGEM_").split("__"));

    figment = overrides.layer(figment);

    let config: TrainingConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
