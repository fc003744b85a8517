// src/config.rs
// Planner configuration loaded from YAML: trajectory sizing, how the initial
// trajectory is filled, and the escalatable optimizer parameter set.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::trajectory::MAX_POINTS;

/// How the free interior of a fresh trajectory is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitializationMethod {
    /// Minimum-jerk quintic between start and goal
    QuinticSpline,
    /// Straight line in joint space
    Linear,
    /// Closed-form cubic on a fixed micro-timestep
    Cubic,
    /// Resample a seed trajectory carried by the request
    FillTrajectory,
    /// Load a pre-baked matrix from disk
    Prebaked,
}

/// Orientation of a pre-baked trajectory table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableOrientation {
    /// One row per trajectory point, one column per joint
    PointsAsRows,
    /// One row per joint, one column per trajectory point
    PointsAsColumns,
}

/// File-backed initial trajectory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrebakedSource {
    /// Path to the delimited numeric table
    pub path: PathBuf,
    /// Decimal places kept when values are read
    #[serde(default = "default_precision")]
    pub precision: usize,
    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Whether rows are points or joints
    #[serde(default = "default_orientation")]
    pub orientation: TableOrientation,
}

fn default_precision() -> usize {
    8
}

fn default_delimiter() -> char {
    ','
}

fn default_orientation() -> TableOrientation {
    TableOrientation::PointsAsRows
}

/// Optimizer parameter set, escalated by the recovery loop on failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerParameters {
    /// Gradient step scale
    pub learning_rate: f64,
    /// Regularization added to the smoothness metric
    pub ridge_factor: f64,
    /// Wall-clock budget per attempt, in seconds
    pub planning_time_limit: f64,
    /// Iteration cap per attempt
    pub max_iterations: u32,
    /// Retry with escalated parameters when an attempt fails
    pub enable_failure_recovery: bool,
    /// Number of escalated retries after the first attempt
    pub max_recovery_attempts: u32,
}

impl Default for OptimizerParameters {
    fn default() -> Self {
        OptimizerParameters {
            learning_rate: 0.01,
            ridge_factor: 0.0,
            planning_time_limit: 10.0,
            max_iterations: 200,
            enable_failure_recovery: false,
            max_recovery_attempts: 5,
        }
    }
}

/// Main configuration structure for the planner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Trajectory duration in seconds
    pub trajectory_duration: f64,
    /// Seconds between consecutive trajectory points
    pub discretization: f64,
    /// Initial fill strategy
    pub initialization: InitializationMethod,
    /// Table used by [`InitializationMethod::Prebaked`]
    pub prebaked: Option<PrebakedSource>,
    /// Optimizer parameters
    pub optimizer: OptimizerParameters,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            trajectory_duration: 3.0,
            discretization: 0.03409,
            initialization: InitializationMethod::QuinticSpline,
            prebaked: None,
            optimizer: OptimizerParameters::default(),
        }
    }
}

impl PlannerConfig {
    /// Load and validate a configuration file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path.as_ref())?;
        let config: PlannerConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        log::info!("Loaded planner configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate a configuration document
    pub fn from_yaml_str(document: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig = serde_yaml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the planner cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.trajectory_duration > 0.0) || !self.trajectory_duration.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "trajectory_duration must be positive and finite, got {}",
                self.trajectory_duration
            )));
        }
        if !(self.discretization > 0.0) || !self.discretization.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "discretization must be positive and finite, got {}",
                self.discretization
            )));
        }
        let steps = (self.trajectory_duration / self.discretization).floor();
        if steps >= MAX_POINTS as f64 {
            return Err(ConfigError::Invalid(format!(
                "{} s at {} s per point exceeds {} points",
                self.trajectory_duration, self.discretization, MAX_POINTS
            )));
        }
        if self.initialization == InitializationMethod::Prebaked && self.prebaked.is_none() {
            return Err(ConfigError::Invalid(
                "prebaked initialization requires a `prebaked` source".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Document is not valid YAML for the expected structure
    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// Document parsed but holds unusable values
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
