//! Configuration for the SOFM engine.

use crate::error::{Result, SofmError};
use serde::{Deserialize, Serialize};

/// Default lower weight bound.
pub const WEIGHT_MIN: f64 = -1.0;

/// Default upper weight bound.
pub const WEIGHT_MAX: f64 = 1.0;

/// Main configuration for the SOFM engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Map geometry and weight domain.
    pub map: MapConfig,

    /// Training schedule.
    pub training: TrainingConfig,
}

impl Config {
    /// Validates every section.
    pub fn validate(&self) -> Result<()> {
        self.map.validate()?;
        self.training.validate()
    }
}

/// The closed interval node weights are initialized in and thresholded to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightBounds {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Default for WeightBounds {
    fn default() -> Self {
        Self {
            min: WEIGHT_MIN,
            max: WEIGHT_MAX,
        }
    }
}

impl WeightBounds {
    /// Creates validated bounds.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Checks that both bounds are finite and `min < max`.
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SofmError::InvalidConfiguration(format!(
                "Weight bounds must be finite, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(SofmError::InvalidConfiguration(format!(
                "Weight lower bound {} must be below upper bound {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Width of the interval.
    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Binarizes a value: positive values map to `max`, everything else to `min`.
    #[inline]
    pub fn snap(&self, value: f64) -> f64 {
        if value > 0.0 {
            self.max
        } else {
            self.min
        }
    }
}

/// Map geometry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Number of columns.
    /// Default: 10.
    pub width: usize,

    /// Number of rows.
    /// Default: 10.
    pub height: usize,

    /// Weight domain used for initialization and thresholding.
    /// Default: [-1.0, 1.0].
    pub bounds: WeightBounds,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            bounds: WeightBounds::default(),
        }
    }
}

impl MapConfig {
    /// Returns the total number of nodes in the map.
    #[inline]
    pub fn total_nodes(&self) -> usize {
        self.width * self.height
    }

    /// Checks grid dimensions and weight bounds.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SofmError::InvalidConfiguration(format!(
                "Grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        self.bounds.validate()
    }
}

/// Training schedule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training iterations. Zero only initializes weights.
    /// Default: 1,000.
    pub iterations: usize,

    /// Initial learning rate.
    /// Default: 0.5.
    pub learning_rate: f64,

    /// Random seed for reproducibility.
    /// Default: None (random).
    pub seed: Option<u64>,

    /// How often (in iterations) progress is logged and reported.
    /// Default: 1,000.
    pub progress_interval: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: 1_000,
            learning_rate: 0.5,
            seed: None,
            progress_interval: 1_000,
        }
    }
}

impl TrainingConfig {
    /// Checks that the learning rate is a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(SofmError::InvalidConfiguration(format!(
                "Learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
