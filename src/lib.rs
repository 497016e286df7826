//! # SOFM - Self-Organizing Feature Maps
//!
//! SOFM trains Kohonen self-organizing maps: a 2D grid of nodes, each holding
//! a weight vector in input space, adjusted so that neighboring nodes come to
//! represent similar regions of the input distribution.
//!
//! ## Key Features
//!
//! - **Competitive learning** with exponentially decaying learning rate and
//!   neighborhood radius
//! - **Best-matching-unit search** with deterministic tie-breaking
//! - **Seedable training** through an owned ChaCha generator
//! - **Versioned binary format** for persistence
//! - **Response-matrix reports** mapping labels onto the grid
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sofm::{Map, SomTrainer, TrainingConfig};
//!
//! let data = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![10.0, 10.0], vec![11.0, 11.0]];
//!
//! let mut map = Map::new(4, 4)?;
//! let mut trainer = SomTrainer::new(TrainingConfig {
//!     iterations: 100,
//!     learning_rate: 0.5,
//!     seed: Some(42),
//!     ..Default::default()
//! });
//! let report = trainer.train(&mut map, &data)?;
//!
//! let node = map.probe(&[0.0, 0.0])?;
//! println!("BMU {} at ({}, {})", node.id, node.x, node.y);
//!
//! map.save("clusters.sofm")?;
//! ```
//!
//! ## Architecture
//!
//! - [`som`] - Nodes, the map grid and the training loop
//! - [`storage`] - Binary format and persistence
//! - [`data`] - Data file parsing and binarization
//! - [`report`] - Response matrices
//! - [`config`] - Map and training configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod som;
pub mod storage;

// Re-export commonly used types
pub use config::{Config, MapConfig, TrainingConfig, WeightBounds, WEIGHT_MAX, WEIGHT_MIN};
pub use error::{Result, SofmError};
pub use report::{Report, ResponseMatrix};
pub use som::{DecaySchedule, Map, Node, SomTrainer, TrainingReport, VectorPool};
pub use storage::{MapFormat, MapHeader};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
