//! Self-Organizing Feature Map module.
//!
//! - **Node**: a grid unit with a weight vector (node.rs)
//! - **Map**: the grid, best-matching-unit search and thresholding (map.rs)
//! - **Training**: decay schedule, vector pool and training loop (training.rs)

mod map;
mod node;
pub mod training;

pub use map::Map;
pub use node::Node;
pub use training::{DecaySchedule, SomTrainer, TrainingReport, VectorPool};
