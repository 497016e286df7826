//! Node representation for the feature map.

use crate::config::WeightBounds;
use crate::error::{Result, SofmError};
use serde::{Deserialize, Serialize};

/// A node in the feature map.
///
/// Each node has a fixed position on the 2D grid and a weight vector
/// living in input space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Weight vector. Empty until the map is initialized.
    pub weights: Vec<f64>,
    /// Row position on the grid.
    pub x: f64,
    /// Column position on the grid.
    pub y: f64,
    /// Row-major index into the map's node collection.
    pub id: usize,
}

impl Node {
    /// Creates a node at `(x, y)` with no weights.
    pub fn new(x: usize, y: usize, id: usize) -> Self {
        Self {
            weights: Vec::new(),
            x: x as f64,
            y: y as f64,
            id,
        }
    }

    /// Creates a node with the given weights.
    pub fn new_with_weights(x: usize, y: usize, id: usize, weights: Vec<f64>) -> Self {
        Self {
            weights,
            ..Self::new(x, y, id)
        }
    }

    /// Returns the weight dimensionality.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    /// Computes the Euclidean distance between this node's weights and an input vector.
    pub fn distance(&self, input: &[f64]) -> Result<f64> {
        if input.len() != self.weights.len() {
            return Err(SofmError::DimensionMismatch {
                expected: self.weights.len(),
                got: input.len(),
            });
        }

        Ok(self.distance_squared_unchecked(input).sqrt())
    }

    /// Squared Euclidean distance; callers guarantee matching lengths.
    #[inline]
    pub(crate) fn distance_squared_unchecked(&self, input: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(input.iter())
            .map(|(w, i)| (i - w).powi(2))
            .sum()
    }

    /// Computes the squared grid distance to another node.
    #[inline]
    pub fn grid_distance_squared(&self, other: &Node) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    /// Moves the weights towards an input vector.
    ///
    /// `learning_rate` is the current learning rate.
    /// `influence` is the neighborhood influence (0.0 to 1.0].
    pub fn adjust_weights(&mut self, input: &[f64], learning_rate: f64, influence: f64) {
        for (w, i) in self.weights.iter_mut().zip(input.iter()) {
            *w += (i - *w) * influence * learning_rate;
        }
    }

    /// Replaces every weight with one of the two bounds.
    pub fn threshold(&mut self, bounds: &WeightBounds) {
        for w in &mut self.weights {
            *w = bounds.snap(*w);
        }
    }
}
