//! Feature map grid implementation.

use crate::config::{MapConfig, WeightBounds};
use crate::data::validate_matrix;
use crate::error::{Result, SofmError};
use crate::som::Node;
use crate::storage::MapFormat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A self-organizing feature map.
///
/// The map is a `width x height` grid of nodes stored in row-major order.
/// Node `i` sits at row `i / width` and column `i % width`. Geometry,
/// radius and bounds are fixed at construction; only node weights change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    width: usize,
    height: usize,
    map_radius: f64,
    size: usize,
    bounds: WeightBounds,
    nodes: Vec<Node>,
}

impl Map {
    /// Creates a map with the default weight bounds.
    ///
    /// Weights stay empty until [`Map::initialize_weights`] runs.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::from_config(&MapConfig {
            width,
            height,
            bounds: WeightBounds::default(),
        })
    }

    /// Creates a map from configuration.
    pub fn from_config(config: &MapConfig) -> Result<Self> {
        config.validate()?;

        let width = config.width;
        let height = config.height;
        let size = width * height;

        let nodes: Vec<Node> = (0..size)
            .map(|i| {
                let (x, y) = (i / width, i % width);
                Node::new(x, y, i)
            })
            .collect();

        Ok(Self {
            width,
            height,
            map_radius: Self::radius_for(width, height),
            size,
            bounds: config.bounds,
            nodes,
        })
    }

    #[inline]
    fn radius_for(width: usize, height: usize) -> f64 {
        width.max(height) as f64 / 2.0
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Initial neighborhood radius, `max(width, height) / 2`.
    #[inline]
    pub fn map_radius(&self) -> f64 {
        self.map_radius
    }

    /// Total number of nodes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Weight bounds used for initialization and thresholding.
    #[inline]
    pub fn bounds(&self) -> &WeightBounds {
        &self.bounds
    }

    /// All nodes in row-major order.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable access to the nodes. Positions and ids must not be changed.
    #[inline]
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Gets a node by its id.
    #[inline]
    pub fn get(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Gets a node by its grid position.
    #[inline]
    pub fn get_at(&self, row: usize, col: usize) -> Option<&Node> {
        if row < self.height && col < self.width {
            Some(&self.nodes[row * self.width + col])
        } else {
            None
        }
    }

    /// Converts a node id to `(row, col)`.
    #[inline]
    pub fn index_to_coords(&self, index: usize) -> (usize, usize) {
        (index / self.width, index % self.width)
    }

    /// Weight dimensionality, or 0 before initialization.
    #[inline]
    pub fn weight_dim(&self) -> usize {
        self.nodes.first().map_or(0, Node::dimension)
    }

    /// Returns true once every node carries weights.
    pub fn is_initialized(&self) -> bool {
        self.weight_dim() > 0
    }

    /// Assigns every node a fresh random weight vector sized to `data[0]`.
    ///
    /// Components lie in the map's weight bounds. A uniform draw is quantized
    /// to a resolution that grows with the map size, then scaled into the
    /// bounds. The same seeded generator reproduces the same weights.
    pub fn initialize_weights<R: Rng + ?Sized>(&mut self, data: &[Vec<f64>], rng: &mut R) -> Result<()> {
        let dim = validate_matrix(data)?;
        self.initialize_weights_unchecked(dim, rng);
        Ok(())
    }

    pub(crate) fn initialize_weights_unchecked<R: Rng + ?Sized>(&mut self, dim: usize, rng: &mut R) {
        let precision = 10f64.powf((self.size as f64).log10().ceil() + 2.0);
        let bounds = self.bounds;

        for node in &mut self.nodes {
            node.weights = (0..dim)
                .map(|_| {
                    let unit = round(rng.gen::<f64>() * precision, 2) / precision;
                    bounds.min + unit * bounds.span()
                })
                .collect();
        }
    }

    /// Finds the best matching node for an input vector.
    ///
    /// Ties resolve to the lowest id. This is a full linear scan over every
    /// node, O(size) per call, and dominates training time on large grids.
    pub fn probe(&self, input: &[f64]) -> Result<&Node> {
        let idx = self.probe_index(input)?;
        Ok(&self.nodes[idx])
    }

    /// Like [`Map::probe`], but returns the node id.
    pub fn probe_index(&self, input: &[f64]) -> Result<usize> {
        let expected = self.weight_dim();
        if input.len() != expected {
            return Err(SofmError::DimensionMismatch {
                expected,
                got: input.len(),
            });
        }

        Ok(self.probe_index_unchecked(input))
    }

    pub(crate) fn probe_index_unchecked(&self, input: &[f64]) -> usize {
        let mut best_idx = 0;
        let mut best_dist = f64::INFINITY;

        for (i, node) in self.nodes.iter().enumerate() {
            let dist = node.distance_squared_unchecked(input);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }
        best_idx
    }

    /// Updates every node within `radius` of the winning node.
    ///
    /// Nodes whose squared grid distance to the winner is strictly below
    /// `radius²` move towards `input` with Gaussian influence.
    pub fn update(&mut self, input: &[f64], bmu_idx: usize, learning_rate: f64, radius: f64) {
        let (bx, by) = (self.nodes[bmu_idx].x, self.nodes[bmu_idx].y);
        let radius_sq = radius * radius;

        for node in &mut self.nodes {
            let grid_dist_sq = (bx - node.x).powi(2) + (by - node.y).powi(2);
            if grid_dist_sq < radius_sq {
                let influence = (-grid_dist_sq / (2.0 * radius_sq)).exp();
                node.adjust_weights(input, learning_rate, influence);
            }
        }
    }

    /// Binarizes every weight to the upper bound if positive, else the lower bound.
    pub fn threshold(&mut self) {
        let bounds = self.bounds;
        for node in &mut self.nodes {
            node.threshold(&bounds);
        }
    }

    /// Mean distance from each vector to its best matching node.
    pub fn quantization_error(&self, data: &[Vec<f64>]) -> Result<f64> {
        if data.is_empty() {
            return Err(SofmError::InvalidInput("No vectors to measure".to_string()));
        }

        let mut total = 0.0;
        for vector in data {
            total += self.probe(vector)?.distance(vector)?;
        }
        Ok(total / data.len() as f64)
    }

    /// Saves the map to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        MapFormat::write_file(path, self)
    }

    /// Loads a map from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        MapFormat::read_file(path)
    }

    /// Checks the structural invariants a decoded map must satisfy.
    pub(crate) fn check_structure(&self) -> std::result::Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("grid {}x{} is empty", self.width, self.height));
        }
        if self.bounds.validate().is_err() {
            return Err(format!(
                "weight bounds [{}, {}] are invalid",
                self.bounds.min, self.bounds.max
            ));
        }
        let expected_size = self
            .width
            .checked_mul(self.height)
            .ok_or_else(|| "grid size overflows".to_string())?;
        if self.size != expected_size || self.nodes.len() != expected_size {
            return Err(format!(
                "expected {} nodes, header says {} and payload has {}",
                expected_size,
                self.size,
                self.nodes.len()
            ));
        }
        if self.map_radius.to_bits() != Self::radius_for(self.width, self.height).to_bits() {
            return Err(format!(
                "radius {} does not match a {}x{} grid",
                self.map_radius, self.width, self.height
            ));
        }

        let dim = self.weight_dim();
        for (i, node) in self.nodes.iter().enumerate() {
            let (x, y) = self.index_to_coords(i);
            if node.id != i || node.x != x as f64 || node.y != y as f64 {
                return Err(format!("node {} is out of row-major order", i));
            }
            if node.weights.len() != dim {
                return Err(format!(
                    "node {} has {} weights, expected {}",
                    i,
                    node.weights.len(),
                    dim
                ));
            }
        }
        Ok(())
    }
}

/// Rounds half away from zero to `places` decimal places.
#[inline]
fn round(value: f64, places: i32) -> f64 {
    let pow = 10f64.powi(places);
    (value * pow).round() / pow
}
