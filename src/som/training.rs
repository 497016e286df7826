//! Competitive-learning training loop.
//!
//! Each iteration draws one input vector without replacement, finds its best
//! matching node, and pulls every node inside the current neighborhood
//! towards the input. The neighborhood radius shrinks exponentially from the
//! map radius; the learning rate decays exponentially from its initial value.
//! Iterations are strictly sequential: each winner depends on every update
//! made before it.

use crate::config::TrainingConfig;
use crate::data::validate_matrix;
use crate::error::{Result, SofmError};
use crate::som::Map;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Learning-rate and neighborhood-radius decay for one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecaySchedule {
    map_radius: f64,
    time_constant: f64,
    iterations: usize,
    initial_learning_rate: f64,
}

impl DecaySchedule {
    /// Builds the schedule for a map radius, iteration count and initial rate.
    ///
    /// The time constant is `iterations / ln(map_radius)`, so the radius must
    /// exceed 1 for the neighborhood to shrink. Smaller radii are rejected.
    pub fn new(map_radius: f64, iterations: usize, initial_learning_rate: f64) -> Result<Self> {
        if map_radius <= 1.0 {
            return Err(SofmError::InvalidConfiguration(format!(
                "Map radius {} must exceed 1 for the neighborhood to decay; use a grid wider or taller than 2",
                map_radius
            )));
        }
        if !initial_learning_rate.is_finite() || initial_learning_rate <= 0.0 {
            return Err(SofmError::InvalidConfiguration(format!(
                "Learning rate must be positive, got {}",
                initial_learning_rate
            )));
        }

        Ok(Self {
            map_radius,
            time_constant: iterations as f64 / map_radius.ln(),
            iterations,
            initial_learning_rate,
        })
    }

    /// Time constant of the radius decay.
    #[inline]
    pub fn time_constant(&self) -> f64 {
        self.time_constant
    }

    /// Neighborhood radius during `iteration`.
    #[inline]
    pub fn radius(&self, iteration: usize) -> f64 {
        self.map_radius * (-(iteration as f64) / self.time_constant).exp()
    }

    /// Learning rate applied during `iteration`.
    ///
    /// Iteration 0 uses the initial rate. After iteration `k` the rate becomes
    /// `initial * exp(-k / iterations)`, recomputed from the initial rate each
    /// time rather than compounded.
    #[inline]
    pub fn learning_rate(&self, iteration: usize) -> f64 {
        match iteration {
            0 => self.initial_learning_rate,
            k => self.initial_learning_rate * (-((k - 1) as f64) / self.iterations as f64).exp(),
        }
    }
}

/// Index pool for drawing training vectors without replacement.
///
/// The pool is refilled with every index whenever one or fewer remain.
#[derive(Debug, Clone)]
pub struct VectorPool {
    remaining: Vec<usize>,
    len: usize,
}

impl VectorPool {
    /// Creates a full pool over `len` vectors.
    pub fn new(len: usize) -> Self {
        debug_assert!(len > 0, "pool needs at least one vector");
        Self {
            remaining: (0..len).collect(),
            len,
        }
    }

    /// Number of indices left before the next refill check.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    fn refill(&mut self) {
        self.remaining.clear();
        self.remaining.extend(0..self.len);
    }

    /// Draws a uniformly random index and removes it from the pool.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        if self.remaining.len() <= 1 {
            self.refill();
        }
        let slot = rng.gen_range(0..self.remaining.len());
        self.remaining.swap_remove(slot)
    }
}

/// Summary of a completed training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Iterations executed.
    pub iterations: usize,
    /// Mean BMU distance right after weight initialization.
    pub initial_quantization_error: f64,
    /// Mean BMU distance after the last iteration.
    pub final_quantization_error: f64,
    /// Learning rate used in the last iteration.
    pub final_learning_rate: f64,
    /// Neighborhood radius used in the last iteration.
    pub final_radius: f64,
}

/// Outcome of the training loop itself.
struct LoopOutcome {
    final_learning_rate: f64,
    final_radius: f64,
}

/// Validates inputs, reinitializes weights and runs the training loop.
///
/// Everything that can fail is checked before the map is touched.
fn run<R, F>(
    map: &mut Map,
    data: &[Vec<f64>],
    iterations: usize,
    learning_rate: f64,
    progress_interval: usize,
    rng: &mut R,
    mut progress: F,
) -> Result<LoopOutcome>
where
    R: Rng + ?Sized,
    F: FnMut(usize, usize, f64, f64),
{
    let dim = validate_matrix(data)?;
    let schedule = DecaySchedule::new(map.map_radius(), iterations, learning_rate)?;

    map.initialize_weights_unchecked(dim, rng);

    let mut pool = VectorPool::new(data.len());
    let mut outcome = LoopOutcome {
        final_learning_rate: learning_rate,
        final_radius: map.map_radius(),
    };

    for iteration in 0..iterations {
        let input = &data[pool.draw(rng)];
        let bmu_idx = map.probe_index_unchecked(input);

        let radius = schedule.radius(iteration);
        let lr = schedule.learning_rate(iteration);
        map.update(input, bmu_idx, lr, radius);

        outcome.final_learning_rate = lr;
        outcome.final_radius = radius;

        if progress_interval > 0 && (iteration % progress_interval == 0 || iteration + 1 == iterations) {
            debug!(
                "Iteration {}/{}: lr={:.4}, radius={:.3}, bmu={}",
                iteration, iterations, lr, radius, bmu_idx
            );
            progress(iteration + 1, iterations, lr, radius);
        }
    }

    Ok(outcome)
}

impl Map {
    /// Trains the map on `data`, returning the map for chaining.
    ///
    /// Weights are always reinitialized first, so a loaded map restarts from
    /// random weights. `iterations == 0` only initializes. Fails with
    /// `InvalidInput` for empty or ragged data and `InvalidConfiguration` when
    /// the learning rate is not positive or the map radius is 1 or less;
    /// in both cases the map is left untouched.
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        data: &[Vec<f64>],
        iterations: usize,
        learning_rate: f64,
        rng: &mut R,
    ) -> Result<&mut Self> {
        run(self, data, iterations, learning_rate, 0, rng, |_, _, _, _| {})?;
        Ok(self)
    }
}

/// Map trainer owning its configuration and random generator.
pub struct SomTrainer {
    config: TrainingConfig,
    rng: ChaCha8Rng,
}

impl SomTrainer {
    /// Creates a new trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self { config, rng }
    }

    /// Returns the training configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Builds the decay schedule this trainer would use on `map`.
    pub fn schedule(&self, map: &Map) -> Result<DecaySchedule> {
        DecaySchedule::new(map.map_radius(), self.config.iterations, self.config.learning_rate)
    }

    /// Trains `map` on `data`.
    pub fn train(&mut self, map: &mut Map, data: &[Vec<f64>]) -> Result<TrainingReport> {
        self.train_with_progress(map, data, |_, _, _, _| {})
    }

    /// Trains `map` on `data`, calling `progress(done, total, lr, radius)`
    /// every `progress_interval` iterations and after the last one.
    pub fn train_with_progress<F>(
        &mut self,
        map: &mut Map,
        data: &[Vec<f64>],
        progress: F,
    ) -> Result<TrainingReport>
    where
        F: FnMut(usize, usize, f64, f64),
    {
        self.config.validate()?;
        let iterations = self.config.iterations;

        info!(
            "Training map: {} vectors, {}x{} nodes, {} iterations, lr={}",
            data.len(),
            map.width(),
            map.height(),
            iterations,
            self.config.learning_rate
        );

        // The loop reinitializes from this same generator state, so the clone
        // starts from identical weights.
        let mut init_rng = self.rng.clone();
        let mut initial = map.clone();
        initial.initialize_weights(data, &mut init_rng)?;
        let initial_quantization_error = initial.quantization_error(data)?;

        let outcome = run(
            map,
            data,
            iterations,
            self.config.learning_rate,
            self.config.progress_interval,
            &mut self.rng,
            progress,
        )?;

        let final_quantization_error = map.quantization_error(data)?;

        info!(
            "Training completed: quantization error {:.4} -> {:.4}",
            initial_quantization_error, final_quantization_error
        );

        Ok(TrainingReport {
            iterations,
            initial_quantization_error,
            final_quantization_error,
            final_learning_rate: outcome.final_learning_rate,
            final_radius: outcome.final_radius,
        })
    }
}
