//! SOFM CLI - Self-Organizing Feature Maps
//!
//! Trains a map from a whitespace-separated data file, optionally saves it,
//! and writes response-matrix reports for training and test data.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use sofm::data::{binarize, read_labels, read_vectors};
use sofm::{Map, MapConfig, Report, Result, SomTrainer, TrainingConfig, WeightBounds};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "sofm")]
#[command(version)]
#[command(about = "Self organized feature mapping tool", long_about = None)]
struct Cli {
    /// Width of the grid
    #[arg(long, required_unless_present = "load")]
    width: Option<usize>,

    /// Height of the grid
    #[arg(long, required_unless_present = "load")]
    height: Option<usize>,

    /// Training iterations
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    iterations: u64,

    /// Initial learning rate
    #[arg(long)]
    learning_rate: f64,

    /// Training data file (one whitespace-separated vector per line)
    #[arg(long)]
    train_data: PathBuf,

    /// Training label file (one label per line)
    #[arg(long)]
    train_labels: PathBuf,

    /// Report file for the response matrices
    #[arg(long)]
    output: Option<PathBuf>,

    /// Save the trained map to this file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Load a map from this file instead of creating one
    #[arg(long)]
    load: Option<PathBuf>,

    /// Test data file
    #[arg(long, requires = "test_labels")]
    test_data: Option<PathBuf>,

    /// Test label file
    #[arg(long, requires = "test_data")]
    test_labels: Option<PathBuf>,

    /// Binarize final node weights
    #[arg(long)]
    threshold: bool,

    /// Binarize input vectors before training and probing
    #[arg(long)]
    normalize: bool,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if let Err(e) = run(cli) {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();
    let bounds = WeightBounds::default();

    let mut data = read_vectors(&cli.train_data)?;
    let labels = read_labels(&cli.train_labels)?;
    if cli.normalize {
        data = binarize(&data, &bounds);
    }
    info!(
        "Loaded {} vectors and {} labels from {}",
        data.len(),
        labels.len(),
        cli.train_data.display()
    );

    let mut map = match &cli.load {
        Some(path) => {
            let map = Map::load(path)?;
            warn!(
                "Training {} restarts from freshly initialized weights",
                path.display()
            );
            map
        }
        None => Map::from_config(&MapConfig {
            width: cli.width.unwrap_or_default(),
            height: cli.height.unwrap_or_default(),
            bounds,
        })?,
    };

    let iterations = cli.iterations as usize;
    let config = TrainingConfig {
        iterations,
        learning_rate: cli.learning_rate,
        seed: cli.seed,
        progress_interval: (iterations / 100).max(1),
    };

    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░  ");

    let pb = ProgressBar::new(iterations as u64);
    pb.set_style(bar_style);

    let mut trainer = SomTrainer::new(config);
    let report = trainer.train_with_progress(&mut map, &data, |done, _, lr, radius| {
        pb.set_position(done as u64);
        pb.set_message(format!("lr={:.4} radius={:.2}", lr, radius));
    })?;
    pb.finish_and_clear();

    println!(
        "✓ Trained {}x{} map for {} iterations (quantization error {:.4} -> {:.4})",
        map.width(),
        map.height(),
        report.iterations,
        report.initial_quantization_error,
        report.final_quantization_error
    );

    if cli.threshold {
        map.threshold();
    }

    if let Some(path) = &cli.save {
        map.save(path)?;
        println!("✓ Saved map to {}", path.display());
    }

    if let Some(path) = &cli.output {
        let mut output = Report::new();
        output.push_dataset("Train", &map, &labels, &data)?;

        if let (Some(test_data), Some(test_labels)) = (&cli.test_data, &cli.test_labels) {
            let mut test_vectors = read_vectors(test_data)?;
            let test_labels = read_labels(test_labels)?;
            if cli.normalize {
                test_vectors = binarize(&test_vectors, &bounds);
            }
            output.push_dataset("Test", &map, &test_labels, &test_vectors)?;
        }

        output.save(path)?;
        println!("✓ Wrote report to {}", path.display());
    }

    info!("Done in {:.2?}", start_time.elapsed());
    Ok(())
}
