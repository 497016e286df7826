//! Training data loading and preprocessing.
//!
//! Data files hold one vector per line with whitespace-separated numeric
//! fields. Label files hold one label per line, parallel to a data file.

use crate::config::WeightBounds;
use crate::error::{Result, SofmError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Checks that `data` is non-empty and rectangular.
///
/// Returns the shared dimensionality.
pub fn validate_matrix(data: &[Vec<f64>]) -> Result<usize> {
    let first = data
        .first()
        .ok_or_else(|| SofmError::InvalidInput("Training data is empty".to_string()))?;

    let dim = first.len();
    if dim == 0 {
        return Err(SofmError::InvalidInput(
            "Training vectors have no components".to_string(),
        ));
    }

    if let Some((row, v)) = data.iter().enumerate().find(|(_, v)| v.len() != dim) {
        return Err(SofmError::InvalidInput(format!(
            "Vector {} has {} components, expected {}",
            row,
            v.len(),
            dim
        )));
    }

    Ok(dim)
}

/// Parses whitespace-separated vectors, one per line.
pub fn parse_vectors<R: BufRead>(reader: R) -> Result<Vec<Vec<f64>>> {
    let mut vectors = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let vector = line
            .split_whitespace()
            .map(|field| {
                field.parse::<f64>().map_err(|e| SofmError::Parse {
                    line: i + 1,
                    message: format!("{:?}: {}", field, e),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        vectors.push(vector);
    }

    Ok(vectors)
}

/// Reads a data file.
pub fn read_vectors<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<f64>>> {
    let file = File::open(path)?;
    parse_vectors(BufReader::new(file))
}

/// Parses labels, one per line.
pub fn parse_labels<R: BufRead>(reader: R) -> Result<Vec<String>> {
    reader
        .lines()
        .map(|line| line.map_err(SofmError::from))
        .collect()
}

/// Reads a label file.
pub fn read_labels<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let file = File::open(path)?;
    parse_labels(BufReader::new(file))
}

/// Binarizes every value to one of the two weight bounds.
pub fn binarize(data: &[Vec<f64>], bounds: &WeightBounds) -> Vec<Vec<f64>> {
    data.iter()
        .map(|v| v.iter().map(|&x| bounds.snap(x)).collect())
        .collect()
}
