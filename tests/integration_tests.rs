//! Integration tests for the SOFM engine.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sofm::data::{binarize, parse_labels, parse_vectors, read_vectors};
use sofm::{
    Map, MapConfig, MapFormat, Report, ResponseMatrix, SofmError, SomTrainer, TrainingConfig,
    WeightBounds,
};
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

/// Two well separated 2D clusters around (0, 0) and (10, 10).
fn create_clusters() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 0.0],
        vec![0.5, 0.2],
        vec![0.1, 0.6],
        vec![0.3, 0.3],
        vec![10.0, 10.0],
        vec![10.4, 9.7],
        vec![9.8, 10.3],
        vec![10.2, 10.1],
    ]
}

fn grid_distance_squared(map: &Map, a: usize, b: usize) -> f64 {
    map.get(a).unwrap().grid_distance_squared(map.get(b).unwrap())
}

#[test]
fn test_training_reduces_quantization_error() {
    let data = create_clusters();

    let mut initialized = Map::new(4, 4).unwrap();
    initialized
        .train(&data, 0, 0.5, &mut ChaCha8Rng::seed_from_u64(17))
        .unwrap();

    let mut trained = Map::new(4, 4).unwrap();
    trained
        .train(&data, 200, 0.5, &mut ChaCha8Rng::seed_from_u64(17))
        .unwrap();

    let before = initialized.quantization_error(&data).unwrap();
    let after = trained.quantization_error(&data).unwrap();
    assert!(after < before, "expected {} < {}", after, before);
}

#[test]
fn test_trainer_report() {
    let data = create_clusters();
    let config = TrainingConfig {
        iterations: 200,
        learning_rate: 0.5,
        seed: Some(3),
        progress_interval: 50,
    };

    let mut map = Map::new(5, 5).unwrap();
    let report = SomTrainer::new(config).train(&mut map, &data).unwrap();

    assert_eq!(report.iterations, 200);
    assert!(report.final_quantization_error < report.initial_quantization_error);
    assert!(report.final_learning_rate < 0.5);
    assert!(report.final_radius < map.map_radius());
}

#[test]
fn test_four_by_four_scenario() {
    let data = vec![
        vec![0.0, 0.0],
        vec![1.0, 1.0],
        vec![10.0, 10.0],
        vec![11.0, 11.0],
    ];

    let mut map = Map::new(4, 4).unwrap();
    map.train(&data, 100, 0.5, &mut ChaCha8Rng::seed_from_u64(301))
        .unwrap();

    let origin = map.probe(&data[0]).unwrap().id;
    let one = map.probe(&data[1]).unwrap().id;
    let ten = map.probe(&data[2]).unwrap().id;
    let eleven = map.probe(&data[3]).unwrap().id;

    // Adjacent includes diagonal neighbors
    assert!(grid_distance_squared(&map, origin, one) <= 2.0);
    assert!(grid_distance_squared(&map, ten, origin) > grid_distance_squared(&map, ten, eleven));
}

#[test]
fn test_degenerate_grid_fails_fast() {
    let data = create_clusters();
    for (w, h) in [(1, 1), (2, 2), (2, 1)] {
        let mut map = Map::new(w, h).unwrap();
        let err = map
            .train(&data, 10, 0.5, &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, SofmError::InvalidConfiguration(_)));
        assert!(!map.is_initialized());
    }
}

#[test]
fn test_loaded_map_retrains_from_scratch() {
    let data = create_clusters();
    let dir = tempdir().unwrap();
    let path = dir.path().join("map.sofm");

    let mut original = Map::new(4, 4).unwrap();
    original
        .train(&data, 100, 0.5, &mut ChaCha8Rng::seed_from_u64(5))
        .unwrap();
    original.save(&path).unwrap();

    let mut loaded = Map::load(&path).unwrap();
    let mut fresh = Map::new(4, 4).unwrap();
    loaded
        .train(&data, 50, 0.5, &mut ChaCha8Rng::seed_from_u64(6))
        .unwrap();
    fresh
        .train(&data, 50, 0.5, &mut ChaCha8Rng::seed_from_u64(6))
        .unwrap();

    assert_eq!(loaded, fresh);
}

#[test]
fn test_map_save_load_roundtrip() {
    let data = create_clusters();
    let mut map = Map::from_config(&MapConfig {
        width: 6,
        height: 3,
        bounds: WeightBounds::default(),
    })
    .unwrap();
    map.train(&data, 150, 0.3, &mut ChaCha8Rng::seed_from_u64(99))
        .unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("roundtrip.sofm");
    map.save(&path).unwrap();
    let loaded = Map::load(&path).unwrap();

    assert_eq!(loaded.size(), map.size());
    assert_eq!(loaded.width(), 6);
    assert_eq!(loaded.height(), 3);
    for (a, b) in map.nodes().iter().zip(loaded.nodes()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
        assert!(a
            .weights
            .iter()
            .zip(&b.weights)
            .all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    // Probing the loaded map gives the same answers
    for v in &data {
        assert_eq!(map.probe(v).unwrap().id, loaded.probe(v).unwrap().id);
    }
}

#[test]
fn test_load_garbage_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garbage.sofm");
    fs::write(&path, b"definitely not a map").unwrap();

    assert!(matches!(
        Map::load(&path),
        Err(SofmError::Deserialization(_))
    ));
    assert!(matches!(
        Map::load(dir.path().join("missing.sofm")),
        Err(SofmError::Io(_))
    ));
}

#[test]
fn test_threshold_after_training() {
    let data = create_clusters();
    let mut map = Map::new(4, 4).unwrap();
    map.train(&data, 100, 0.5, &mut ChaCha8Rng::seed_from_u64(12))
        .unwrap();
    map.threshold();

    for node in map.nodes() {
        assert!(node.weights.iter().all(|&w| w == 1.0 || w == -1.0));
    }
}

#[test]
fn test_probe_dimension_mismatch() {
    let data = create_clusters();
    let mut map = Map::new(3, 3).unwrap();
    map.train(&data, 20, 0.5, &mut ChaCha8Rng::seed_from_u64(1))
        .unwrap();

    assert!(matches!(
        map.probe(&[1.0]),
        Err(SofmError::DimensionMismatch { expected: 2, got: 1 })
    ));
}

#[test]
fn test_end_to_end_report() {
    let data = parse_vectors(Cursor::new("0 0\n0.4 0.1\n10 10\n9.6 10.2\n")).unwrap();
    let labels = parse_labels(Cursor::new("a\nb\nc\nd\n")).unwrap();

    let mut map = Map::new(4, 4).unwrap();
    map.train(&data, 200, 0.5, &mut ChaCha8Rng::seed_from_u64(8))
        .unwrap();

    let mut report = Report::new();
    report.push_dataset("Train", &map, &labels, &data).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("report.txt");
    report.save(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Train Response Matrix\n"));
    assert!(text.contains("Train Label Matrix\n"));
    // Every node of the label matrix carries a label
    let label_matrix = ResponseMatrix::nearest_label(&map, &labels, &data).unwrap();
    assert!(label_matrix.cells().iter().all(|c| c.is_some()));
    assert!(text.contains(&label_matrix.to_string()));

    // Two sections, four grid rows each
    assert_eq!(text.lines().filter(|l| l.split('\t').count() == 4).count(), 8);
}

#[test]
fn test_read_vectors_and_binarize() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.txt");
    fs::write(&path, "0.5 -0.5\n-2 3\n").unwrap();

    let data = read_vectors(&path).unwrap();
    assert_eq!(data, vec![vec![0.5, -0.5], vec![-2.0, 3.0]]);

    let scaled = binarize(&data, &WeightBounds::default());
    assert_eq!(scaled, vec![vec![1.0, -1.0], vec![-1.0, 1.0]]);

    fs::write(&path, "1 2\nx 3\n").unwrap();
    assert!(matches!(
        read_vectors(&path),
        Err(SofmError::Parse { line: 2, .. })
    ));
}

#[test]
fn test_format_rejects_other_version() {
    let mut map = Map::new(3, 3).unwrap();
    map.train(&create_clusters(), 10, 0.5, &mut ChaCha8Rng::seed_from_u64(2))
        .unwrap();

    let mut bytes = Vec::new();
    MapFormat::write(&map, &mut bytes).unwrap();
    bytes[4] = 0xFF;

    assert!(matches!(
        MapFormat::read(bytes.as_slice()),
        Err(SofmError::Deserialization(_))
    ));
}
