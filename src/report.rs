//! Response-matrix reports for trained maps.
//!
//! A response matrix lays labels out on the map grid: one tab-separated cell
//! per node, one grid row per line, `-` for nodes without a label.

use crate::error::{Result, SofmError};
use crate::som::Map;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Placeholder for nodes without a label.
pub const EMPTY_CELL: &str = "-";

/// Labels arranged on the map grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMatrix {
    width: usize,
    cells: Vec<Option<String>>,
}

fn check_parallel(labels: &[String], data: &[Vec<f64>]) -> Result<()> {
    if labels.len() != data.len() {
        return Err(SofmError::InvalidInput(format!(
            "{} labels for {} vectors",
            labels.len(),
            data.len()
        )));
    }
    Ok(())
}

impl ResponseMatrix {
    /// Places each label on the best matching node of its vector.
    ///
    /// When several vectors land on one node, the last label wins.
    pub fn probe(map: &Map, labels: &[String], data: &[Vec<f64>]) -> Result<Self> {
        check_parallel(labels, data)?;

        let mut cells = vec![None; map.size()];
        for (label, vector) in labels.iter().zip(data) {
            let idx = map.probe_index(vector)?;
            cells[idx] = Some(label.clone());
        }

        Ok(Self {
            width: map.width(),
            cells,
        })
    }

    /// Marks every node with the label of its closest labeled vector.
    ///
    /// A label that appears more than once is represented by its last vector.
    /// Ties go to the label that appeared first.
    pub fn nearest_label(map: &Map, labels: &[String], data: &[Vec<f64>]) -> Result<Self> {
        check_parallel(labels, data)?;

        let mut order: Vec<(&str, &[f64])> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (label, vector) in labels.iter().zip(data) {
            match seen.get(label.as_str()) {
                Some(&slot) => order[slot].1 = vector.as_slice(),
                None => {
                    seen.insert(label.as_str(), order.len());
                    order.push((label.as_str(), vector.as_slice()));
                }
            }
        }

        let mut cells = Vec::with_capacity(map.size());
        for node in map.nodes() {
            let mut best: Option<(&str, f64)> = None;
            for &(label, vector) in &order {
                let dist = node.distance(vector)?;
                if best.map_or(true, |(_, d)| dist < d) {
                    best = Some((label, dist));
                }
            }
            cells.push(best.map(|(label, _)| label.to_string()));
        }

        Ok(Self {
            width: map.width(),
            cells,
        })
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Cells in node order.
    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    /// Label at a node id, if any.
    pub fn get(&self, id: usize) -> Option<&str> {
        self.cells.get(id).and_then(|c| c.as_deref())
    }
}

impl fmt::Display for ResponseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (j, cell) in self.cells.iter().enumerate() {
            f.write_str(cell.as_deref().unwrap_or(EMPTY_CELL))?;
            if (j + 1) % self.width == 0 {
                f.write_str("\n")?;
            } else {
                f.write_str("\t")?;
            }
        }
        Ok(())
    }
}

/// A sequence of titled response matrices.
#[derive(Debug, Clone, Default)]
pub struct Report {
    sections: Vec<(String, ResponseMatrix)>,
}

impl Report {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a titled matrix.
    pub fn push(&mut self, title: impl Into<String>, matrix: ResponseMatrix) {
        self.sections.push((title.into(), matrix));
    }

    /// Appends the response and label matrices for one labeled dataset.
    pub fn push_dataset(
        &mut self,
        name: &str,
        map: &Map,
        labels: &[String],
        data: &[Vec<f64>],
    ) -> Result<()> {
        self.push(
            format!("{} Response Matrix", name),
            ResponseMatrix::probe(map, labels, data)?,
        );
        self.push(
            format!("{} Label Matrix", name),
            ResponseMatrix::nearest_label(map, labels, data)?,
        );
        Ok(())
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns true if the report has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Writes the report to any writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        write!(writer, "{}", self)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the report to a file, creating or truncating it.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (title, matrix) in &self.sections {
            writeln!(f, "{}", title)?;
            write!(f, "{}", matrix)?;
            f.write_str("\n\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// 2x2 map whose nodes sit at the corners of the unit square.
    fn corner_map() -> Map {
        let mut map = Map::new(2, 2).unwrap();
        let corners = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        for (node, w) in map.nodes_mut().iter_mut().zip(corners) {
            node.weights = w.to_vec();
        }
        map
    }

    #[test]
    fn test_probe_matrix() {
        let map = corner_map();
        let data = vec![vec![0.1, 0.0], vec![0.9, 0.9], vec![0.0, 0.2]];
        let matrix = ResponseMatrix::probe(&map, &labels(&["a", "b", "c"]), &data).unwrap();

        // "c" lands on node 0 after "a" and replaces it
        assert_eq!(matrix.get(0), Some("c"));
        assert_eq!(matrix.get(1), None);
        assert_eq!(matrix.get(3), Some("b"));
        assert_eq!(matrix.to_string(), "c\t-\n-\tb\n");
    }

    #[test]
    fn test_nearest_label_matrix() {
        let map = corner_map();
        let data = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        let matrix =
            ResponseMatrix::nearest_label(&map, &labels(&["low", "high"]), &data).unwrap();

        // Nodes 1 and 2 are equidistant; the first label wins
        assert_eq!(matrix.to_string(), "low\tlow\nlow\thigh\n");
    }

    #[test]
    fn test_nearest_label_duplicate_uses_last_vector() {
        let map = corner_map();
        let data = vec![vec![0.0, 0.0], vec![1.0, 1.0]];
        let matrix = ResponseMatrix::nearest_label(&map, &labels(&["x", "x"]), &data).unwrap();
        assert!(matrix.cells().iter().all(|c| c.as_deref() == Some("x")));
    }

    #[test]
    fn test_mismatched_labels() {
        let map = corner_map();
        let err = ResponseMatrix::probe(&map, &labels(&["a"]), &[]).unwrap_err();
        assert!(matches!(err, SofmError::InvalidInput(_)));
    }

    #[test]
    fn test_report_rendering() {
        let map = corner_map();
        let data = vec![vec![0.0, 0.0]];
        let mut report = Report::new();
        report.push_dataset("Train", &map, &labels(&["a"]), &data).unwrap();

        assert_eq!(report.len(), 2);
        let text = report.to_string();
        assert!(text.starts_with("Train Response Matrix\na\t-\n-\t-\n\n\n"));
        assert!(text.contains("Train Label Matrix\na\ta\na\ta\n\n\n"));

        let mut buf = Vec::new();
        report.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), text);
    }
}
