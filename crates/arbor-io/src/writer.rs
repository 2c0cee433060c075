//! CSV writer for hyperparameter sweep results.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;

/// One row of a sweep results file: a single cross-validated run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRecord {
    /// Name of the dataset file the run used.
    pub filename: String,
    /// Maximum tree depth, empty when unlimited.
    pub depth: Option<usize>,
    /// Number of trees in each forest.
    pub trees: usize,
    /// Whether per-tree samples were drawn with replacement.
    pub replacement: bool,
    /// Per-tree sample size as a fraction of the training set.
    pub sample_ratio: f64,
    /// Number of cross-validation folds.
    pub folds: usize,
    /// Discretization level, empty when numeric attributes were left as-is.
    pub discretization: Option<usize>,
    /// Mean cross-validated accuracy.
    pub accuracy: f64,
}

/// Streams [`SweepRecord`] rows to a CSV file.
///
/// Creates the parent directory on construction if it does not exist. The
/// header row is written before the first record.
pub struct SweepWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    n_written: usize,
}

impl SweepWriter {
    /// Create the output file at `path`, truncating any existing file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::OutputDirCreate`] | Parent directory cannot be created |
    /// | [`IoError::WriteFile`] | File cannot be created |
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn create(path: &Path) -> Result<Self, IoError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| IoError::OutputDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
            debug!("output directory ready");
        }
        let file = File::create(path).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: csv::Writer::from_writer(file),
            n_written: 0,
        })
    }

    /// Append one result row.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::CsvWrite`] if the row cannot be serialized or written.
    pub fn write(&mut self, record: &SweepRecord) -> Result<(), IoError> {
        self.writer.serialize(record).map_err(|e| IoError::CsvWrite {
            path: self.path.clone(),
            source: e,
        })?;
        self.n_written += 1;
        Ok(())
    }

    /// Number of rows written so far.
    #[must_use]
    pub fn n_written(&self) -> usize {
        self.n_written
    }

    /// Flush buffered rows to disk.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the flush fails.
    pub fn finish(mut self) -> Result<(), IoError> {
        self.writer.flush().map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        info!(path = %self.path.display(), n_rows = self.n_written, "sweep results written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(filename: &str, depth: Option<usize>, accuracy: f64) -> SweepRecord {
        SweepRecord {
            filename: filename.to_string(),
            depth,
            trees: 8,
            replacement: true,
            sample_ratio: 0.5,
            folds: 4,
            discretization: None,
            accuracy,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let mut writer = SweepWriter::create(&path).unwrap();
        writer.write(&record("a.csv", Some(8), 0.75)).unwrap();
        writer.write(&record("b.csv", None, 1.0)).unwrap();
        assert_eq!(writer.n_written(), 2);
        writer.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "filename,depth,trees,replacement,sample_ratio,folds,discretization,accuracy"
        );
        assert_eq!(lines[1], "a.csv,8,8,true,0.5,4,,0.75");
        assert_eq!(lines[2], "b.csv,,8,true,0.5,4,,1.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/results.csv");
        let writer = SweepWriter::create(&path).unwrap();
        writer.finish().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn output_dir_blocked_by_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let result = SweepWriter::create(&blocker.join("results.csv"));
        assert!(matches!(result, Err(IoError::OutputDirCreate { .. })));
    }
}
