//! CSV dataset reader with input validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use arbor_forest::{Dataset, Record};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads a categorical dataset from a CSV file.
///
/// Expected CSV format:
/// - Header row required; each column names one attribute
/// - The last column is the target (class label)
/// - One record per row, all rows must have the same number of columns
/// - Every cell is trimmed of surrounding whitespace
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoAttributes`] | Header row is blank |
/// | [`IoError::DuplicateAttribute`] | Two header columns share a name |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
pub struct DatasetReader {
    path: PathBuf,
    delimiter: u8,
}

impl DatasetReader {
    /// Create a new comma-delimited reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter: b',',
        }
    }

    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Return the path this reader loads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }

    /// Read and validate the CSV file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) allows rows with varying column counts so that our own
        // InconsistentRowLength check fires instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?;
        if header.iter().all(str::is_empty) {
            return Err(IoError::NoAttributes {
                path: self.path.clone(),
            });
        }
        let attributes: Vec<String> = header.iter().map(str::to_string).collect();
        let mut seen = HashSet::with_capacity(attributes.len());
        if let Some(duplicate) = attributes.iter().find(|a| !seen.insert(a.as_str())) {
            return Err(IoError::DuplicateAttribute {
                path: self.path.clone(),
                attribute: duplicate.clone(),
            });
        }
        let expected = attributes.len();
        debug!(expected_cols = expected, target = %attributes[expected - 1], "read CSV header");

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let row = result.map_err(|e| self.csv_error(e))?;
            if row.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: row.len(),
                });
            }
            let record: Record = attributes.iter().map(String::as_str).zip(row.iter()).collect();
            records.push(record);
        }

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let dataset = Dataset::new(attributes, records)?;
        info!(
            n_records = dataset.len(),
            n_attributes = dataset.feature_attributes().len(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_dataset() {
        let csv = "color,size,class\nred,big,yes\nred,small,yes\nblue,big,no\nblue,small,no\n";
        let f = write_csv(csv);
        let ds = DatasetReader::new(f.path()).read().unwrap();
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.attributes(), &["color", "size", "class"]);
        assert_eq!(ds.target_attribute(), "class");
        assert_eq!(ds.records()[2].get("color"), Some("blue"));
    }

    #[test]
    fn cells_are_trimmed() {
        let csv = "color , class\n  red ,yes  \n";
        let f = write_csv(csv);
        let ds = DatasetReader::new(f.path()).read().unwrap();
        assert_eq!(ds.attributes(), &["color", "class"]);
        assert_eq!(ds.records()[0].get("color"), Some("red"));
        assert_eq!(ds.records()[0].get("class"), Some("yes"));
    }

    #[test]
    fn custom_delimiter() {
        let csv = "color;class\nred;yes\nblue;no\n";
        let f = write_csv(csv);
        let ds = DatasetReader::new(f.path()).with_delimiter(b';').read().unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1].get("class"), Some("no"));
    }

    #[test]
    fn insertion_order_preserved() {
        let csv = "id,class\nzzz,a\naaa,b\nmmm,a\n";
        let f = write_csv(csv);
        let ds = DatasetReader::new(f.path()).read().unwrap();
        let ids: Vec<_> = ds.records().iter().filter_map(|r| r.get("id")).collect();
        assert_eq!(ids, vec!["zzz", "aaa", "mmm"]);
    }

    #[test]
    fn error_file_not_found() {
        let result = DatasetReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_csv("color,size,class\n");
        let result = DatasetReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let csv = "color,size,class\nred,big,yes\nblue,no\n";
        let f = write_csv(csv);
        let result = DatasetReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength {
                row_index: 1,
                expected: 3,
                got: 2,
                ..
            })
        ));
    }

    #[test]
    fn error_duplicate_attribute() {
        let csv = "color,color,class\nred,red,yes\n";
        let f = write_csv(csv);
        let result = DatasetReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::DuplicateAttribute { attribute, .. }) if attribute == "color"
        ));
    }

    #[test]
    fn single_column_is_target_only() {
        let csv = "class\nyes\nno\nyes\n";
        let f = write_csv(csv);
        let ds = DatasetReader::new(f.path()).read().unwrap();
        assert!(ds.feature_attributes().is_empty());
        assert_eq!(ds.majority_class(), Some("yes"));
    }
}
