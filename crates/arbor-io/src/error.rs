//! I/O error types for arbor-io.

use std::path::PathBuf;

use arbor_forest::ForestError;

/// Errors from CSV loading, discretization, and sweep result writing.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the header row is blank.
    #[error("no attributes declared in header of {path}")]
    NoAttributes {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when two header columns share a name.
    #[error("duplicate attribute \"{attribute}\" in header of {path}")]
    DuplicateAttribute {
        /// Path to the CSV file.
        path: PathBuf,
        /// The repeated column name.
        attribute: String,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when the discretization level is zero.
    #[error("discretization level must be at least 1, got {levels}")]
    InvalidDiscretizationLevel {
        /// The invalid level provided.
        levels: usize,
    },

    /// Returned when the loaded rows do not form a valid dataset.
    #[error("invalid dataset")]
    Dataset(#[from] ForestError),

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be created or flushed.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result row cannot be serialized.
    #[error("cannot write CSV row to {path}")]
    CsvWrite {
        /// Path to the output file.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },
}
