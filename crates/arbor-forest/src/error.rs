/// Errors from dataset construction, training and classification.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when a record handed to a tree lacks the attribute a node splits on.
    #[error("record has no value for split attribute \"{attribute}\"")]
    MissingAttribute {
        /// The attribute the record is missing.
        attribute: String,
    },

    /// Returned when a record handed to [`Dataset::new`](crate::Dataset::new) is incomplete.
    #[error("record {record_index} has no value for attribute \"{attribute}\"")]
    MissingValue {
        /// Zero-based index of the offending record.
        record_index: usize,
        /// The attribute the record is missing.
        attribute: String,
    },

    /// Returned when a dataset is declared with no attributes (not even a target).
    #[error("dataset must declare at least one attribute (the target)")]
    NoAttributes,

    /// Returned when the same attribute name is declared twice.
    #[error("attribute \"{attribute}\" is declared more than once")]
    DuplicateAttribute {
        /// The repeated attribute name.
        attribute: String,
    },

    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when sample_ratio is not in (0.0, 1.0].
    #[error("sample_ratio must be in (0.0, 1.0], got {ratio}")]
    InvalidSampleRatio {
        /// The invalid ratio provided.
        ratio: f64,
    },

    /// Returned when n_folds is less than 2.
    #[error("n_folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The invalid n_folds value provided.
        n_folds: usize,
    },

    /// Returned when sampling without replacement asks for more records than exist.
    #[error("cannot draw {requested} records without replacement from {available}")]
    SampleTooLarge {
        /// Number of records requested.
        requested: usize,
        /// Number of records in the dataset.
        available: usize,
    },

    /// Returned when every fold would be empty, so there is nothing to evaluate.
    #[error("{n_records} records cannot fill {n_folds} folds")]
    TooFewRecordsForFolds {
        /// Number of records in the dataset.
        n_records: usize,
        /// The requested number of folds.
        n_folds: usize,
    },
}
