//! Contiguous k-fold cross-validation for Random Forest.

use tracing::{debug, info, instrument, trace};

use crate::config::RandomForestConfig;
use crate::confusion::ConfusionMatrix;
use crate::dataset::Dataset;
use crate::error::ForestError;

/// Cross-validation configuration.
///
/// Folds are contiguous slices of the dataset in record order. With
/// `n` records and `k` folds each fold holds out `floor(n / k)` records;
/// the trailing `n mod k` records are never held out nor trained on.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
}

/// Outcome of one evaluated fold.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldResult {
    /// Zero-based fold index.
    pub fold: usize,
    /// Number of records the fold's forest was trained on.
    pub n_train: usize,
    /// Number of held-out records.
    pub n_test: usize,
    /// Number of held-out records classified correctly.
    pub n_correct: usize,
    /// `n_correct / n_test`.
    pub accuracy: f64,
}

/// Results of k-fold cross-validation.
#[derive(Debug, Clone)]
pub struct CrossValidationResult {
    /// One entry per evaluated fold, in fold order.
    pub fold_results: Vec<FoldResult>,
    /// Aggregated confusion matrix over every held-out prediction.
    pub confusion_matrix: ConfusionMatrix,
    /// Mean accuracy across evaluated folds.
    pub mean_accuracy: f64,
    /// Population standard deviation of fold accuracies.
    pub std_accuracy: f64,
    /// Number of folds requested.
    pub n_folds: usize,
    /// Total number of records in the evaluated dataset.
    pub n_records: usize,
}

impl CrossValidationResult {
    /// Per-fold accuracies, in fold order.
    #[must_use]
    pub fn fold_accuracies(&self) -> Vec<f64> {
        self.fold_results.iter().map(|r| r.accuracy).collect()
    }
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, ForestError> {
        if n_folds < 2 {
            return Err(ForestError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds })
    }

    /// Return the number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Run k-fold cross-validation.
    ///
    /// Fold `i` trains a forest with seed `config.seed() + i` on every record
    /// outside `[i * size, (i + 1) * size)` and classifies the records inside
    /// it. A prediction of `None` counts as incorrect.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::TooFewRecordsForFolds`] | fewer records than folds |
    /// | [`ForestError::MissingAttribute`] | a held-out record lacks a split attribute |
    /// | Other forest errors | From underlying training |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_records = dataset.len()))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        dataset: &Dataset,
    ) -> Result<CrossValidationResult, ForestError> {
        let n_records = dataset.len();
        let fold_size = n_records / self.n_folds;
        let used = fold_size * self.n_folds;
        if fold_size == 0 {
            return Err(ForestError::TooFewRecordsForFolds {
                n_records,
                n_folds: self.n_folds,
            });
        }

        // Trailing remainder takes part in no fold.
        let (usable, _) = dataset.split(0, used);

        let mut fold_results = Vec::with_capacity(self.n_folds);
        let mut outcomes: Vec<(String, Option<String>)> = Vec::with_capacity(used);

        for fold in 0..self.n_folds {
            let (test, train) = usable.split(fold * fold_size, (fold + 1) * fold_size);
            if test.is_empty() || train.is_empty() {
                debug!(fold, n_train = train.len(), n_test = test.len(), "skipping empty fold");
                continue;
            }

            // Each fold trains with different randomness.
            let fold_config = config
                .clone()
                .with_seed(config.seed().wrapping_add(fold as u64));
            let forest = fold_config.fit(&train)?;
            trace!(fold, "forest:\n{forest}");

            let mut n_correct = 0;
            for (prediction, expected) in forest.classify_many(test.records()).zip(test.target_values()) {
                let prediction = prediction?;
                let correct = prediction == Some(expected);
                debug!(result = ?prediction, expected, correct, "classified held-out record");
                if correct {
                    n_correct += 1;
                }
                outcomes.push((expected.to_string(), prediction.map(str::to_string)));
            }

            let accuracy = n_correct as f64 / test.len() as f64;
            info!(fold, accuracy, "fold completed");
            fold_results.push(FoldResult {
                fold,
                n_train: train.len(),
                n_test: test.len(),
                n_correct,
                accuracy,
            });
        }

        if fold_results.is_empty() {
            return Err(ForestError::TooFewRecordsForFolds {
                n_records,
                n_folds: self.n_folds,
            });
        }

        let n_evaluated = fold_results.len() as f64;
        let mean_accuracy = fold_results.iter().map(|r| r.accuracy).sum::<f64>() / n_evaluated;
        let std_accuracy = {
            let variance = fold_results
                .iter()
                .map(|r| (r.accuracy - mean_accuracy).powi(2))
                .sum::<f64>()
                / n_evaluated;
            variance.sqrt()
        };

        let confusion_matrix = ConfusionMatrix::from_pairs(
            outcomes
                .iter()
                .map(|(expected, predicted)| (expected.as_str(), predicted.as_deref())),
        );

        info!(mean_accuracy, std_accuracy, "cross-validation complete");

        Ok(CrossValidationResult {
            fold_results,
            confusion_matrix,
            mean_accuracy,
            std_accuracy,
            n_folds: self.n_folds,
            n_records,
        })
    }
}
