//! Confusion matrix and per-class classification metrics.

use std::fmt;

/// A confusion matrix over string class labels.
///
/// Classes are kept in sorted order. Entry `as_rows()[t][p]` counts how many
/// records of class `classes()[t]` were predicted as `classes()[p]`.
/// Predictions of `None` (every tree abstained) are tallied separately and
/// count as misses.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    classes: Vec<String>,
    matrix: Vec<Vec<usize>>,
    abstained: Vec<usize>,
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    /// The class label.
    pub class: String,
    /// Precision: TP / (TP + FP). 0.0 if no predictions for this class.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no true records for this class.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of true records in this class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from `(expected, predicted)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let pairs: Vec<_> = pairs.into_iter().collect();

        let mut classes: Vec<String> = pairs
            .iter()
            .flat_map(|&(expected, predicted)| std::iter::once(expected).chain(predicted))
            .map(str::to_string)
            .collect();
        classes.sort_unstable();
        classes.dedup();

        let n = classes.len();
        let mut matrix = vec![vec![0usize; n]; n];
        let mut abstained = vec![0usize; n];
        let index = |class: &str| classes.binary_search_by(|c| c.as_str().cmp(class)).ok();
        for (expected, predicted) in pairs {
            let Some(t) = index(expected) else { continue };
            match predicted.and_then(index) {
                Some(p) => matrix[t][p] += 1,
                None => abstained[t] += 1,
            }
        }
        Self {
            classes,
            matrix,
            abstained,
        }
    }

    /// Overall accuracy: proportion of correct predictions. 0.0 when empty.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.classes.len()).map(|i| self.matrix[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Per-class precision, recall, F1, and support, in class order.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.classes.len();
        (0..n)
            .map(|c| {
                let tp = self.matrix[c][c];
                let fp: usize = (0..n).filter(|&i| i != c).map(|i| self.matrix[i][c]).sum();
                let support: usize = self.matrix[c].iter().sum::<usize>() + self.abstained[c];
                let precision = if tp + fp == 0 {
                    0.0
                } else {
                    tp as f64 / (tp + fp) as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: self.classes[c].clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Class labels, sorted.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Number of records no tree voted on, per true class.
    #[must_use]
    pub fn abstained(&self) -> &[usize] {
        &self.abstained
    }

    /// Total number of records tallied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum::<usize>() + self.abstained.iter().sum::<usize>()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(String::len)
            .chain(std::iter::once("abstained".len()))
            .max()
            .unwrap_or(0);

        // Header row
        write!(f, "{:>width$}", "")?;
        for class in &self.classes {
            write!(f, " {class:>width$}")?;
        }
        writeln!(f, " {:>width$}", "abstained")?;

        // Data rows
        for ((class, row), abstained) in self.classes.iter().zip(&self.matrix).zip(&self.abstained) {
            write!(f, "{class:>width$}")?;
            for val in row {
                write!(f, " {val:>width$}")?;
            }
            writeln!(f, " {abstained:>width$}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cm(pairs: &[(&'static str, Option<&'static str>)]) -> ConfusionMatrix {
        ConfusionMatrix::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn perfect_predictions() {
        let m = cm(&[("a", Some("a")), ("b", Some("b")), ("c", Some("c"))]);
        assert!((m.accuracy() - 1.0).abs() < f64::EPSILON);
        for metrics in m.class_metrics() {
            assert!((metrics.precision - 1.0).abs() < f64::EPSILON);
            assert!((metrics.recall - 1.0).abs() < f64::EPSILON);
            assert!((metrics.f1 - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn known_confusion_matrix() {
        let m = cm(&[
            ("x", Some("x")),
            ("x", Some("x")),
            ("x", Some("y")),
            ("y", Some("y")),
            ("y", Some("y")),
            ("y", Some("z")),
            ("z", Some("z")),
            ("z", Some("z")),
            ("z", Some("x")),
        ]);
        assert_eq!(m.classes(), &["x", "y", "z"]);
        let metrics = m.class_metrics();
        assert!((metrics[0].precision - 2.0 / 3.0).abs() < 1e-10);
        assert!((metrics[0].recall - 2.0 / 3.0).abs() < 1e-10);
        assert_eq!(metrics[0].support, 3);
        assert_eq!(metrics[0].class, "x");
        assert!((m.accuracy() - 6.0 / 9.0).abs() < 1e-10);
    }

    #[test]
    fn classes_are_sorted_union() {
        let m = cm(&[("b", Some("c")), ("a", Some("a"))]);
        assert_eq!(m.classes(), &["a", "b", "c"]);
        assert_eq!(m.as_rows()[1], vec![0, 0, 1]);
        // "c" was only predicted, never expected.
        assert_eq!(m.class_metrics()[2].support, 0);
        assert_eq!(m.class_metrics()[2].recall, 0.0);
    }

    #[test]
    fn abstentions_count_as_misses() {
        let m = cm(&[("a", Some("a")), ("a", None)]);
        assert!((m.accuracy() - 0.5).abs() < f64::EPSILON);
        assert_eq!(m.abstained(), &[1]);
        assert_eq!(m.total(), 2);
        let metrics = &m.class_metrics()[0];
        assert_eq!(metrics.support, 2);
        assert!((metrics.recall - 0.5).abs() < f64::EPSILON);
        assert!((metrics.precision - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_matrix() {
        let m = cm(&[]);
        assert!(m.classes().is_empty());
        assert_eq!(m.accuracy(), 0.0);
        assert!(m.class_metrics().is_empty());
    }

    #[test]
    fn display_formatting() {
        let output = cm(&[("no", Some("no")), ("yes", Some("no"))]).to_string();
        assert!(output.contains("abstained"));
        assert!(output.lines().nth(1).is_some_and(|l| l.trim_start().starts_with("no")));
        assert_eq!(output.lines().count(), 3);
    }
}
