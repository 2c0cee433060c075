//! Equal-width binning of numeric attributes into categorical levels.

use arbor_forest::{Dataset, Record};
use tracing::{debug, instrument};

use crate::IoError;

/// Replaces numeric attribute values with equal-width bin indices.
///
/// An attribute is numeric when every one of its values parses as a finite
/// `f64`. Its range `[min, max]` is cut into `levels` bins and each value is
/// replaced by `min(floor((v - min) / (max - min) * levels), levels - 1)`.
/// A constant column maps to `"0"`. The target and non-numeric attributes
/// pass through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Discretizer {
    levels: usize,
}

impl Discretizer {
    /// Create a discretizer producing `levels` bins per numeric attribute.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidDiscretizationLevel`] if `levels` is zero.
    pub fn new(levels: usize) -> Result<Self, IoError> {
        if levels == 0 {
            return Err(IoError::InvalidDiscretizationLevel { levels });
        }
        Ok(Self { levels })
    }

    /// Return the number of bins.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Map a value in `[min, max]` to its bin index.
    fn bin(&self, value: f64, min: f64, max: f64) -> usize {
        // A range wider than f64::MAX overflows; halving every operand keeps
        // the ratio and brings the width back into range.
        let (value, min, max) = if (max - min).is_finite() {
            (value, min, max)
        } else {
            (value / 2.0, min / 2.0, max / 2.0)
        };
        let width = max - min;
        if width <= 0.0 {
            return 0;
        }
        let raw = ((value - min) / width * self.levels as f64).floor() as usize;
        raw.min(self.levels - 1)
    }

    /// Return a copy of `dataset` with every numeric attribute binned.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Dataset`] if the rebuilt dataset fails validation.
    #[instrument(skip_all, fields(levels = self.levels, n_records = dataset.len()))]
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset, IoError> {
        let mut records: Vec<Record> = dataset.records().to_vec();

        for attribute in dataset.feature_attributes() {
            let Some(values) = numeric_column(dataset, attribute) else {
                continue;
            };
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            debug!(attribute = %attribute, min, max, "discretizing attribute");

            for (record, &value) in records.iter_mut().zip(&values) {
                record.insert(attribute.as_str(), self.bin(value, min, max).to_string());
            }
        }

        Ok(Dataset::new(dataset.attributes().to_vec(), records)?)
    }
}

/// Parse every value of `attribute` as a finite float, or `None` if any fails.
fn numeric_column(dataset: &Dataset, attribute: &str) -> Option<Vec<f64>> {
    if dataset.is_empty() {
        return None;
    }
    dataset
        .records()
        .iter()
        .map(|r| {
            r.get(attribute)
                .and_then(|raw| raw.parse::<f64>().ok())
                .filter(|v| v.is_finite())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: &[(&str, &str, &str)]) -> Dataset {
        let attributes = vec!["x".to_string(), "label".to_string(), "class".to_string()];
        let records = rows
            .iter()
            .map(|&(x, label, class)| [("x", x), ("label", label), ("class", class)].into_iter().collect())
            .collect();
        Dataset::new(attributes, records).unwrap()
    }

    fn column<'a>(ds: &'a Dataset, attribute: &str) -> Vec<&'a str> {
        ds.records().iter().filter_map(|r| r.get(attribute)).collect()
    }

    #[test]
    fn zero_levels_rejected() {
        assert!(matches!(
            Discretizer::new(0),
            Err(IoError::InvalidDiscretizationLevel { levels: 0 })
        ));
        assert_eq!(Discretizer::new(3).unwrap().levels(), 3);
    }

    #[test]
    fn equal_width_bins() {
        let ds = dataset(&[
            ("0.0", "a", "1"),
            ("2.5", "b", "2"),
            ("5.0", "a", "3"),
            ("7.5", "b", "4"),
            ("10.0", "a", "5"),
        ]);
        let out = Discretizer::new(4).unwrap().apply(&ds).unwrap();
        // Max lands in the last bin rather than a fifth one.
        assert_eq!(column(&out, "x"), vec!["0", "1", "2", "3", "3"]);
    }

    #[test]
    fn range_wider_than_f64_max_still_bins() {
        let ds = dataset(&[
            ("-1e308", "a", "1"),
            ("-5e307", "b", "2"),
            ("0", "a", "3"),
            ("5e307", "b", "4"),
            ("1e308", "a", "5"),
        ]);
        let out = Discretizer::new(4).unwrap().apply(&ds).unwrap();
        assert_eq!(column(&out, "x"), vec!["0", "1", "2", "3", "3"]);
    }

    #[test]
    fn non_numeric_and_target_untouched() {
        let ds = dataset(&[("1", "a", "10"), ("2", "b", "20")]);
        let out = Discretizer::new(2).unwrap().apply(&ds).unwrap();
        assert_eq!(column(&out, "label"), vec!["a", "b"]);
        assert_eq!(column(&out, "class"), vec!["10", "20"]);
        assert_eq!(out.attributes(), ds.attributes());
    }

    #[test]
    fn mixed_column_untouched() {
        let ds = dataset(&[("1", "a", "y"), ("high", "b", "n"), ("3", "a", "y")]);
        let out = Discretizer::new(2).unwrap().apply(&ds).unwrap();
        assert_eq!(column(&out, "x"), vec!["1", "high", "3"]);
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let ds = dataset(&[("4.2", "a", "y"), ("4.2", "b", "n")]);
        let out = Discretizer::new(5).unwrap().apply(&ds).unwrap();
        assert_eq!(column(&out, "x"), vec!["0", "0"]);
    }

    #[test]
    fn non_finite_column_untouched() {
        let ds = dataset(&[("1", "a", "y"), ("NaN", "b", "n")]);
        let out = Discretizer::new(2).unwrap().apply(&ds).unwrap();
        assert_eq!(column(&out, "x"), vec!["1", "NaN"]);
    }
}
