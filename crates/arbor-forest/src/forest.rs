//! Random Forest training with parallel tree construction.

use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::dataset::Dataset;
use crate::error::ForestError;
use crate::tree::DecisionTree;

/// A fitted Random Forest ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
}

/// Train the Random Forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_records = dataset.len()))]
pub(crate) fn train(config: &RandomForestConfig, dataset: &Dataset) -> Result<RandomForest, ForestError> {
    if config.n_trees == 0 {
        return Err(ForestError::InvalidTreeCount {
            n_trees: config.n_trees,
        });
    }
    if !(config.sample_ratio > 0.0 && config.sample_ratio <= 1.0) {
        return Err(ForestError::InvalidSampleRatio {
            ratio: config.sample_ratio,
        });
    }

    let draw_count = config.sample_size(dataset.len());
    info!(
        n_trees = config.n_trees,
        n_records = dataset.len(),
        n_attributes = dataset.feature_attributes().len(),
        draw_count,
        sampling = ?config.sampling,
        "training random forest"
    );

    // Generate per-tree seeds from master RNG.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let sampling = config.sampling;
    let tree_config = config.tree_config();

    // Indexed collect keeps tree order independent of scheduling.
    let trees = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let sample = dataset.sample(draw_count, sampling, &mut rng)?;
            Ok(tree_config.fit(&sample))
        })
        .collect::<Result<Vec<DecisionTree>, ForestError>>()?;

    debug!(n_trees_trained = trees.len(), "tree training complete");

    Ok(RandomForest { trees })
}

impl fmt::Display for RandomForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tree) in self.trees.iter().enumerate() {
            writeln!(f, "Tree number {}: ", i + 1)?;
            writeln!(f, "{tree}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RandomForestConfig;
    use crate::dataset::Sampling;
    use crate::dataset::tests::{color_size, record};
    use crate::error::ForestError;
    use crate::{Dataset, Record};

    /// Three classes, each fully decided by `shape`; `noise` carries no signal.
    fn make_separable_data() -> Dataset {
        let attributes = ["shape", "noise", "class"].map(String::from).to_vec();
        let mut records: Vec<Record> = Vec::new();
        for (shape, class) in [("circle", "a"), ("square", "b"), ("triangle", "c")] {
            for i in 0..12 {
                let noise = if i % 2 == 0 { "on" } else { "off" };
                records.push(record(&[("shape", shape), ("noise", noise), ("class", class)]));
            }
        }
        Dataset::new(attributes, records).unwrap()
    }

    #[test]
    fn three_class_separable_accuracy() {
        let ds = make_separable_data();
        let forest = RandomForestConfig::new(15).unwrap().fit(&ds).unwrap();
        assert_eq!(forest.n_trees(), 15);

        let correct = forest
            .classify_many(ds.records())
            .zip(ds.target_values())
            .filter(|(p, expected)| p.as_ref().is_ok_and(|p| *p == Some(*expected)))
            .count();
        let accuracy = correct as f64 / ds.len() as f64;
        assert!(accuracy > 0.9, "accuracy = {accuracy}");
    }

    #[test]
    fn deterministic_with_same_seed() {
        let ds = make_separable_data();
        let config = RandomForestConfig::new(8)
            .unwrap()
            .with_sample_ratio(0.5)
            .with_seed(99);
        let a = config.fit(&ds).unwrap();
        let b = config.fit(&ds).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn different_seeds_draw_different_samples() {
        let ds = make_separable_data();
        let config = RandomForestConfig::new(4).unwrap().with_sample_ratio(0.3);
        let a = config.clone().with_seed(1).fit(&ds).unwrap();
        let b = config.with_seed(2).fit(&ds).unwrap();
        let roots = |f: &crate::RandomForest| {
            f.trees()
                .iter()
                .map(|t| t.root().n_records())
                .sum::<usize>()
        };
        // Same sample size regardless of seed.
        assert_eq!(roots(&a), roots(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn invalid_sample_ratio() {
        let ds = color_size();
        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let err = RandomForestConfig::new(2)
                .unwrap()
                .with_sample_ratio(ratio)
                .fit(&ds)
                .unwrap_err();
            assert!(matches!(err, ForestError::InvalidSampleRatio { .. }));
        }
    }

    #[test]
    fn sample_size_is_ceiling_of_ratio() {
        let ds = make_separable_data();
        let forest = RandomForestConfig::new(3)
            .unwrap()
            .with_sample_ratio(0.6)
            .fit(&ds)
            .unwrap();
        // ceil(36 * 0.6) = 22
        assert!(forest.trees().iter().all(|t| t.root().n_records() == 22));
    }

    #[test]
    fn single_tree_without_replacement_reproduces_training_labels() {
        let ds = color_size();
        let forest = RandomForestConfig::new(1)
            .unwrap()
            .with_sampling(Sampling::WithoutReplacement)
            .fit(&ds)
            .unwrap();
        for r in ds.records() {
            assert_eq!(forest.classify(r).unwrap(), r.get("class"));
        }
    }

    #[test]
    fn target_copied_from_single_attribute() {
        let records = ["red", "blue", "blue", "red", "red", "blue"]
            .iter()
            .map(|&c| record(&[("color", c), ("label", c)]))
            .collect();
        let ds = Dataset::new(vec!["color".into(), "label".into()], records).unwrap();
        let forest = RandomForestConfig::new(1)
            .unwrap()
            .with_sampling(Sampling::WithoutReplacement)
            .with_sample_ratio(1.0)
            .fit(&ds)
            .unwrap();
        let correct = forest
            .classify_many(ds.records())
            .zip(ds.target_values())
            .filter(|(p, expected)| matches!(p, Ok(Some(c)) if c == expected))
            .count();
        assert_eq!(correct, ds.len());
    }

    #[test]
    fn empty_dataset_trains_abstaining_trees() {
        let ds = color_size().filter("color", "green");
        let forest = RandomForestConfig::new(3).unwrap().fit(&ds).unwrap();
        assert_eq!(forest.n_trees(), 3);
        assert_eq!(forest.classify(&record(&[("color", "red")])).unwrap(), None);
    }

    #[test]
    fn display_numbers_trees() {
        let forest = RandomForestConfig::new(2).unwrap().fit(&color_size()).unwrap();
        let text = forest.to_string();
        assert!(text.contains("Tree number 1: \n"));
        assert!(text.contains("Tree number 2: \n"));
    }
}
