use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use arbor_forest::{
    ConfusionMatrix, CrossValidation, CrossValidationResult, Dataset, RandomForestConfig, Sampling, SplitCriterion,
};
use arbor_io::{DatasetReader, Discretizer, SweepRecord, SweepWriter};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Categorical random forests with k-fold cross-validation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Log verbosity: 0 = warnings, 1 = per-fold accuracy, 2 = per-record results, 3 = tree dumps
    #[arg(long, default_value_t = 0, global = true, value_parser = clap::value_parser!(u8).range(0..=3))]
    verbosity: u8,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input file options shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Single-character CSV field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Split criterion: "entropy" (information gain) or "gini"
    #[arg(long, default_value = "entropy")]
    criterion: String,
}

#[derive(Subcommand)]
enum Command {
    /// Cross-validate one random forest configuration on one dataset
    Evaluate {
        /// Path to the input CSV file (header row, target in the last column)
        #[arg(long)]
        data: PathBuf,

        /// Maximum tree depth (unlimited if not set)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 10)]
        tree_count: usize,

        /// Draw each tree's sample without replacement
        #[arg(long, default_value_t = false)]
        without_replacement: bool,

        /// Per-tree sample size as a fraction of the training set
        #[arg(long, default_value_t = 0.6)]
        sample_ratio: f64,

        /// Number of cross-validation folds
        #[arg(long, default_value_t = 4)]
        fold_count: usize,

        /// Bin numeric attributes into this many equal-width levels
        #[arg(long)]
        discretization_level: Option<usize>,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Cross-validate every combination of hyperparameters over a directory of CSV files
    Sweep {
        /// Directory containing the input CSV files
        #[arg(long)]
        data_dir: PathBuf,

        /// Path of the results CSV to write
        #[arg(long, default_value = "results.csv")]
        output: PathBuf,

        /// Maximum tree depths to try
        #[arg(long, value_delimiter = ',', default_value = "8,12")]
        depths: Vec<usize>,

        /// Tree counts to try
        #[arg(long, value_delimiter = ',', default_value = "8,12")]
        tree_counts: Vec<usize>,

        /// Sampling modes to try (true = with replacement)
        #[arg(long, value_delimiter = ',', default_value = "true,false")]
        replacement: Vec<bool>,

        /// Per-tree sample ratios to try
        #[arg(long, value_delimiter = ',', default_value = "0.5,0.7")]
        sample_ratios: Vec<f64>,

        /// Fold counts to try
        #[arg(long, value_delimiter = ',', default_value = "4,8")]
        fold_counts: Vec<usize>,

        /// Discretization levels to try (0 = leave numeric attributes as-is)
        #[arg(long, value_delimiter = ',', default_value = "0,4")]
        discretization_levels: Vec<usize>,

        #[command(flatten)]
        input: InputArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluateOutput {
    data: String,
    n_records: usize,
    n_attributes: usize,
    tree_count: usize,
    max_depth: Option<usize>,
    replacement: bool,
    sample_ratio: f64,
    fold_count: usize,
    discretization_level: Option<usize>,
    mean_accuracy: f64,
    std_accuracy: f64,
    fold_accuracies: Vec<f64>,
    classes: Vec<String>,
    /// One row per true class; the last column counts abstentions.
    confusion_matrix: Vec<Vec<usize>>,
    class_metrics: Vec<ClassMetricsOutput>,
}

#[derive(Serialize)]
struct ClassMetricsOutput {
    class: String,
    precision: f64,
    recall: f64,
    f1: f64,
    support: usize,
}

#[derive(Serialize)]
struct SweepOutput {
    output: String,
    n_files: usize,
    n_runs: usize,
    best: Option<SweepRecord>,
}

/// One point in the hyperparameter grid.
#[derive(Debug, Clone, Copy)]
struct RunParams {
    max_depth: Option<usize>,
    tree_count: usize,
    replacement: bool,
    sample_ratio: f64,
    fold_count: usize,
    discretization_level: Option<usize>,
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "entropy" => Ok(SplitCriterion::InformationGain),
        "gini" => Ok(SplitCriterion::GiniGain),
        other => anyhow::bail!("unknown split criterion: {other} (expected entropy or gini)"),
    }
}

fn parse_delimiter(c: char) -> Result<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter must be a single ASCII character, got {c:?}"))
}

fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn load_dataset(path: &Path, delimiter: u8) -> Result<Dataset> {
    DatasetReader::new(path)
        .with_delimiter(delimiter)
        .read()
        .with_context(|| format!("failed to read {}", path.display()))
}

fn discretize(raw: &Dataset, level: Option<usize>) -> Result<Dataset> {
    match level {
        Some(levels) => Discretizer::new(levels)?
            .apply(raw)
            .context("discretization failed"),
        None => Ok(raw.clone()),
    }
}

/// One dataset per distinct discretization level, in first-seen order.
///
/// Level `0` leaves numeric attributes as-is.
fn discretized_variants(raw: &Dataset, levels: &[usize]) -> Result<Vec<(Option<usize>, Dataset)>> {
    let mut variants: Vec<(Option<usize>, Dataset)> = Vec::new();
    for &level in levels {
        let level = (level > 0).then_some(level);
        if variants.iter().any(|(l, _)| *l == level) {
            continue;
        }
        variants.push((level, discretize(raw, level)?));
    }
    Ok(variants)
}

/// Confusion matrix rows with the abstention count appended, so each row sums to the class support.
fn confusion_rows(matrix: &ConfusionMatrix) -> Vec<Vec<usize>> {
    matrix
        .as_rows()
        .iter()
        .zip(matrix.abstained())
        .map(|(row, &abstained)| row.iter().copied().chain(std::iter::once(abstained)).collect())
        .collect()
}

/// Cross-validate one configuration on an already prepared dataset.
fn run_evaluation(
    dataset: &Dataset,
    criterion: SplitCriterion,
    params: RunParams,
    seed: u64,
) -> Result<CrossValidationResult> {
    let sampling = if params.replacement {
        Sampling::WithReplacement
    } else {
        Sampling::WithoutReplacement
    };
    let config = RandomForestConfig::new(params.tree_count)?
        .with_max_depth(params.max_depth)
        .with_criterion(criterion)
        .with_sampling(sampling)
        .with_sample_ratio(params.sample_ratio)
        .with_seed(seed);

    CrossValidation::new(params.fold_count)?
        .evaluate(&config, dataset)
        .context("cross-validation failed")
}

/// CSV files directly inside `dir`, sorted by name.
fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(verbosity_filter(cli.verbosity))
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Evaluate {
            data,
            max_depth,
            tree_count,
            without_replacement,
            sample_ratio,
            fold_count,
            discretization_level,
            input,
        } => {
            let criterion = parse_criterion(&input.criterion)?;
            let delimiter = parse_delimiter(input.delimiter)?;
            let params = RunParams {
                max_depth,
                tree_count,
                replacement: !without_replacement,
                sample_ratio,
                fold_count,
                discretization_level,
            };

            let dataset = discretize(&load_dataset(&data, delimiter)?, discretization_level)?;
            let result = run_evaluation(&dataset, criterion, params, cli.seed)?;
            info!(accuracy = result.mean_accuracy, "evaluation complete");

            let matrix = &result.confusion_matrix;
            let output = EvaluateOutput {
                data: data.display().to_string(),
                n_records: result.n_records,
                n_attributes: dataset.feature_attributes().len(),
                tree_count,
                max_depth,
                replacement: params.replacement,
                sample_ratio,
                fold_count,
                discretization_level,
                mean_accuracy: result.mean_accuracy,
                std_accuracy: result.std_accuracy,
                fold_accuracies: result.fold_accuracies(),
                classes: matrix.classes().to_vec(),
                confusion_matrix: confusion_rows(matrix),
                class_metrics: matrix
                    .class_metrics()
                    .into_iter()
                    .map(|m| ClassMetricsOutput {
                        class: m.class,
                        precision: m.precision,
                        recall: m.recall,
                        f1: m.f1,
                        support: m.support,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Sweep {
            data_dir,
            output,
            depths,
            tree_counts,
            replacement,
            sample_ratios,
            fold_counts,
            discretization_levels,
            input,
        } => {
            let criterion = parse_criterion(&input.criterion)?;
            let delimiter = parse_delimiter(input.delimiter)?;
            let files = list_csv_files(&data_dir)?;
            if files.is_empty() {
                warn!(dir = %data_dir.display(), "no CSV files found");
            }

            let mut grid = Vec::new();
            for &depth in &depths {
                for &tree_count in &tree_counts {
                    for &repl in &replacement {
                        for &sample_ratio in &sample_ratios {
                            for &fold_count in &fold_counts {
                                for &level in &discretization_levels {
                                    grid.push(RunParams {
                                        max_depth: Some(depth),
                                        tree_count,
                                        replacement: repl,
                                        sample_ratio,
                                        fold_count,
                                        discretization_level: (level > 0).then_some(level),
                                    });
                                }
                            }
                        }
                    }
                }
            }
            info!(n_files = files.len(), n_combinations = grid.len(), "starting sweep");

            let mut writer = SweepWriter::create(&output)?;
            let mut best: Option<SweepRecord> = None;
            for path in &files {
                let filename = path
                    .file_name()
                    .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
                info!(file = %filename, "data set");
                let variants = discretized_variants(&load_dataset(path, delimiter)?, &discretization_levels)?;
                for params in &grid {
                    let Some((_, dataset)) = variants.iter().find(|(l, _)| *l == params.discretization_level) else {
                        continue;
                    };
                    let result = run_evaluation(dataset, criterion, *params, cli.seed)?;
                    info!(
                        accuracy = result.mean_accuracy,
                        depth = ?params.max_depth,
                        trees = params.tree_count,
                        replacement = params.replacement,
                        sample_ratio = params.sample_ratio,
                        folds = params.fold_count,
                        discretization = ?params.discretization_level,
                        "run complete"
                    );
                    let record = SweepRecord {
                        filename: filename.clone(),
                        depth: params.max_depth,
                        trees: params.tree_count,
                        replacement: params.replacement,
                        sample_ratio: params.sample_ratio,
                        folds: params.fold_count,
                        discretization: params.discretization_level,
                        accuracy: result.mean_accuracy,
                    };
                    writer.write(&record)?;
                    if best.as_ref().is_none_or(|b| record.accuracy > b.accuracy) {
                        best = Some(record);
                    }
                }
            }
            let n_runs = writer.n_written();
            writer.finish()?;

            let summary = SweepOutput {
                output: output.display().to_string(),
                n_files: files.len(),
                n_runs,
                best,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
