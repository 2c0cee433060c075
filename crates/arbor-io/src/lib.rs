//! File I/O for the arbor pipeline: CSV datasets in, sweep results out.

mod discretize;
mod error;
mod reader;
mod writer;

pub use discretize::Discretizer;
pub use error::IoError;
pub use reader::DatasetReader;
pub use writer::{SweepRecord, SweepWriter};
