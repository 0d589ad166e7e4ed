// Extraction and comparison pipelines, the two operations the CLI exposes.

pub mod compare;
pub mod extract;

pub use compare::{compare, CompareOptions, ComparisonReport};
pub use extract::{extract, extract_analysis, ExtractOutcome};
