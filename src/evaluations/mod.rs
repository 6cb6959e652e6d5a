//! Evaluation records, the creation payload, and the pure filter/aggregation
//! the list views run over fetched records.

pub mod filter;
pub mod model;

pub use filter::{average_score, filter_evaluations, filter_options, FilterOptions, FilterOutcome, FilterState, Statistics};
pub use model::{records_from_body, EvaluationRecord, NewEvaluation};
