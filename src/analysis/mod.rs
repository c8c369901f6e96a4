//! Response aggregation and classification.
//!
//! Raw questions and responses flow through the tabulator and the
//! partitioner, then into one of the three views.

pub mod demographic;
pub mod partition;
pub mod quantitative;
pub mod sentiment;
pub mod table;

pub use demographic::{demographic_breakdown, DemographicBreakdown, DemographicChart};
pub use partition::{partition_questions, QuestionPartition};
pub use quantitative::{quantitative_distribution, Distribution};
pub use sentiment::{analyze_sentiment, SentimentAnalysis};
pub use table::tabulate;
