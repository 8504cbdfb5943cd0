pub mod model;
pub mod regression;
pub mod report;
pub mod snapshot;
pub mod utils;

// Re-export common items
pub use regression::{compare_snapshots, CompareOptions, RegressionSummary};
pub use report::generate_report;
