pub mod source;
pub mod storage;
pub mod types;

pub use source::{MetricSource, SourceError};
pub use storage::{CityFile, SnapshotDir, SnapshotEntry, DEFAULT_INCLUDE};
pub use types::{validate_input, City, CitySnapshot, Metric, MetricInput};
