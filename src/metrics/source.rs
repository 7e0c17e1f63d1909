use chrono::NaiveDate;
use std::fmt;

use super::types::CitySnapshot;

/// Failure kinds at the data-acquisition boundary.
///
/// Translated to process exit codes only in `main.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// No data exists for the requested city or date
    NotFound(String),
    /// The backing store could not be read
    UpstreamUnavailable(String),
    /// Data exists but is malformed; every problem found is listed
    Validation(Vec<String>),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NotFound(msg) => write!(f, "Not found: {}", msg),
            SourceError::UpstreamUnavailable(msg) => write!(f, "Data source unavailable: {}", msg),
            SourceError::Validation(errors) => {
                write!(f, "Invalid metric data: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Anything that can supply raw city metrics to the score engine.
pub trait MetricSource {
    /// Slugs of every city the source knows about, sorted
    fn list_cities(&self) -> Result<Vec<String>, SourceError>;

    /// Load one city's snapshot. `date` selects the latest snapshot taken on
    /// that calendar day (UTC); `None` selects the latest snapshot overall.
    fn load_metric_input(
        &self,
        city_slug: &str,
        date: Option<NaiveDate>,
    ) -> Result<CitySnapshot, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_validation_joins_errors() {
        let err = SourceError::Validation(vec!["a: bad".to_string(), "b: worse".to_string()]);
        assert_eq!(err.to_string(), "Invalid metric data: a: bad; b: worse");
    }

    #[test]
    fn test_display_not_found() {
        let err = SourceError::NotFound("city 'atlantis'".to_string());
        assert_eq!(err.to_string(), "Not found: city 'atlantis'");
    }
}
