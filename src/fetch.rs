use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;

use crate::buffered_eprintln;
use crate::metrics::{Metric, MetricSource, SourceError};
use crate::scoring::{score_snapshot, FeatureSet, ScoringConfig};

/// Load every city from the source, score it, and rank the results.
///
/// A city whose data cannot be loaded is reported as a warning and skipped;
/// only a source that cannot be listed, or a run where every city failed,
/// is an error.
pub fn load_and_score_cities(
    source: &dyn MetricSource,
    scoring: &ScoringConfig,
    date: Option<NaiveDate>,
    now: DateTime<Utc>,
    verbose: bool,
) -> Result<Vec<FeatureSet>> {
    let slugs = source.list_cities()?;

    if verbose {
        eprintln!("Found {} city files", slugs.len());
    }

    let mut scored = Vec::new();
    let mut failures = 0usize;

    for slug in &slugs {
        match source.load_metric_input(slug, date) {
            Ok(snapshot) => {
                if verbose {
                    eprintln!(
                        "  {}: snapshot from {} ({}/{} metrics)",
                        slug,
                        snapshot.as_of.format("%Y-%m-%d %H:%M UTC"),
                        snapshot.metrics.present_count(),
                        Metric::ALL.len()
                    );
                }
                scored.push(score_snapshot(&snapshot, now, scoring));
            }
            // A city without a snapshot on the requested date is not a failure
            Err(SourceError::NotFound(msg)) if date.is_some() => {
                if verbose {
                    eprintln!("  {}: skipped ({})", slug, msg);
                }
            }
            Err(e) => {
                failures += 1;
                buffered_eprintln!("Skipped {}: {}", slug, e);
            }
        }
    }

    // If every city failed, return error
    if scored.is_empty() && failures > 0 {
        anyhow::bail!("All {} city files failed to load. Check the data directory.", failures);
    }

    rank_feature_sets(&mut scored);
    Ok(scored)
}

/// Sort by overall score descending; unscored cities last, ties by slug
pub fn rank_feature_sets(feature_sets: &mut [FeatureSet]) {
    feature_sets.sort_by(|a, b| {
        let score_cmp = match (a.overall.value, b.overall.value) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if score_cmp != Ordering::Equal {
            return score_cmp;
        }
        a.city_slug.cmp(&b.city_slug)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{City, CitySnapshot, MetricInput};
    use chrono::TimeZone;
    use std::collections::HashMap;

    /// In-memory source keyed by slug
    struct FakeSource {
        cities: HashMap<String, Result<CitySnapshot, SourceError>>,
    }

    impl MetricSource for FakeSource {
        fn list_cities(&self) -> Result<Vec<String>, SourceError> {
            let mut slugs: Vec<String> = self.cities.keys().cloned().collect();
            slugs.sort();
            Ok(slugs)
        }

        fn load_metric_input(
            &self,
            city_slug: &str,
            _date: Option<NaiveDate>,
        ) -> Result<CitySnapshot, SourceError> {
            self.cities
                .get(city_slug)
                .cloned()
                .unwrap_or_else(|| Err(SourceError::NotFound(city_slug.to_string())))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn snapshot(slug: &str, aqi: Option<f64>) -> CitySnapshot {
        CitySnapshot {
            city: City {
                slug: slug.to_string(),
                name: slug.to_uppercase(),
            },
            as_of: now(),
            metrics: MetricInput {
                air_quality_index: aqi,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_ranks_by_overall_descending() {
        let mut cities = HashMap::new();
        cities.insert("smoggy".to_string(), Ok(snapshot("smoggy", Some(250.0))));
        cities.insert("clean".to_string(), Ok(snapshot("clean", Some(10.0))));
        cities.insert("empty".to_string(), Ok(snapshot("empty", None)));
        let source = FakeSource { cities };

        let ranked =
            load_and_score_cities(&source, &ScoringConfig::default(), None, now(), false).unwrap();
        let order: Vec<&str> = ranked.iter().map(|f| f.city_slug.as_str()).collect();
        assert_eq!(order, vec!["clean", "smoggy", "empty"]);
    }

    #[test]
    fn test_partial_failure_skips_city() {
        let mut cities = HashMap::new();
        cities.insert("good".to_string(), Ok(snapshot("good", Some(10.0))));
        cities.insert(
            "broken".to_string(),
            Err(SourceError::Validation(vec!["bad".to_string()])),
        );
        let source = FakeSource { cities };

        let ranked =
            load_and_score_cities(&source, &ScoringConfig::default(), None, now(), false).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].city_slug, "good");
    }

    #[test]
    fn test_all_failed_is_error() {
        let mut cities = HashMap::new();
        cities.insert(
            "broken".to_string(),
            Err(SourceError::UpstreamUnavailable("disk".to_string())),
        );
        let source = FakeSource { cities };

        assert!(
            load_and_score_cities(&source, &ScoringConfig::default(), None, now(), false).is_err()
        );
    }

    #[test]
    fn test_empty_source_is_ok() {
        let source = FakeSource {
            cities: HashMap::new(),
        };
        let ranked =
            load_and_score_cities(&source, &ScoringConfig::default(), None, now(), false).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_ties_broken_by_slug() {
        let mut cities = HashMap::new();
        cities.insert("b".to_string(), Ok(snapshot("b", Some(40.0))));
        cities.insert("a".to_string(), Ok(snapshot("a", Some(40.0))));
        let source = FakeSource { cities };

        let ranked =
            load_and_score_cities(&source, &ScoringConfig::default(), None, now(), false).unwrap();
        assert_eq!(ranked[0].city_slug, "a");
        assert_eq!(ranked[1].city_slug, "b");
    }
}
