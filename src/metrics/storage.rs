use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::source::{MetricSource, SourceError};
use super::types::{validate_input, City, CitySnapshot, MetricInput};

/// Default glob patterns used to discover city files in a data directory
pub const DEFAULT_INCLUDE: [&str; 3] = ["*.yaml", "*.yml", "*.json"];

/// On-disk layout of one city's data file.
///
/// Example YAML:
/// ```yaml
/// slug: new-york
/// name: New York
/// snapshots:
///   - asOf: 2026-10-18T06:00:00Z
///     metrics:
///       gdpPerCapita: 85000
///       unemploymentRate: 4.2
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CityFile {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub snapshots: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SnapshotEntry {
    pub as_of: DateTime<Utc>,
    #[serde(default)]
    pub metrics: MetricInput,
}

/// Metric source backed by a directory of YAML/JSON city files, one file per
/// city, named `<slug>.<ext>`.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
    include: Vec<String>,
}

impl SnapshotDir {
    pub fn new(root: PathBuf, include: Option<Vec<String>>) -> Self {
        let include = include
            .filter(|patterns| !patterns.is_empty())
            .unwrap_or_else(|| DEFAULT_INCLUDE.iter().map(|p| p.to_string()).collect());
        Self { root, include }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All files matched by the include patterns, sorted and de-duplicated
    fn matching_files(&self) -> Result<Vec<PathBuf>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::UpstreamUnavailable(format!(
                "data directory {} does not exist",
                self.root.display()
            )));
        }

        // The directory itself is matched literally; only `include` is a pattern
        let escaped_root = PathBuf::from(glob::Pattern::escape(&self.root.to_string_lossy()));
        let mut files = Vec::new();
        let mut errors = Vec::new();
        for pattern in &self.include {
            let full = escaped_root.join(pattern);
            match glob::glob(&full.to_string_lossy()) {
                Ok(paths) => files.extend(paths.filter_map(|p| p.ok()).filter(|p| p.is_file())),
                Err(e) => errors.push(format!("include pattern '{}': {}", pattern, e)),
            }
        }

        if !errors.is_empty() {
            return Err(SourceError::Validation(errors));
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// The single file for a slug; two files with the same stem are ambiguous
    fn find_file(&self, city_slug: &str) -> Result<PathBuf, SourceError> {
        let mut candidates: Vec<PathBuf> = self
            .matching_files()?
            .into_iter()
            .filter(|path| file_slug(path).as_deref() == Some(city_slug))
            .collect();

        match candidates.len() {
            0 => Err(SourceError::NotFound(format!("city '{}'", city_slug))),
            1 => Ok(candidates.remove(0)),
            _ => Err(SourceError::Validation(vec![format!(
                "city '{}' has more than one data file: {}",
                city_slug,
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )])),
        }
    }
}

fn file_slug(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Slugs are used as file names, so keep them to a safe alphabet
fn check_slug(city_slug: &str) -> Result<(), SourceError> {
    let valid = !city_slug.is_empty()
        && city_slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SourceError::Validation(vec![format!(
            "city slug '{}' may only contain letters, digits, '-' and '_'",
            city_slug
        )]))
    }
}

/// Parse a city file, choosing the format from the extension
pub fn parse_city_file(path: &Path, content: &str) -> Result<CityFile, SourceError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_saphyr::from_str(content).map_err(|e| e.to_string())
    };

    parsed.map_err(|e| SourceError::Validation(vec![format!("{}: {}", path.display(), e)]))
}

/// Pick the snapshot to score: latest on `date` if given, latest overall otherwise
fn select_snapshot(file: &CityFile, date: Option<NaiveDate>) -> Option<&SnapshotEntry> {
    file.snapshots
        .iter()
        .filter(|entry| date.map_or(true, |d| entry.as_of.date_naive() == d))
        .max_by_key(|entry| entry.as_of)
}

impl MetricSource for SnapshotDir {
    fn list_cities(&self) -> Result<Vec<String>, SourceError> {
        let mut slugs: Vec<String> = self
            .matching_files()?
            .iter()
            .filter_map(|path| file_slug(path))
            .collect();
        slugs.sort();
        slugs.dedup();
        Ok(slugs)
    }

    fn load_metric_input(
        &self,
        city_slug: &str,
        date: Option<NaiveDate>,
    ) -> Result<CitySnapshot, SourceError> {
        check_slug(city_slug)?;
        let path = self.find_file(city_slug)?;

        let content = std::fs::read_to_string(&path).map_err(|e| {
            SourceError::UpstreamUnavailable(format!("failed to read {}: {}", path.display(), e))
        })?;
        let file = parse_city_file(&path, &content)?;

        if file.slug != city_slug {
            return Err(SourceError::Validation(vec![format!(
                "{}: slug '{}' does not match file name '{}'",
                path.display(),
                file.slug,
                city_slug
            )]));
        }

        let entry = select_snapshot(&file, date).ok_or_else(|| match date {
            Some(d) => SourceError::NotFound(format!("no snapshot for '{}' on {}", city_slug, d)),
            None => SourceError::NotFound(format!("no snapshots for '{}'", city_slug)),
        })?;

        validate_input(&entry.metrics).map_err(SourceError::Validation)?;

        Ok(CitySnapshot {
            city: City {
                slug: file.slug.clone(),
                name: file.name.clone(),
            },
            as_of: entry.as_of,
            metrics: entry.metrics.clone(),
        })
    }
}
