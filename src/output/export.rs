use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

use crate::scoring::FeatureSet;

/// Write feature sets to `path` as a pretty JSON array.
///
/// The file is replaced atomically, so a reader never sees a half-written
/// export. Missing parent directories are created.
pub fn export_feature_sets(path: &Path, feature_sets: &[FeatureSet]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create export directory at {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, feature_sets)
        .context("Failed to serialize feature sets")?;
    file.write_all(b"\n").context("Failed to write export")?;
    file.commit().context("Failed to save export")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{City, MetricInput};
    use crate::scoring::{compute, ScoringConfig};
    use chrono::{TimeZone, Utc};
    use std::env;
    use std::fs;

    #[test]
    fn test_export_writes_json_array() {
        let dir = env::temp_dir().join("city_atlas_test_export");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("scores.json");

        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let input = MetricInput {
            gdp_per_capita: Some(60_000.0),
            unemployment_rate: Some(5.0),
            ..Default::default()
        };
        let features = compute(
            &City {
                slug: "springfield".to_string(),
                name: "Springfield".to_string(),
            },
            &input,
            now,
            now,
            &ScoringConfig::default(),
        );

        export_feature_sets(&path, &[features.clone()]).unwrap();

        let written: Vec<FeatureSet> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].city_slug, "springfield");
        assert_eq!(written[0].economy.value, features.economy.value);

        // Second export replaces the first
        export_feature_sets(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");

        let _ = fs::remove_dir_all(&dir);
    }
}
