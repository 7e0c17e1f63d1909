use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

use super::Config;
use crate::metrics::DEFAULT_INCLUDE;
use crate::scoring::ScoringConfig;

/// Config written by `city-atlas init`: every default spelled out so it can
/// be edited in place.
fn default_config(data_dir: &Path) -> Config {
    Config {
        data_dir: Some(data_dir.to_path_buf()),
        include: Some(DEFAULT_INCLUDE.iter().map(|p| p.to_string()).collect()),
        scoring: Some(ScoringConfig {
            stale_after: Some(crate::scoring::DEFAULT_STALE_AFTER.to_string()),
            recency_decay: Some(crate::scoring::DEFAULT_RECENCY_DECAY.to_string()),
            renormalize_overall: Some(false),
            ..Default::default()
        }),
    }
}

/// Write the default config file atomically.
///
/// Refuses to replace an existing file unless `force` is set. Creates the
/// parent directory and the data directory if they don't exist.
pub fn write_default_config(path: &Path, data_dir: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory at {}", parent.display()))?;
    }
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory at {}", data_dir.display()))?;

    let yaml = serde_saphyr::to_string(&default_config(data_dir))
        .context("Failed to serialize default config")?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .context("Failed to write config")?;
    file.commit().context("Failed to save config")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use std::env;
    use std::fs;

    #[test]
    fn test_written_config_loads_back() {
        let dir = env::temp_dir().join("city_atlas_test_init");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("config.yaml");
        let data_dir = dir.join("data");

        write_default_config(&path, &data_dir, false).unwrap();
        assert!(data_dir.is_dir());

        let config = load_config(Some(path.clone())).unwrap();
        assert_eq!(config.data_dir(), data_dir);
        assert!(crate::scoring::validate_scoring(&config.effective_scoring()).is_ok());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_refuses_overwrite_without_force() {
        let dir = env::temp_dir().join("city_atlas_test_init_force");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        fs::write(&path, "data_dir: /keep/me\n").unwrap();

        assert!(write_default_config(&path, &dir.join("data"), false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "data_dir: /keep/me\n");

        write_default_config(&path, &dir.join("data"), true).unwrap();
        assert_ne!(fs::read_to_string(&path).unwrap(), "data_dir: /keep/me\n");

        let _ = fs::remove_dir_all(&dir);
    }
}
