//! Config file loading.

use crate::schema::GifsmithConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name.
const CONFIG_FILE_NAME: &str = "gifsmith.yaml";

/// Resolve the config file path.
/// Priority: explicit path > `GIFSMITH_CONFIG` env > `./gifsmith.yaml`.
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("GIFSMITH_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<GifsmithConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(GifsmithConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty file parses as YAML null.
    if raw.trim().is_empty() {
        return Ok(GifsmithConfig::default());
    }

    let config: GifsmithConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let p = config_file_path(Some(Path::new("/etc/gifsmith.yaml")));
        assert_eq!(p, PathBuf::from("/etc/gifsmith.yaml"));
    }

    #[tokio::test]
    async fn reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gifsmith.yaml");
        fs::write(&path, "media:\n  videoEnabled: false\n").await.unwrap();
        let config = load_config(&path).await.unwrap();
        assert_eq!(config.media.unwrap().video_enabled, Some(false));
    }

    #[tokio::test]
    async fn empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gifsmith.yaml");
        fs::write(&path, "\n").await.unwrap();
        let config = load_config(&path).await.unwrap();
        assert!(config.media.is_none());
    }

    #[tokio::test]
    async fn malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gifsmith.yaml");
        fs::write(&path, "media: [unclosed").await.unwrap();
        assert!(load_config(&path).await.is_err());
    }
}
