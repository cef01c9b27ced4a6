// TOML config adapter - Settings files with a `[ffwrap]` table

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::SettingsOverlay;

/// Locations searched when no explicit config file is given
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["ffwrap.toml", "config/ffwrap.toml"];

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    ffwrap: SettingsOverlay,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse settings from TOML text
    pub fn parse(content: &str) -> Result<SettingsOverlay, DomainError> {
        let document: ConfigDocument = toml::from_str(content)
            .map_err(|e| DomainError::InvalidFormat(format!("Failed to parse TOML config: {}", e)))?;
        Ok(document.ffwrap)
    }

    /// Load settings from a file that must exist
    pub fn load(path: &Path) -> Result<SettingsOverlay, DomainError> {
        if !path.exists() {
            return Err(DomainError::FileNotFound(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DomainError::ProcessingError(format!("Failed to read config file: {}", e)))?;
        info!("Loading configuration from: {}", path.display());
        Self::parse(&content)
    }

    /// First default location that exists below `root`
    pub fn discover(root: &Path) -> Option<PathBuf> {
        let found = DEFAULT_CONFIG_PATHS
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|candidate| candidate.is_file());
        if found.is_none() {
            debug!("No configuration file found under {}", root.display());
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{LogLevel, ProgressMode};
    use tempfile::TempDir;

    #[test]
    fn test_parse_ffwrap_table() {
        let overlay = TomlConfigAdapter::parse(
            r#"
            [ffwrap]
            ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
            overwrite = false
            log_level = "debug"
            progress = "json"
            "#,
        )
        .unwrap();

        assert_eq!(overlay.ffmpeg_path, Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(overlay.overwrite, Some(false));
        assert_eq!(overlay.log_level, Some(LogLevel::Debug));
        assert_eq!(overlay.progress, Some(ProgressMode::Json));
        assert_eq!(overlay.ffprobe_path, None);
    }

    #[test]
    fn test_missing_table_is_empty() {
        assert_eq!(TomlConfigAdapter::parse("").unwrap(), SettingsOverlay::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = TomlConfigAdapter::parse("[ffwrap]\nthreads = 4\n").unwrap_err();
        assert!(matches!(err, DomainError::InvalidFormat(_)));
    }

    #[test]
    fn test_discover_and_load() {
        let dir = TempDir::new().unwrap();
        assert_eq!(TomlConfigAdapter::discover(dir.path()), None);

        std::fs::create_dir(dir.path().join("config")).unwrap();
        let path = dir.path().join("config/ffwrap.toml");
        std::fs::write(&path, "[ffwrap]\noverwrite = false\n").unwrap();

        assert_eq!(TomlConfigAdapter::discover(dir.path()), Some(path.clone()));
        assert_eq!(TomlConfigAdapter::load(&path).unwrap().overwrite, Some(false));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TomlConfigAdapter::load(Path::new("/no/such/ffwrap.toml")).unwrap_err();
        assert!(matches!(err, DomainError::FileNotFound(_)));
    }
}
