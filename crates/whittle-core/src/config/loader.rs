//! Configuration file discovery and loading

use super::whittle_config::WhittleConfig;
use crate::{Result, WhittleError};
use std::path::{Path, PathBuf};

/// File names searched for, in priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".whittlerc.toml",
    ".whittlerc.json",
    "whittle.toml",
    "whittle.json",
];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by walking up from `start_path`
    ///
    /// Each directory is checked for [`CONFIG_FILE_NAMES`] in order, until a
    /// file is found or the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| WhittleError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<WhittleConfig> {
        WhittleConfig::load(path).map_err(|e| {
            WhittleError::config_error(format!(
                "Failed to load config from '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Load config from `custom_path` or auto-discover it
    ///
    /// Unlike an explicit path, a failed discovery is not an error: the
    /// defaults are used.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<WhittleConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(WhittleError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(WhittleConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
        let path = dir.join(filename);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_file_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(
            temp_dir.path(),
            "whittle.toml",
            "[reducer]\nhoist = false\n",
        );

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert!(!config.reducer.hoist);
    }

    #[test]
    fn test_auto_discover_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("src/nested");
        fs::create_dir_all(&nested).unwrap();
        create_temp_config(temp_dir.path(), "whittle.json", "{}");

        let found = ConfigLoader::auto_discover(&nested).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "whittle.json");
    }

    #[test]
    fn test_dotfile_takes_priority() {
        let temp_dir = TempDir::new().unwrap();
        create_temp_config(temp_dir.path(), "whittle.toml", "");
        create_temp_config(temp_dir.path(), ".whittlerc.toml", "");

        let found = ConfigLoader::auto_discover(temp_dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(found.file_name().unwrap(), ".whittlerc.toml");
    }

    #[test]
    fn test_load_without_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::load(None, Some(temp_dir.path())).unwrap();
        assert!(config.reducer.hoist);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Some(Path::new("nonexistent.toml")), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_temp_config(temp_dir.path(), "whittle.toml", "reducer = 3");
        let err = ConfigLoader::load_from_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("whittle.toml"));
    }
}
