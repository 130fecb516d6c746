//! Configuration file discovery and loading

use std::path::{Path, PathBuf};

use super::settings::NoriConfiguration;
use crate::error::{NoriError, Result};

/// The file name searched for during auto-discovery.
pub const CONFIG_FILE_NAME: &str = "nori.toml";

/// Discovers and loads `nori.toml`.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Walk upward from `start_path` until a `nori.toml` is found or the
    /// filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| NoriError::config(format!("invalid path: {e}")))?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!("found config: {}", candidate.display());
                return Ok(Some(candidate));
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok(None),
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<NoriConfiguration> {
        let text = std::fs::read_to_string(path).map_err(|e| NoriError::io(path, e))?;
        toml::from_str(&text).map_err(|e| {
            NoriError::config(format!("failed to parse '{}': {e}", path.display()))
        })
    }

    /// Load from an explicit path, or auto-discover from `start_dir`.
    /// No config file found means the built-in defaults, not an error; a
    /// file that exists but does not parse aborts.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<NoriConfiguration> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(NoriError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("no nori.toml found, using defaults");
                Ok(NoriConfiguration::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn discovers_config_in_parent_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "php_version = \"8.2\"\n").unwrap();

        let found = ConfigLoader::auto_discover(&nested).unwrap();
        assert!(found.is_some());

        let config = ConfigLoader::load(None, Some(&nested)).unwrap();
        assert_eq!(config.php_version, crate::version::PhpVersion::Php82);
    }

    #[test]
    fn missing_config_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigLoader::load(None, Some(temp.path())).unwrap();
        assert_eq!(config, NoriConfiguration::default());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = ConfigLoader::load(Some(Path::new("/no/such/nori.toml")), None);
        assert!(err.is_err());
    }

    #[test]
    fn malformed_toml_aborts() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[formatter\nline_width = ").unwrap();
        assert!(ConfigLoader::load(Some(&path), None).is_err());
    }
}
