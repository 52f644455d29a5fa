use std::fs;
use std::path::{Path, PathBuf};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Invalid JSON in {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
}

pub struct JsonConfig;

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

fn read<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json { path: path.to_owned(), source })
}

/// Missing fields are filled from `Default` on load but only reach the file
/// on the next save.
impl JsonConfig {
    /// Loads `path`, writing the defaults there when it does not exist. With
    /// `backup`, a file that fails to parse falls back to `<path>.bak`.
    pub fn load<T: DeserializeOwned + Serialize + Default>(path: &Path, backup: bool) -> Result<T, ConfigError> {
        if !path.exists() {
            info!("No config at {}, writing defaults", path.display());
            let config = T::default();
            Self::save(path, &config, backup)?;
            return Ok(config);
        }

        match read(path) {
            Ok(config) => Ok(config),
            Err(err) => {
                error!("Failed to load config file {}: {}", path.display(), err);
                let backup_path = backup_path(path);
                if !backup || !backup_path.exists() {
                    return Err(err);
                }

                warn!("Trying to load config backup file {}", backup_path.display());
                read(&backup_path).inspect_err(|err| {
                    error!("Failed to load config backup file {}: {}", backup_path.display(), err);
                })
            }
        }
    }

    /// Writes `config` as pretty JSON. With `backup`, the previous file is
    /// kept as `<path>.bak`.
    pub fn save<T: Serialize>(path: &Path, config: &T, backup: bool) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(config).map_err(|source| ConfigError::Json { path: path.to_owned(), source })?;

        if backup && path.exists() {
            let backup_path = backup_path(path);
            fs::rename(path, &backup_path).map_err(|source| ConfigError::Io { path: backup_path, source })?;
        }

        fs::write(path, content).map_err(|source| ConfigError::Io { path: path.to_owned(), source })
    }
}
