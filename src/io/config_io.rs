use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery::atomic_write;
use crate::io::storage::is_valid_key;
use crate::model::config::{AppConfig, StorageConfig, Theme};

pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "TASKPAD_HOME";

/// Error type for configuration I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse config.toml: {0}")]
    DocumentError(#[from] toml_edit::TomlError),
    #[error(
        "invalid storage.{field} {key:?} in config.toml: use letters, digits, '-' or '_'"
    )]
    InvalidStorageKey { field: &'static str, key: String },
    #[error("storage.tasks_key and storage.categories_key must differ (both are {0:?})")]
    DuplicateStorageKeys(String),
}

/// Pick the data directory: explicit flag, then `$TASKPAD_HOME`, then
/// `$XDG_DATA_HOME/taskpad`, then `$HOME/.local/share/taskpad`.
pub fn resolve_data_dir(flag: Option<&str>) -> PathBuf {
    resolve_data_dir_with(flag, |key| std::env::var(key).ok())
}

fn resolve_data_dir_with(flag: Option<&str>, env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = flag {
        return PathBuf::from(dir);
    }
    if let Some(dir) = env(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    let data_home = env("XDG_DATA_HOME")
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            env("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/"))
                .join(".local")
                .join("share")
        });
    data_home.join("taskpad")
}

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for formatting-preserving edits. A missing file
/// yields the defaults and an empty document.
pub fn read_config(data_dir: &Path) -> Result<(AppConfig, toml_edit::DocumentMut), ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    let config_text = match fs::read_to_string(&config_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            String::new()
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: config_path,
                source: e,
            });
        }
    };
    let config: AppConfig = toml::from_str(&config_text)?;
    validate_storage(&config.storage)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Both blobs need their own key, and keys become file names.
fn validate_storage(storage: &StorageConfig) -> Result<(), ConfigError> {
    for (field, key) in [
        ("tasks_key", &storage.tasks_key),
        ("categories_key", &storage.categories_key),
    ] {
        if !is_valid_key(key) {
            return Err(ConfigError::InvalidStorageKey {
                field,
                key: key.clone(),
            });
        }
    }
    if storage.tasks_key == storage.categories_key {
        return Err(ConfigError::DuplicateStorageKeys(storage.tasks_key.clone()));
    }
    Ok(())
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    fs::create_dir_all(data_dir).map_err(|e| ConfigError::WriteError {
        path: data_dir.to_path_buf(),
        source: e,
    })?;
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| {
        ConfigError::WriteError {
            path: config_path,
            source: e,
        }
    })
}

/// Set `[ui] theme` in the config document
pub fn set_theme(doc: &mut toml_edit::DocumentMut, theme: Theme) {
    if !doc.contains_key("ui") {
        doc["ui"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["ui"]["theme"] = toml_edit::value(theme.as_str());
}
