//! Configuration loading and data folder resolution
//!
//! Bootstrap settings come from an optional TOML file. Missing files are not
//! an error: the built-in defaults apply and a warning is logged.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::storage::atomic;
use crate::{Error, Result};

/// Environment variable naming the data folder
pub const DATA_FOLDER_ENV: &str = "SDM_DATA_FOLDER";

/// Settings loaded from `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the three relation files
    #[serde(default)]
    pub data_folder: Option<PathBuf>,

    /// Students per page in the listing view
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Relation file names inside the data folder
    #[serde(default)]
    pub files: FileNames,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            data_folder: None,
            page_size: default_page_size(),
            files: FileNames::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// File names of the students, subjects and grades relations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNames {
    #[serde(default = "default_students_file")]
    pub students: String,
    #[serde(default = "default_subjects_file")]
    pub subjects: String,
    #[serde(default = "default_grades_file")]
    pub grades: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            students: default_students_file(),
            subjects: default_subjects_file(),
            grades: default_grades_file(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_students_file() -> String {
    "students.csv".to_string()
}

fn default_subjects_file() -> String {
    "subjects.csv".to_string()
}

fn default_grades_file() -> String {
    "grades.csv".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".to_string()));
        }
        let names = [
            ("students", &self.files.students),
            ("subjects", &self.files.subjects),
            ("grades", &self.files.grades),
        ];
        for (relation, name) in names {
            if name.trim().is_empty() {
                return Err(Error::Config(format!("{} file name is empty", relation)));
            }
        }
        Ok(())
    }
}

/// Default configuration file path for the platform
///
/// `~/.config/sdm/config.toml` on Linux, the platform config dir elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sdm").join("config.toml"))
}

/// Load configuration from `path`
///
/// A missing file yields defaults; an unreadable or invalid one is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config file not found: {} (using defaults)", path.display());
            return Ok(TomlConfig::default());
        }
        Err(e) => {
            return Err(Error::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )))
        }
    };

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    config.validate()?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write configuration atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    atomic::write_atomic(path, content.as_bytes())?;
    Ok(())
}

/// Data folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `SDM_DATA_FOLDER` environment variable
/// 3. TOML `data_folder`
/// 4. OS-dependent default
pub fn resolve_data_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.data_folder {
        return path.clone();
    }

    default_data_folder()
}

/// OS-dependent default data folder
///
/// `~/.local/share/sdm` on Linux, `%LOCALAPPDATA%\sdm` on Windows.
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("sdm"))
        .unwrap_or_else(|| PathBuf::from("./sdm_data"))
}
