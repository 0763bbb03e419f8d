//! Persistent user settings.
//!
//! Stored as JSON at `<config dir>/tidycsv/config.json`. A missing or
//! unreadable file yields the defaults.

use crate::error::{Result, ResultExt as _};
use crate::logging::APP_DIR_NAME;
use crate::pipeline::{Operation, OperationSet};
use crate::table::{LoadOptions, WriteOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    /// Operations used when a run does not name any
    pub default_operations: Vec<Operation>,
    /// Rows scanned for type inference; `None` scans the whole file
    pub infer_schema_length: Option<usize>,
    /// Whether an existing output file may be replaced
    pub overwrite_output: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_operations: Vec::new(),
            infer_schema_length: None,
            overwrite_output: true,
        }
    }
}

impl AppSettings {
    pub fn default_operation_set(&self) -> OperationSet {
        self.default_operations.iter().copied().collect()
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            infer_schema_length: self.infer_schema_length,
        }
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            overwrite: self.overwrite_output,
        }
    }
}

pub fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("config.json")
}

pub fn load_app_config() -> AppSettings {
    load_app_config_from(&get_config_path())
}

pub fn load_app_config_from(path: &Path) -> AppSettings {
    if path.exists()
        && let Ok(content) = std::fs::read_to_string(path)
    {
        match serde_json::from_str::<AppSettings>(&content) {
            Ok(settings) => return settings,
            Err(e) => tracing::warn!(
                "Ignoring unreadable settings file {}: {e}",
                path.display()
            ),
        }
    }

    AppSettings::default()
}

/// Save settings to the per-user settings file.
///
/// # Errors
///
/// See [`save_app_config_to`].
pub fn save_app_config(settings: &AppSettings) -> Result<()> {
    save_app_config_to(settings, &get_config_path())
}

/// Save settings as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Returns an I/O error if the directory or file cannot be written.
pub fn save_app_config_to(settings: &AppSettings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content).context("Failed to write settings file")?;
    Ok(())
}
