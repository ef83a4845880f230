use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".personal-library";
/// Library document stored inside the application data directory.
const LIBRARY_FILE_NAME: &str = "library.json";
/// Log file written next to the library.
const LOG_FILE_NAME: &str = "library-manager.log";

/// Resolved locations for one run of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub library_path: PathBuf,
    pub log_path: PathBuf,
}

impl Settings {
    /// Use `library_override` when given, otherwise the default file in the
    /// home directory. The log always sits beside the library file.
    pub fn resolve(library_override: Option<PathBuf>) -> Result<Self> {
        let library_path = match library_override {
            Some(path) => path,
            None => data_dir()?.join(LIBRARY_FILE_NAME),
        };
        Ok(Self::for_library(library_path))
    }

    pub fn for_library(library_path: PathBuf) -> Self {
        let log_path = library_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(LOG_FILE_NAME);
        Self {
            library_path,
            log_path,
        }
    }

    /// Make sure the directory holding the library and log exists.
    pub fn ensure_dirs(&self) -> Result<()> {
        if let Some(parent) = self.library_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("failed to create data directory")?;
            }
        }
        Ok(())
    }
}

/// Resolve the application data directory inside the user's home.
fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
