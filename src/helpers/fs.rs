//! File System Utilities
//!
//! Configuration directory lookup.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "chemviz", "chemviz").ok_or_else(|| Error::Invalid {
        message: "Could not determine project directories".to_string(),
    })
}

/// Get or create the application's configuration directory
///
/// Platform-specific locations:
/// - **Linux**: `~/.config/chemviz/` or `$XDG_CONFIG_HOME/chemviz/`
/// - **macOS**: `~/Library/Application Support/com.chemviz.chemviz/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\chemviz\chemviz\config\`
pub fn get_or_create_config_dir() -> Result<PathBuf> {
    let project_dirs = project_dirs()?;
    let config_dir = project_dirs.config_dir();

    if !config_dir.exists() {
        fs::create_dir_all(config_dir)?;
    }

    Ok(config_dir.to_path_buf())
}
