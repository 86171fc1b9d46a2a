//! Configuration document loading and discovery.
//!
//! The configuration document supplies extra extension mappings. It can be
//! written as JSON or TOML; the file extension decides which:
//!
//! ```json
//! {
//!   "description": "My download folder rules",
//!   "customMappings": {
//!     ".md": "Notes",
//!     ".heic": "Images"
//!   }
//! }
//! ```
//!
//! ```toml
//! description = "My download folder rules"
//!
//! [customMappings]
//! ".md" = "Notes"
//! ".heic" = "Images"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default configuration document locations, relative to the working directory.
const LOCAL_CONFIG_CANDIDATES: &[&str] = &["config/config.json", ".dirsortrc.toml"];

/// Name of the ignore file looked up in the root and the working directory.
pub const IGNORE_FILE_NAME: &str = ".dirsortignore";

/// Errors that can occur while loading a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// Path of the document.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The document is not valid JSON/TOML or has the wrong shape.
    #[error("failed to parse config file {}: {reason}", path.display())]
    Parse {
        /// Path of the document.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
}

/// The configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Extension (with leading dot) to category name.
    #[serde(rename = "customMappings", alias = "custom_mappings", default)]
    pub custom_mappings: BTreeMap<String, String>,

    /// Free text, ignored by the organizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MappingConfig {
    /// Loads the document at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file exists but cannot be read and
    /// `ConfigError::Parse` if its content is malformed.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(path, &content).map(Some)
    }

    /// Parses `content`, picking TOML for `.toml` paths and JSON otherwise.
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let parsed: Result<Self, String> = if is_toml {
            toml::from_str(content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(content).map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })
    }
}

/// Picks the configuration document to load.
///
/// Attempts, in order:
/// 1. `explicit`, if given (even if it does not exist)
/// 2. `config/config.json` in the current directory
/// 3. `.dirsortrc.toml` in the current directory
/// 4. `~/.config/dirsort/config.toml`
pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(local) = LOCAL_CONFIG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    {
        return Some(local);
    }

    std::env::var_os("HOME")
        .map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml")
        })
        .filter(|p| p.exists())
}

/// Picks the ignore file: `explicit`, else `.dirsortignore` in `root`, else in
/// the current directory.
pub fn locate_ignore_file(explicit: Option<&Path>, root: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    [root.join(IGNORE_FILE_NAME), PathBuf::from(IGNORE_FILE_NAME)]
        .into_iter()
        .find(|p| p.exists())
}
