//! Configuration file parsing for `crescent.toml`.
//!
//! Searches current directory then ancestors, falling back to
//! `~/.config/crescent/crescent.toml` if no project-level file is found.

use crate::error::LoadError;
use crescent_vm::TraceFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "crescent.toml";

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct CrescentConfig {
    #[serde(default)]
    pub run: RunSection,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct RunSection {
    /// Print a trace of every journey to stderr.
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub trace: TraceFormat,
    /// Network file to use instead of the bundled London one. Relative paths
    /// are resolved against the directory holding the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<PathBuf>,
}

impl CrescentConfig {
    /// Load config from `crescent.toml`, searching current dir then parents.
    /// Returns `Default` when no file is found.
    pub fn load() -> Result<Self, LoadError> {
        Ok(Self::load_with_path()?
            .map(|(_path, cfg)| cfg)
            .unwrap_or_default())
    }

    /// Load config and return the path to the config file that was found.
    pub fn load_with_path() -> Result<Option<(PathBuf, Self)>, LoadError> {
        let Ok(cwd) = std::env::current_dir() else {
            return Ok(None);
        };
        let global = dirs::home_dir()
            .map(|home| home.join(".config").join("crescent").join(CONFIG_FILE));
        match Self::find(&cwd, global.as_deref()) {
            Some(path) => Ok(Some((path.clone(), Self::load_from(&path)?))),
            None => Ok(None),
        }
    }

    /// The first `crescent.toml` in `start` or its ancestors, else `global`
    /// if it exists.
    pub fn find(start: &Path, global: Option<&Path>) -> Option<PathBuf> {
        let found = start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file());
        found.or_else(|| global.filter(|g| g.is_file()).map(Path::to_path_buf))
    }

    /// Load config from a specific file path. A relative `network` is made
    /// relative to that file.
    pub fn load_from(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::read(path, e))?;
        let mut cfg = Self::from_str(&content).map_err(|source| LoadError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        if let (Some(network), Some(dir)) = (cfg.run.network.as_mut(), path.parent()) {
            if network.is_relative() {
                *network = dir.join(&*network);
            }
        }
        Ok(cfg)
    }

    /// Parse a TOML string directly.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Write the default template into `dir`. Never overwrites.
    pub fn init(dir: &Path) -> Result<PathBuf, LoadError> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            return Err(LoadError::AlreadyExists(path));
        }
        std::fs::write(&path, Self::default_template()).map_err(|source| LoadError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Generate a default `crescent.toml` template.
    pub fn default_template() -> &'static str {
        r#"# Mornington Crescent interpreter configuration

[run]
# Print every journey with the accumulator and cell before and after.
verbose = false

# Trace format when verbose: "text" or "json" (one JSON object per journey).
trace = "text"

# Use a different network instead of the London Underground.
# network = "networks/london.toml"
"#
    }
}
