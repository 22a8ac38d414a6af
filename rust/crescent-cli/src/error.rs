//! Errors raised while gathering what a run needs: scripts, networks, config
//! and parameters.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid toml in '{path}': {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid network '{name}': {reason}")]
    Network { name: String, reason: String },
    #[error("'{0}' already exists")]
    AlreadyExists(PathBuf),
    #[error("unknown parameter '{name}' for {language}")]
    UnknownParam { name: String, language: String },
    #[error("parameter '{name}' expects {expected}, got '{value}'")]
    BadParam {
        name: String,
        expected: &'static str,
        value: String,
    },
    #[error("malformed parameter '{0}' (expected NAME=VALUE)")]
    MalformedParam(String),
    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Read {
            path: path.into(),
            source,
        }
    }
}
