//! XDG-compliant path resolution for aida-viz.
//!
//! Provides `VizPaths`, the global configuration and data directories,
//! following the XDG Base Directory Specification.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(aida_viz::paths::no_home),
        help("Set the HOME environment variable or pass --config explicitly.")
    )]
    NoHome,
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories for aida-viz.
#[derive(Debug, Clone)]
pub struct VizPaths {
    /// `$XDG_CONFIG_HOME/aida-viz/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/aida-viz/`
    pub data_dir: PathBuf,
}

impl VizPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("aida-viz");

        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/share"))
            .join("aida-viz");

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Path to the global config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Conventional location of a corpus database built into the data directory.
    pub fn default_database(&self) -> PathBuf {
        self.data_dir.join("databases").join("documents.sqlite")
    }
}
