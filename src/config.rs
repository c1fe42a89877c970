//! Tool configuration, persisted as TOML.
//!
//! Loaded from `--config`, else `$XDG_CONFIG_HOME/aida-viz/config.toml` when it
//! exists, else built-in defaults. Every section and field is optional.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths::VizPaths;

/// Errors from configuration loading.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(aida_viz::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(aida_viz::config::parse),
        help("Check the TOML syntax. Unknown keys are rejected.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(aida_viz::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VizConfig {
    pub container: ContainerConfig,
    pub env: EnvConfig,
    pub render: RenderConfig,
    pub batch: BatchConfig,
}

/// How the container launcher invokes the visualizer image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
    /// Container runtime binary (`docker`, `podman`).
    pub runtime: String,
    /// Image whose entrypoint is `aida-viz render`.
    pub image: String,
    /// In-container directory under which inputs are mounted.
    pub mount_root: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: "docker".into(),
            image: "aida-viz:latest".into(),
            mount_root: "/aida".into(),
        }
    }
}

/// Environment variable names carrying the three job parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    pub aif_var: String,
    pub db_var: String,
    pub out_var: String,
}

pub const DEFAULT_AIF_VAR: &str = "AIDA_VIZ_AIF";
pub const DEFAULT_DB_VAR: &str = "AIDA_VIZ_DB";
pub const DEFAULT_OUT_VAR: &str = "AIDA_VIZ_OUT";

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            aif_var: DEFAULT_AIF_VAR.into(),
            db_var: DEFAULT_DB_VAR.into(),
            out_var: DEFAULT_OUT_VAR.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Overrides the AIDA ontology namespace when the input does not declare `aida:`.
    pub aida_namespace: Option<String>,
    /// Corpus database used when none is given on the command line.
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Stop at the first failed job instead of continuing with the manifest.
    pub fail_fast: bool,
}

impl VizConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Explicit path if given, else the XDG config file if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>, paths: Option<&VizPaths>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match paths.map(VizPaths::config_file) {
            Some(file) if file.is_file() => {
                tracing::debug!(path = %file.display(), "loading config");
                Self::load(&file)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
