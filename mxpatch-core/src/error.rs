//! Error types for mxpatch-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading configuration or resolving environments.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.mxpatch/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config YAML file did not exist at the expected path.
    #[error("config not found at {path}; run `mxpatch init` first")]
    ConfigNotFound { path: PathBuf },

    /// `init` refused to replace an existing config.
    #[error("config already exists at {path} (use --force to overwrite)")]
    AlreadyExists { path: PathBuf },

    /// The environment name is not part of the configured set.
    #[error("unknown environment '{name}'; configured: {known}")]
    UnknownEnvironment { name: String, known: String },

    /// The vendor properties file for an environment is missing.
    #[error("properties file not found at {path}")]
    PropertiesNotFound { path: PathBuf },

    /// The connection URL in a properties file is absent or malformed.
    #[error("invalid connection url in {path}: {reason}")]
    InvalidConnectionUrl { path: PathBuf, reason: String },
}

impl ConfigError {
    /// True for errors meaning "the installation is not configured", which
    /// abort a run before any work starts.
    pub fn is_missing_configuration(&self) -> bool {
        matches!(
            self,
            ConfigError::ConfigNotFound { .. }
                | ConfigError::PropertiesNotFound { .. }
                | ConfigError::HomeNotFound
        )
    }
}
