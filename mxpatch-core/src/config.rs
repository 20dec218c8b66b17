//! YAML configuration for an mxpatch installation.
//!
//! # Storage layout
//!
//! ```text
//! ~/.mxpatch/
//!   config.yaml        (mode 0600, written by `mxpatch init`)
//!   templates/         (optional `<kind>.tera` argument overrides)
//!   logs/              (skip logs, one file per cleanup run)
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::EnvironmentName;

pub const CONFIG_VERSION: u32 = 1;

pub const DEFAULT_EXPORT_CLASS: &str = "psdi.webclient.upgrade.MXScreenExport";
pub const DEFAULT_DIFF_CLASS: &str = "psdi.webclient.upgrade.MXDiff";
pub const DEFAULT_INSERT_CLASS: &str = "psdi.tools.GenInsertDML";
pub const DEFAULT_CLOSING_MARKER: &str = "</presentation>";
pub const DEFAULT_LIST_QUERY: &str = "SELECT app, maxpresentationid FROM maxpresentation";
pub const DEFAULT_AUTHOR: &str = "MXPATCH";
pub const DEFAULT_STRUCTURAL_KEY: &str = "column";

// ---------------------------------------------------------------------------
// 1. Shape
// ---------------------------------------------------------------------------

/// Root of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    /// Root of the vendor installation; defaults below are derived from it.
    pub maximo_root: PathBuf,
    #[serde(default)]
    pub environments: BTreeMap<EnvironmentName, EnvironmentConfig>,
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    #[serde(default)]
    pub screens: ScreensConfig,
    #[serde(default)]
    pub tables: TablesConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
}

/// Where one environment's vendor properties live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub properties: PathBuf,
}

/// Runtime and classpath handed to every tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classpath: Vec<PathBuf>,
    /// Value for `-Xmx`, e.g. `1024m`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_heap: Option<String>,
    /// Extra variables for the child process only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// Screen export / diff pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreensConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_root: Option<PathBuf>,
    #[serde(default = "default_export_class")]
    pub export_class: String,
    #[serde(default = "default_diff_class")]
    pub diff_class: String,
    #[serde(default = "default_closing_marker")]
    pub closing_marker: String,
    #[serde(default = "default_list_query")]
    pub list_query: String,
}

impl Default for ScreensConfig {
    fn default() -> Self {
        Self {
            export_root: None,
            export_class: default_export_class(),
            diff_class: default_diff_class(),
            closing_marker: default_closing_marker(),
            list_query: default_list_query(),
        }
    }
}

/// Table insert-script pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_root: Option<PathBuf>,
    #[serde(default = "default_insert_class")]
    pub insert_class: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_structural_key")]
    pub structural_key: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            output_root: None,
            insert_class: default_insert_class(),
            author: default_author(),
            structural_key: default_structural_key(),
        }
    }
}

fn default_export_class() -> String {
    DEFAULT_EXPORT_CLASS.to_string()
}
fn default_diff_class() -> String {
    DEFAULT_DIFF_CLASS.to_string()
}
fn default_insert_class() -> String {
    DEFAULT_INSERT_CLASS.to_string()
}
fn default_closing_marker() -> String {
    DEFAULT_CLOSING_MARKER.to_string()
}
fn default_list_query() -> String {
    DEFAULT_LIST_QUERY.to_string()
}
fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}
fn default_structural_key() -> String {
    DEFAULT_STRUCTURAL_KEY.to_string()
}

impl Config {
    /// Fresh config with no environments, rooted at `maximo_root`.
    pub fn new(maximo_root: PathBuf) -> Self {
        Self {
            version: CONFIG_VERSION,
            maximo_root,
            environments: BTreeMap::new(),
            toolchain: ToolchainConfig::default(),
            screens: ScreensConfig::default(),
            tables: TablesConfig::default(),
            log_dir: None,
            created_at: Utc::now(),
        }
    }

    /// Working directory of the screen tools; exports and diffs land here.
    pub fn export_root(&self) -> PathBuf {
        self.screens.export_root.clone().unwrap_or_else(|| {
            self.maximo_root
                .join("tools")
                .join("maximo")
                .join("screen-upgrade")
        })
    }

    /// Directory the insert generator writes `.dbc` files into.
    pub fn output_root(&self) -> PathBuf {
        self.tables.output_root.clone().unwrap_or_else(|| {
            self.maximo_root
                .join("tools")
                .join("maximo")
                .join("en")
                .join("mxpatch")
        })
    }

    /// Classpath entries; derived from `maximo_root` when none are configured.
    pub fn classpath(&self) -> Vec<PathBuf> {
        if !self.toolchain.classpath.is_empty() {
            return self.toolchain.classpath.clone();
        }
        let app = self.maximo_root.join("applications").join("maximo");
        vec![
            app.join("properties"),
            app.join("resources"),
            app.join("businessobjects").join("classes"),
            app.join("maximouiweb")
                .join("webmodule")
                .join("WEB-INF")
                .join("classes"),
            self.maximo_root.join("tools").join("maximo").join("classes"),
            app.join("lib").join("*"),
        ]
    }

    /// Names of every configured environment, sorted.
    pub fn environment_names(&self) -> Vec<&EnvironmentName> {
        self.environments.keys().collect()
    }
}

// ---------------------------------------------------------------------------
// 2. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.mxpatch/`
pub fn mxpatch_root(home: &Path) -> PathBuf {
    home.join(".mxpatch")
}

/// `<home>/.mxpatch/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    mxpatch_root(home).join("config.yaml")
}

/// `<home>/.mxpatch/templates/`: user overrides for tool argument templates.
pub fn templates_dir_at(home: &Path) -> PathBuf {
    mxpatch_root(home).join("templates")
}

/// Skip-log directory: the configured `log_dir`, else `<home>/.mxpatch/logs/`.
pub fn log_dir_at(home: &Path, config: &Config) -> PathBuf {
    config
        .log_dir
        .clone()
        .unwrap_or_else(|| mxpatch_root(home).join("logs"))
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load `<home>/.mxpatch/config.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    let config: Config =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
    tracing::debug!(
        environments = config.environments.len(),
        "loaded configuration"
    );
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the config to `<home>/.mxpatch/config.yaml`.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    let dir = mxpatch_root(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// 5. Init
// ---------------------------------------------------------------------------

/// Write a starter config rooted at `maximo_root`.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn init_at(home: &Path, maximo_root: PathBuf, force: bool) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists { path });
    }
    let config = Config::new(maximo_root);
    save_at(home, &config)?;
    Ok(config)
}

/// `init_at` convenience wrapper.
pub fn init(maximo_root: PathBuf, force: bool) -> Result<Config, ConfigError> {
    init_at(&home()?, maximo_root, force)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
