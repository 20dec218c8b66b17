//! Environment resolver: maps a logical environment name to its vendor
//! properties file, and extracts database coordinates from that file.
//!
//! The set of environments is whatever `config.yaml` lists; nothing is
//! discovered at runtime.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ConfigError;
use crate::types::EnvironmentName;

/// Properties key holding the JDBC connection URL.
pub const URL_KEY: &str = "mxe.db.url";
pub const USER_KEY: &str = "mxe.db.user";
pub const PASSWORD_KEY: &str = "mxe.db.password";

const JDBC_PREFIX: &str = "jdbc:sqlserver://";
const DEFAULT_PORT: u16 = 1433;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Static lookup table built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentRegistry {
    entries: BTreeMap<EnvironmentName, PathBuf>,
}

impl EnvironmentRegistry {
    pub fn from_config(config: &Config) -> Self {
        let entries = config
            .environments
            .iter()
            .map(|(name, env)| (name.clone(), env.properties.clone()))
            .collect();
        Self { entries }
    }

    /// Resolve `name` to its configuration location. Pure lookup.
    pub fn resolve(&self, name: &str) -> Result<ResolvedEnvironment, ConfigError> {
        let key = EnvironmentName::from(name);
        match self.entries.get(&key) {
            Some(properties) => Ok(ResolvedEnvironment {
                name: key,
                properties: properties.clone(),
            }),
            None => Err(ConfigError::UnknownEnvironment {
                name: name.to_string(),
                known: self.known_names(),
            }),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &EnvironmentName> {
        self.entries.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn known_names(&self) -> String {
        if self.entries.is_empty() {
            return "(none)".to_string();
        }
        self.entries
            .keys()
            .map(|n| n.0.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A configured environment: its name and where its properties file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    pub name: EnvironmentName,
    pub properties: PathBuf,
}

impl ResolvedEnvironment {
    /// Read the properties file and extract the database coordinates.
    pub fn coordinates(&self) -> Result<ConnectionCoordinates, ConfigError> {
        let props = load_properties(&self.properties)?;
        ConnectionCoordinates::from_properties(&self.properties, &props)
    }
}

// ---------------------------------------------------------------------------
// Connection coordinates
// ---------------------------------------------------------------------------

/// Server, port, database and credentials pulled from a properties file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCoordinates {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectionCoordinates {
    /// Build coordinates from parsed properties; `path` is only used in errors.
    pub fn from_properties(
        path: &Path,
        props: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let url = props
            .get(URL_KEY)
            .ok_or_else(|| ConfigError::InvalidConnectionUrl {
                path: path.to_path_buf(),
                reason: format!("missing key '{URL_KEY}'"),
            })?;
        let (host, port, database) =
            parse_connection_url(url).map_err(|reason| ConfigError::InvalidConnectionUrl {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(Self {
            host,
            port,
            database,
            user: props.get(USER_KEY).cloned(),
            password: props.get(PASSWORD_KEY).cloned(),
        })
    }
}

/// Split `jdbc:sqlserver://host[:port];key=value;...` into host, port, database.
///
/// Segment keys are case-insensitive; `serverName` and `portNumber` segments
/// override the authority part.
pub fn parse_connection_url(url: &str) -> Result<(String, u16, String), String> {
    let trimmed = url.trim();
    let rest = trimmed
        .get(..JDBC_PREFIX.len())
        .filter(|prefix| prefix.eq_ignore_ascii_case(JDBC_PREFIX))
        .and_then(|_| trimmed.get(JDBC_PREFIX.len()..))
        .ok_or_else(|| format!("expected '{JDBC_PREFIX}' prefix"))?;
    let mut segments = rest.split(';');
    let authority = segments.next().unwrap_or_default().trim();

    let (mut host, mut port) = match authority.rsplit_once(':') {
        Some((h, p)) => (h.to_string(), parse_port(p)?),
        None => (authority.to_string(), DEFAULT_PORT),
    };
    let mut database = None;

    for segment in segments {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "databasename" | "database" => database = Some(value.to_string()),
            "servername" => host = value.to_string(),
            "portnumber" => port = parse_port(value)?,
            _ => {}
        }
    }

    if host.is_empty() {
        return Err("missing server host".to_string());
    }
    let database = database
        .filter(|d| !d.is_empty())
        .ok_or_else(|| "missing databaseName segment".to_string())?;
    Ok((host, port, database))
}

fn parse_port(raw: &str) -> Result<u16, String> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| format!("invalid port '{}'", raw.trim()))
}

// ---------------------------------------------------------------------------
// Properties files
// ---------------------------------------------------------------------------

/// Read and parse a vendor properties file.
pub fn load_properties(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::PropertiesNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse_properties(&text))
}

/// Parse `key=value` / `key: value` lines. `#` and `!` start comments; a
/// trailing backslash continues the logical line.
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let mut pending = String::new();

    for raw in text.lines() {
        let line = raw.trim_start();
        if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }
        if ends_with_continuation(line) {
            pending.push_str(&line[..line.len() - 1]);
            continue;
        }
        pending.push_str(line);
        let logical = std::mem::take(&mut pending);
        if let Some((key, value)) = split_entry(&logical) {
            out.insert(key, value);
        }
    }
    if !pending.is_empty() {
        if let Some((key, value)) = split_entry(&pending) {
            out.insert(key, value);
        }
    }
    out
}

fn ends_with_continuation(line: &str) -> bool {
    let slashes = line.chars().rev().take_while(|c| *c == '\\').count();
    slashes % 2 == 1
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => {
                let key = unescape(line[..idx].trim());
                let value = unescape(line[idx + 1..].trim_start());
                return (!key.is_empty()).then_some((key, value));
            }
            _ => {}
        }
    }
    let key = unescape(line.trim());
    (!key.is_empty()).then_some((key, String::new()))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
