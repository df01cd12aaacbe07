//! Configuration management for `tracker_dash`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`JD_*`, plus `JIRA_BASE_URL`, `JIRA_EMAIL`,
//!    `JIRA_API_TOKEN`)
//! 3. Project config (.jd/config.yaml)
//! 4. User config (~/.config/jd/config.yaml)
//! 5. Defaults
//!
//! Keys are flat, dotted strings (`jira.base-url`, `timeout-secs`). Nested
//! YAML mappings are flattened into that form on load.

use crate::error::{DashError, Result};
use crate::remote::{FixtureSource, IssueSource, JiraClient};
use crate::storage::SqliteStorage;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Name of the workspace directory.
pub const WORKSPACE_DIR: &str = ".jd";

/// Database filename inside the workspace.
pub const DEFAULT_DB_FILENAME: &str = "dashboard.db";

/// Default HTTP timeout for the remote source.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default `SQLite` busy timeout.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;

const KEY_SOURCE: &str = "source";
const KEY_FIXTURE: &str = "fixture";
const KEY_BASE_URL: &str = "jira.base-url";
const KEY_EMAIL: &str = "jira.email";
const KEY_API_TOKEN: &str = "jira.api-token";
const KEY_TIMEOUT: &str = "timeout-secs";
const KEY_DB: &str = "db";
const KEY_LOCK_TIMEOUT: &str = "lock-timeout";

/// Keys whose values are never printed.
const SECRET_KEYS: &[&str] = &[KEY_API_TOKEN];

/// Discover the active `.jd` directory.
///
/// Honors `JD_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns `NotInitialized` if no workspace is found, or an I/O error if the
/// CWD cannot be read.
pub fn discover_workspace(start: Option<&Path>) -> Result<PathBuf> {
    let env_dir = env::var("JD_DIR").ok().map(PathBuf::from);
    discover_workspace_with_env(start, env_dir.as_deref())
}

fn discover_workspace_with_env(start: Option<&Path>, env_override: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = env_override {
        if !path.as_os_str().is_empty() && path.is_dir() {
            return Ok(path.to_path_buf());
        }
    }

    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(WORKSPACE_DIR);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if !current.pop() {
            break;
        }
    }

    Err(DashError::NotInitialized)
}

/// A flat set of configuration values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }

    /// Build a layer from an explicit set of environment variables.
    #[must_use]
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();

        for (key, value) in vars {
            match key.as_str() {
                "JIRA_BASE_URL" => layer.set(KEY_BASE_URL, value),
                "JIRA_EMAIL" => layer.set(KEY_EMAIL, value),
                "JIRA_API_TOKEN" => layer.set(KEY_API_TOKEN, value),
                "JD_DIR" => {}
                _ => {
                    if let Some(stripped) = key.strip_prefix("JD_") {
                        layer.set(&env_key(stripped), value);
                    }
                }
            }
        }

        layer
    }

    pub fn set(&mut self, key: &str, value: String) {
        self.values.insert(normalize_key(key), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(String::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// All values, sorted by key, with secrets masked.
    #[must_use]
    pub fn redacted_entries(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(key, value)| {
                let shown = if SECRET_KEYS.contains(&key.as_str()) && !value.is_empty() {
                    "********".to_string()
                } else {
                    value.clone()
                };
                (key.clone(), shown)
            })
            .collect()
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub source: Option<String>,
    pub fixture: Option<PathBuf>,
    pub lock_timeout: Option<u64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            layer.set(KEY_DB, path.to_string_lossy().to_string());
        }
        if let Some(source) = &self.source {
            layer.set(KEY_SOURCE, source.clone());
        }
        if let Some(path) = &self.fixture {
            layer.set(KEY_FIXTURE, path.to_string_lossy().to_string());
            // A fixture path on the command line implies the fixture source.
            if self.source.is_none() {
                layer.set(KEY_SOURCE, "fixture".to_string());
            }
        }
        if let Some(lock_timeout) = self.lock_timeout {
            layer.set(KEY_LOCK_TIMEOUT, lock_timeout.to_string());
        }

        layer
    }
}

/// Load project config (.jd/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(workspace: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&workspace.join("config.yaml"))
}

/// Load user config (~/.config/jd/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("jd")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.set(KEY_SOURCE, "remote".to_string());
    layer.set(KEY_TIMEOUT, DEFAULT_TIMEOUT_SECS.to_string());
    layer.set(KEY_LOCK_TIMEOUT, DEFAULT_LOCK_TIMEOUT_MS.to_string());
    layer
}

/// Load configuration with the full precedence order.
///
/// `workspace` is optional: read-only commands work without one.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(workspace: Option<&Path>, cli: &CliOverrides) -> Result<ConfigLayer> {
    let defaults = default_config_layer();
    let user = load_user_config()?;
    let project = match workspace {
        Some(dir) => load_project_config(dir)?,
        None => ConfigLayer::default(),
    };
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    Ok(ConfigLayer::merge_layers(&[
        defaults, user, project, env_layer, cli_layer,
    ]))
}

/// Workspace (if any) plus the merged configuration for one command run.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub workspace: Option<PathBuf>,
    pub layer: ConfigLayer,
}

impl LoadedConfig {
    /// Build the configured issue source.
    ///
    /// # Errors
    ///
    /// See [`SourceConfig::from_layer`] and [`SourceConfig::build`].
    pub fn source(&self) -> Result<Box<dyn IssueSource>> {
        SourceConfig::from_layer(&self.layer)?.build()
    }

    /// Open the local store.
    ///
    /// # Errors
    ///
    /// See [`open_storage`].
    pub fn storage(&self) -> Result<SqliteStorage> {
        open_storage(&self.layer, self.workspace.as_deref())
    }
}

/// Discover the workspace (absence is fine) and load config for a command.
///
/// # Errors
///
/// Returns an error if the CWD cannot be read or a config file is invalid.
pub fn load_for_command(cli: &CliOverrides) -> Result<LoadedConfig> {
    let workspace = match discover_workspace(None) {
        Ok(dir) => Some(dir),
        Err(DashError::NotInitialized) => None,
        Err(err) => return Err(err),
    };
    let layer = load_config(workspace.as_deref(), cli)?;
    Ok(LoadedConfig { workspace, layer })
}

/// Resolved settings for the live remote.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Which issue source to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Remote(RemoteConfig),
    Fixture(PathBuf),
}

impl SourceConfig {
    /// Resolve the source selection from a merged layer.
    ///
    /// # Errors
    ///
    /// Returns a config error for an unknown source name, a fixture source
    /// without a path, a remote source with missing credentials, or an
    /// unparseable timeout.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        match layer.get(KEY_SOURCE).unwrap_or("remote") {
            "fixture" => layer
                .get(KEY_FIXTURE)
                .map(|p| Self::Fixture(PathBuf::from(p)))
                .ok_or_else(|| {
                    DashError::Config("source is 'fixture' but no fixture path is set".to_string())
                }),
            "remote" => {
                let require = |key: &str, env_name: &str| -> Result<String> {
                    layer.get(key).map(str::to_string).ok_or_else(|| {
                        DashError::Config(format!("missing '{key}' (or set {env_name})"))
                    })
                };
                Ok(Self::Remote(RemoteConfig {
                    base_url: require(KEY_BASE_URL, "JIRA_BASE_URL")?,
                    email: require(KEY_EMAIL, "JIRA_EMAIL")?,
                    api_token: require(KEY_API_TOKEN, "JIRA_API_TOKEN")?,
                    timeout: Duration::from_secs(timeout_secs_from_layer(layer)?),
                }))
            }
            other => Err(DashError::Config(format!(
                "unknown source '{other}' (expected 'remote' or 'fixture')"
            ))),
        }
    }

    /// Construct the configured source.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be loaded or the client cannot
    /// be built.
    pub fn build(&self) -> Result<Box<dyn IssueSource>> {
        match self {
            Self::Remote(remote) => {
                debug!(base_url = %remote.base_url, "Using remote issue source");
                Ok(Box::new(JiraClient::new(remote)?))
            }
            Self::Fixture(path) => {
                debug!(path = %path.display(), "Using fixture issue source");
                Ok(Box::new(FixtureSource::load(path)?))
            }
        }
    }
}

/// Remote timeout in seconds.
///
/// # Errors
///
/// Returns a config error if the value is not a positive integer.
pub fn timeout_secs_from_layer(layer: &ConfigLayer) -> Result<u64> {
    let Some(raw) = layer.get(KEY_TIMEOUT) else {
        return Ok(DEFAULT_TIMEOUT_SECS);
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(DashError::Config(format!(
            "{KEY_TIMEOUT} must be a positive integer, got '{raw}'"
        ))),
    }
}

/// Busy timeout for the store, in milliseconds.
#[must_use]
pub fn lock_timeout_from_layer(layer: &ConfigLayer) -> u64 {
    layer
        .get(KEY_LOCK_TIMEOUT)
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_LOCK_TIMEOUT_MS)
}

/// Resolve the database path: explicit `db` wins, else the workspace default.
///
/// # Errors
///
/// Returns `NotInitialized` when neither is available.
pub fn db_path_from_layer(layer: &ConfigLayer, workspace: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = layer.get(KEY_DB) {
        return Ok(PathBuf::from(path));
    }
    workspace
        .map(|dir| dir.join(DEFAULT_DB_FILENAME))
        .ok_or(DashError::NotInitialized)
}

/// Open the store described by `layer`.
///
/// # Errors
///
/// Returns an error if no database path can be resolved, the database file
/// does not exist, or it cannot be opened.
pub fn open_storage(layer: &ConfigLayer, workspace: Option<&Path>) -> Result<SqliteStorage> {
    let path = db_path_from_layer(layer, workspace)?;
    if !path.exists() {
        return Err(DashError::DatabaseNotFound { path });
    }
    SqliteStorage::open_with_timeout(&path, Some(lock_timeout_from_layer(layer)))
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

/// `JD_JIRA__BASE_URL` → `jira.base-url`; a double underscore nests.
fn env_key(raw: &str) -> String {
    raw.to_lowercase()
        .split("__")
        .map(|part| part.replace('_', "-"))
        .collect::<Vec<_>>()
        .join(".")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.set(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
