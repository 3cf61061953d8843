//! User configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.orgdelta/
//!   config.yaml     (mode 0600; directory mode 0700)
//! ```
//!
//! Session ids are never stored here; they come from flags or env vars.
//!
//! # API pattern
//!
//! Every function that touches disk has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::FolderTypeTable;
use crate::error::ConfigError;
use crate::types::{OrgCredentials, SessionId, DEFAULT_API_VERSION};

/// A named org (e.g. `dev`, `uat`, `prod`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub instance_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Environment {
    /// Combine with a session id into request credentials.
    pub fn credentials(&self, session_id: SessionId) -> OrgCredentials {
        OrgCredentials {
            instance_url: self.instance_url.clone(),
            session_id,
            api_version: self.api_version.clone(),
        }
    }
}

/// Root of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    /// Version tag written at the end of synthesized manifests.
    #[serde(default = "default_api_version")]
    pub manifest_version: String,
    #[serde(default)]
    pub environments: Vec<Environment>,
    /// Extra or replacement folder → type mappings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub folder_types: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            manifest_version: default_api_version(),
            environments: Vec::new(),
            folder_types: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up an environment by name.
    pub fn environment_at(&self, home: &Path, name: &str) -> Result<&Environment, ConfigError> {
        self.environments
            .iter()
            .find(|env| env.name == name)
            .ok_or_else(|| ConfigError::UnknownEnvironment {
                name: name.to_string(),
                path: config_path_at(home),
            })
    }

    /// Insert or replace the environment with the same name.
    pub fn upsert_environment(&mut self, environment: Environment) {
        match self
            .environments
            .iter_mut()
            .find(|env| env.name == environment.name)
        {
            Some(existing) => *existing = environment,
            None => self.environments.push(environment),
        }
        self.environments.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Remove an environment; returns whether one was removed.
    pub fn remove_environment(&mut self, name: &str) -> bool {
        let before = self.environments.len();
        self.environments.retain(|env| env.name != name);
        self.environments.len() != before
    }

    /// Default classification table with this config's overrides applied.
    pub fn folder_table(&self) -> FolderTypeTable {
        FolderTypeTable::default().with_overrides(&self.folder_types)
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

// ---------------------------------------------------------------------------
// 1. Paths
// ---------------------------------------------------------------------------

/// `<home>/.orgdelta/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".orgdelta").join("config.yaml")
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the config, or [`Config::default`] when the file does not exist yet.
///
/// Returns `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save to `<home>/.orgdelta/config.yaml`.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    let path = config_path_at(home);
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            set_dir_permissions(dir)?;
        }
    }
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
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
