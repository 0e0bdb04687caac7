//! Run configuration for shelf.
//!
//! Values are merged with [figment], later sources overriding earlier ones:
//!
//! 1. built-in defaults,
//! 2. `config.toml`, `config.yaml` and `config.json` in the platform config
//!    directory (e.g. `~/.config/shelf/` on Linux),
//! 3. an explicitly given config file (format chosen by extension),
//! 4. `SHELF_`-prefixed environment variables (`SHELF_SCHEMA`, `SHELF_KEYS`,
//!    `SHELF_LIBRARIES='["/a", "/b"]'`, `SHELF_DIR_VARS='{v1="/mnt"}'`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use shelf_library::{DirVar, DirVars, KeyType};
use std::path::{Path, PathBuf};

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "SHELF_";
/// File name of a library root's schema.
pub const SCHEMA_FILE_NAME: &str = "schema.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Schema file. Defaults to `schema.json` in each library root.
    pub schema: Option<PathBuf>,
    /// Library roots, each containing one directory per book.
    pub libraries: Vec<PathBuf>,
    /// Bindings for `{name}` placeholders in file directories.
    pub dir_vars: DirVars,
    /// How keys are assigned for relational output.
    pub keys: KeyType,
}
impl Config {
    /// Loads configuration from every source, see the [crate] docs.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::extract(Self::figment(Self::config_dir().as_deref(), file)?)
    }

    /// The platform-specific directory searched for config files.
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "shelf").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Builds the layered figment without extracting it.
    pub fn figment(config_dir: Option<&Path>, file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(dir) = config_dir {
            figment = figment
                .merge(Toml::file(dir.join("config.toml")))
                .merge(Yaml::file(dir.join("config.yaml")))
                .merge(Json::file(dir.join("config.json")));
        }
        if let Some(file) = file {
            if !file.is_file() {
                exn::bail!(ErrorKind::NotFound(file.to_path_buf()));
            }
            tracing::debug!(file = %file.display(), "Using config file");
            figment = match file.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => figment.merge(Toml::file(file)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Deserializes and validates a figment.
    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        for (name, value) in config.dir_vars.iter() {
            format!("{name}={value}").parse::<DirVar>().or_raise(|| ErrorKind::DirVar(name.to_string()))?;
        }
        if config.libraries.is_empty() {
            exn::bail!(ErrorKind::NoLibraries);
        }
        tracing::debug!(libraries = config.libraries.len(), dir_vars = %config.dir_vars, "Loaded config");
        Ok(config)
    }

    /// Where to read each library root's schema from, paired with the root.
    pub fn schema_paths(&self) -> Vec<(PathBuf, PathBuf)> {
        self.libraries
            .iter()
            .map(|root| (root.clone(), self.schema.clone().unwrap_or_else(|| root.join(SCHEMA_FILE_NAME))))
            .collect()
    }
}
