// ABOUTME: Configuration loading for voyage: YAML or JSON file plus command-line overrides.
// ABOUTME: Produces a validated Config; every missing required parameter is reported at once.

mod deserialize;
mod init;
mod log_level;

pub use init::init_config;
pub use log_level::LogLevel;

use crate::compose::RuntimeType;
use crate::error::{Error, Result};
use crate::types::{ManifestSet, RepositoryRef};
use deserialize::deserialize_compose_paths;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "voyage.yml";
pub const CONFIG_FILENAME_ALT: &str = "voyage.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".voyage/config.yml";

/// Configuration as written in a file. Every field may be supplied by flags instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub repo: Option<String>,

    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default, alias = "outPath")]
    pub out_path: Option<PathBuf>,

    #[serde(
        default,
        alias = "remoteComposePaths",
        deserialize_with = "deserialize_compose_paths"
    )]
    pub compose_paths: Option<NonEmpty<String>>,

    #[serde(default)]
    pub force: Option<bool>,

    #[serde(default, alias = "logLevel")]
    pub log_level: Option<LogLevel>,

    #[serde(default)]
    pub runtime: Option<RuntimeType>,

    #[serde(default)]
    pub daemon: Option<bool>,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

/// Values given on the command line. They win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub out_path: Option<PathBuf>,
    /// Replaces the file's list when non-empty.
    pub compose_paths: Vec<String>,
    /// Only ever turns force on.
    pub force: bool,
    pub log_level: Option<LogLevel>,
    pub runtime: Option<RuntimeType>,
    pub timeout: Option<Duration>,
    /// Run compose in the foreground instead of detached.
    pub foreground: bool,
}

/// Fully validated configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub repository: RepositoryRef,
    pub manifests: ManifestSet,
    pub force: bool,
    pub log_level: LogLevel,
    pub runtime: Option<RuntimeType>,
    pub daemon: bool,
    pub timeout: Option<Duration>,
}

impl ConfigFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::from)
    }

    /// Load a file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("yml" | "yaml") => Self::from_yaml(&std::fs::read_to_string(path)?),
            Some("json") => Self::from_json(&std::fs::read_to_string(path)?),
            _ => Err(Error::UnsupportedConfigFormat(path.to_path_buf())),
        }
    }

    /// Look for a config file in `dir`. Absence is not an error.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path).map(Some);
            }
        }

        Ok(None)
    }

    /// Layer command-line values over this file.
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(repo) = overrides.repo {
            self.repo = Some(repo);
        }
        if let Some(branch) = overrides.branch {
            self.branch = Some(branch);
        }
        if let Some(out_path) = overrides.out_path {
            self.out_path = Some(out_path);
        }
        if let Some(paths) = NonEmpty::from_vec(overrides.compose_paths) {
            self.compose_paths = Some(paths);
        }
        if overrides.force {
            self.force = Some(true);
        }
        if let Some(level) = overrides.log_level {
            self.log_level = Some(level);
        }
        if let Some(runtime) = overrides.runtime {
            self.runtime = Some(runtime);
        }
        if let Some(timeout) = overrides.timeout {
            self.timeout = Some(timeout);
        }
        if overrides.foreground {
            self.daemon = Some(false);
        }
        self
    }

    /// Check required values and derive the manifest set.
    pub fn validate(self) -> Result<Config> {
        let repo = non_blank(self.repo);
        let branch = non_blank(self.branch);
        let out_path = self.out_path.filter(|p| !p.as_os_str().is_empty());

        let mut missing = Vec::new();
        if repo.is_none() {
            missing.push("-r (repository)".to_string());
        }
        if self.compose_paths.is_none() {
            missing.push("-c (compose path)".to_string());
        }
        if branch.is_none() {
            missing.push("-b (branch)".to_string());
        }
        if out_path.is_none() {
            missing.push("-o (out path)".to_string());
        }

        let (Some(repo), Some(branch), Some(out_path), Some(compose_paths)) =
            (repo, branch, out_path, self.compose_paths)
        else {
            return Err(Error::MissingParameters(missing));
        };

        let manifests = ManifestSet::from_paths(compose_paths.iter())
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;

        Ok(Config {
            repository: RepositoryRef::new(repo, branch, out_path),
            manifests,
            force: self.force.unwrap_or(false),
            log_level: self.log_level.unwrap_or_default(),
            runtime: self.runtime,
            daemon: self.daemon.unwrap_or(true),
            timeout: self.timeout,
        })
    }
}

impl Config {
    /// Load the explicit config file (or discover one in `dir`), apply
    /// overrides, and validate.
    pub fn resolve(config_path: Option<&Path>, dir: &Path, overrides: Overrides) -> Result<Self> {
        let file = match config_path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::discover(dir)?.unwrap_or_default(),
        };

        file.apply(overrides).validate()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
