//! Configuration describing where runfiles live.
//!
//! Values come from an optional `runfiles.config.json`, the Bazel runfiles environment
//! variables and command line flags. Explicit values always win over discovered ones.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

/// File name searched for by [`RunfilesConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "runfiles.config.json";

/// Points at a manifest file.
pub const ENV_MANIFEST_FILE: &str = "RUNFILES_MANIFEST_FILE";
/// Points at a runfiles directory.
pub const ENV_RUNFILES_DIR: &str = "RUNFILES_DIR";
/// Runfiles directory exported to tests; used when `RUNFILES_DIR` is unset.
pub const ENV_TEST_SRCDIR: &str = "TEST_SRCDIR";
/// Workspace name exported to tests.
pub const ENV_TEST_WORKSPACE: &str = "TEST_WORKSPACE";

/// Locations used to build a runfiles provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunfilesConfig {
  /// Runfiles MANIFEST file; preferred over the directory when both are set.
  pub manifest_file: Option<PathBuf>,
  /// Root of the staged runfiles tree.
  pub runfiles_dir: Option<PathBuf>,
  /// Main workspace name, tried as a prefix when a lookup misses.
  pub workspace: Option<String>,
  /// Executable whose `.runfiles_manifest` / `.runfiles` siblings are probed last.
  pub executable: Option<PathBuf>,
}

/// Errors that can occur while loading a configuration file.
#[derive(Debug)]
pub enum ConfigError {
  /// Failed to read the configuration file.
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse the configuration JSON.
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

impl RunfilesConfig {
  /// Load `runfiles.config.json` from `dir`, falling back to defaults.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if !candidate.exists() {
      return Self::default();
    }

    Self::from_path(&candidate).unwrap_or_else(|err| {
      warn!(error = %err, "ignoring runfiles configuration");
      Self::default()
    })
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Configuration derived from the process environment and `argv[0]`.
  pub fn from_env() -> Self {
    let mut config = Self::from_env_with(|key| env::var(key).ok());
    config.executable = env::args_os().next().map(PathBuf::from);
    config
  }

  /// Configuration derived from an arbitrary variable lookup.
  pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let read = |key: &str| lookup(key).filter(|value| !value.is_empty());

    Self {
      manifest_file: read(ENV_MANIFEST_FILE).map(PathBuf::from),
      runfiles_dir: read(ENV_RUNFILES_DIR)
        .or_else(|| read(ENV_TEST_SRCDIR))
        .map(PathBuf::from),
      workspace: read(ENV_TEST_WORKSPACE),
      executable: None,
    }
  }

  /// Fill unset values from `fallback`.
  ///
  /// The runfiles location is taken as a unit: when `self` names a manifest file or a
  /// directory, neither is taken from `fallback`.
  pub fn merge(self, fallback: RunfilesConfig) -> Self {
    let (manifest_file, runfiles_dir) = if self.has_location() {
      (self.manifest_file, self.runfiles_dir)
    } else {
      (fallback.manifest_file, fallback.runfiles_dir)
    };

    Self {
      manifest_file,
      runfiles_dir,
      workspace: self.workspace.or(fallback.workspace),
      executable: self.executable.or(fallback.executable),
    }
  }

  /// Layer command line values over a configuration file over the environment.
  pub fn layered(flags: RunfilesConfig, file: RunfilesConfig, env: RunfilesConfig) -> Self {
    flags.merge(file).merge(env)
  }

  fn has_location(&self) -> bool {
    self.manifest_file.is_some() || self.runfiles_dir.is_some()
  }

  /// Resolve relative configured paths against `base`.
  pub fn relative_to(mut self, base: &Path) -> Self {
    self.manifest_file = self.manifest_file.map(|path| base.join(path));
    self.runfiles_dir = self.runfiles_dir.map(|path| base.join(path));
    self
  }
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Io { path, source } => {
        write!(f, "failed to read {}: {}", path.display(), source)
      }
      Self::Parse { path, source } => {
        write!(f, "failed to parse {}: {}", path.display(), source)
      }
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      Self::Parse { source, .. } => Some(source),
    }
  }
}
