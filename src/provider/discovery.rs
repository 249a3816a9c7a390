//! Choose a runfiles provider from configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{DirectoryProvider, ManifestFileProvider, ManifestProvider, ProviderError};
use crate::config::RunfilesConfig;
use crate::models::RunfileEntry;

/// The runfiles of the current process, backed by a manifest or a directory.
#[derive(Debug, Clone)]
pub enum Runfiles {
  /// Runfiles listed in a MANIFEST file.
  Manifest(ManifestFileProvider),
  /// Runfiles staged in a directory tree.
  Directory(DirectoryProvider),
}

impl Runfiles {
  /// Discover runfiles from the process environment.
  pub fn from_env() -> Result<Self, ProviderError> {
    Self::discover(&RunfilesConfig::from_env())
  }

  /// Build a provider from explicit configuration.
  ///
  /// An explicit manifest file wins over an explicit directory. Without either, the
  /// executable's `<exe>.runfiles_manifest` and `<exe>.runfiles` siblings are probed.
  pub fn discover(config: &RunfilesConfig) -> Result<Self, ProviderError> {
    let workspace = config.workspace.clone();

    if let Some(manifest) = &config.manifest_file {
      debug!(manifest = %manifest.display(), "using runfiles manifest");
      let provider = ManifestFileProvider::from_path(manifest)?.with_workspace(workspace);
      return Ok(Self::Manifest(provider));
    }

    if let Some(dir) = &config.runfiles_dir {
      debug!(dir = %dir.display(), "using runfiles directory");
      return Ok(Self::Directory(
        DirectoryProvider::new(dir).with_workspace(workspace),
      ));
    }

    if let Some(executable) = &config.executable {
      let manifest = with_suffix(executable, ".runfiles_manifest");
      if manifest.is_file() {
        debug!(manifest = %manifest.display(), "using runfiles manifest next to executable");
        let provider = ManifestFileProvider::from_path(&manifest)?.with_workspace(workspace);
        return Ok(Self::Manifest(provider));
      }

      let dir = with_suffix(executable, ".runfiles");
      if dir.is_dir() {
        debug!(dir = %dir.display(), "using runfiles directory next to executable");
        return Ok(Self::Directory(
          DirectoryProvider::new(dir).with_workspace(workspace),
        ));
      }
    }

    Err(ProviderError::unavailable(
      "could not locate a runfiles manifest or directory",
    ))
  }

  fn provider(&self) -> &dyn ManifestProvider {
    match self {
      Self::Manifest(provider) => provider,
      Self::Directory(provider) => provider,
    }
  }
}

impl ManifestProvider for Runfiles {
  fn lookup_exact(&self, logical_path: &str) -> Result<PathBuf, ProviderError> {
    self.provider().lookup_exact(logical_path)
  }

  fn list_entries(&self) -> Result<Vec<RunfileEntry>, ProviderError> {
    self.provider().list_entries()
  }

  fn runfiles_root(&self) -> Result<PathBuf, ProviderError> {
    self.provider().runfiles_root()
  }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
  let mut raw = OsString::from(path.as_os_str());
  raw.push(suffix);
  PathBuf::from(raw)
}
