//! Data structures shared between manifest providers and the resolver.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single runfile known to a manifest provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunfileEntry {
  /// Manifest-style path, e.g. `workspace/pkg/file.txt`.
  pub logical_path: String,
  /// Location of the file on disk. Empty for manifest markers without a backing file.
  pub physical_path: PathBuf,
}

impl RunfileEntry {
  /// Create an entry from its logical and physical paths.
  pub fn new(logical_path: impl Into<String>, physical_path: impl Into<PathBuf>) -> Self {
    Self {
      logical_path: logical_path.into(),
      physical_path: physical_path.into(),
    }
  }

  /// Leading segment of the logical path, which names the owning workspace.
  pub fn workspace(&self) -> Option<&str> {
    self
      .logical_path
      .split_once('/')
      .map(|(workspace, _)| workspace)
      .filter(|workspace| !workspace.is_empty())
  }

  /// Logical path with the workspace segment removed.
  pub fn short_path(&self) -> &str {
    match self.logical_path.split_once('/') {
      Some((_, rest)) => rest,
      None => &self.logical_path,
    }
  }

  /// Borrow the physical path.
  pub fn physical(&self) -> &Path {
    &self.physical_path
  }
}
