//! Manifest providers supply the runfile mapping the resolver queries.
//!
//! The resolver only depends on the [`ManifestProvider`] trait. Concrete providers read a
//! runfiles MANIFEST file or walk a staged runfiles directory, and [`Runfiles`] picks one of
//! them from configuration or the process environment.

mod directory;
mod discovery;
mod manifest;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use directory::DirectoryProvider;
pub use discovery::Runfiles;
pub use manifest::ManifestFileProvider;
pub(crate) use manifest::sibling_runfiles_dir;

use crate::models::RunfileEntry;

/// Read-only view over the runfiles known to the build runtime.
pub trait ManifestProvider {
  /// Resolve a logical path exactly, without any fuzzy matching.
  fn lookup_exact(&self, logical_path: &str) -> Result<PathBuf, ProviderError>;

  /// Enumerate every known `(logical, physical)` pair in a stable order.
  fn list_entries(&self) -> Result<Vec<RunfileEntry>, ProviderError>;

  /// Directory the runfiles are staged in.
  fn runfiles_root(&self) -> Result<PathBuf, ProviderError>;
}

impl<P: ManifestProvider + ?Sized> ManifestProvider for &P {
  fn lookup_exact(&self, logical_path: &str) -> Result<PathBuf, ProviderError> {
    (**self).lookup_exact(logical_path)
  }

  fn list_entries(&self) -> Result<Vec<RunfileEntry>, ProviderError> {
    (**self).list_entries()
  }

  fn runfiles_root(&self) -> Result<PathBuf, ProviderError> {
    (**self).runfiles_root()
  }
}

impl<P: ManifestProvider + ?Sized> ManifestProvider for Box<P> {
  fn lookup_exact(&self, logical_path: &str) -> Result<PathBuf, ProviderError> {
    (**self).lookup_exact(logical_path)
  }

  fn list_entries(&self) -> Result<Vec<RunfileEntry>, ProviderError> {
    (**self).list_entries()
  }

  fn runfiles_root(&self) -> Result<PathBuf, ProviderError> {
    (**self).runfiles_root()
  }
}

impl<P: ManifestProvider + ?Sized> ManifestProvider for Arc<P> {
  fn lookup_exact(&self, logical_path: &str) -> Result<PathBuf, ProviderError> {
    (**self).lookup_exact(logical_path)
  }

  fn list_entries(&self) -> Result<Vec<RunfileEntry>, ProviderError> {
    (**self).list_entries()
  }

  fn runfiles_root(&self) -> Result<PathBuf, ProviderError> {
    (**self).runfiles_root()
  }
}

/// Errors reported by manifest providers.
#[derive(Debug)]
pub enum ProviderError {
  /// The logical path is not part of the runfiles.
  NotFound {
    /// Logical path that was requested.
    path: String,
  },
  /// Reading the manifest or runfiles tree failed.
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// A manifest line could not be decoded.
  MalformedManifest {
    /// Manifest file containing the line.
    path: PathBuf,
    /// One-based line number.
    line: usize,
    /// Raw line content.
    content: String,
  },
  /// The provider cannot answer the request at all.
  Unavailable {
    /// Human readable explanation.
    reason: String,
  },
}

impl ProviderError {
  pub(crate) fn not_found(path: &str) -> Self {
    Self::NotFound {
      path: path.to_string(),
    }
  }

  pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
    Self::Io {
      path: path.to_path_buf(),
      source,
    }
  }

  pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
    Self::Unavailable {
      reason: reason.into(),
    }
  }

  /// Returns `true` when the error only means the path is unknown.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound { .. })
  }
}

impl std::fmt::Display for ProviderError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::NotFound { path } => write!(f, "runfile {path}: could not locate file"),
      Self::Io { path, source } => {
        write!(f, "failed to read {}: {}", path.display(), source)
      }
      Self::MalformedManifest {
        path,
        line,
        content,
      } => write!(
        f,
        "malformed manifest line {} in {}: {}",
        line,
        path.display(),
        content
      ),
      Self::Unavailable { reason } => write!(f, "runfiles unavailable: {reason}"),
    }
  }
}

impl std::error::Error for ProviderError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn not_found_message_names_the_path() {
    let err = ProviderError::not_found("main/missing.txt");
    assert_eq!(err.to_string(), "runfile main/missing.txt: could not locate file");
    assert!(err.is_not_found());
  }

  #[test]
  fn io_errors_expose_their_source() {
    use std::error::Error;

    let err = ProviderError::io(
      Path::new("/tmp/MANIFEST"),
      std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    assert!(err.source().is_some());
    assert!(err.to_string().starts_with("failed to read /tmp/MANIFEST"));
    assert!(!err.is_not_found());
  }

  #[test]
  fn smart_pointers_forward_to_the_inner_provider() {
    let provider = ManifestFileProvider::parse("MANIFEST", "a/b /x/a/b\n")
      .expect("manifest should parse");
    let shared: Arc<dyn ManifestProvider> = Arc::new(provider);
    assert_eq!(
      shared.lookup_exact("a/b").expect("entry should resolve"),
      PathBuf::from("/x/a/b")
    );
    let boxed: Box<dyn ManifestProvider + '_> = Box::new(&shared);
    assert_eq!(boxed.list_entries().expect("entries should list").len(), 1);
  }
}
