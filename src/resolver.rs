//! Resolve logical runfile paths and explain failures.

use std::path::PathBuf;

use tracing::debug;

use crate::models::RunfileEntry;
use crate::provider::{ManifestProvider, ProviderError};
use crate::suggestion::find_closest_in;

/// Resolves logical paths against a manifest provider.
#[derive(Debug, Clone)]
pub struct Resolver<P> {
  provider: P,
}

impl<P: ManifestProvider> Resolver<P> {
  /// Create a resolver querying `provider`.
  pub fn new(provider: P) -> Self {
    Self { provider }
  }

  /// Borrow the underlying provider.
  pub fn provider(&self) -> &P {
    &self.provider
  }

  /// Resolve `manifest_path` to a physical path. See [`resolve`].
  pub fn resolve(&self, manifest_path: &str) -> Result<PathBuf, ResolveError> {
    resolve(&self.provider, manifest_path)
  }
}

/// Resolve `manifest_path` through `provider`.
///
/// On a miss the error suggests the closest known logical path, or names the runfiles
/// directory that was searched. When neither is available the provider's lookup error is
/// returned unchanged.
pub fn resolve<P>(provider: &P, manifest_path: &str) -> Result<PathBuf, ResolveError>
where
  P: ManifestProvider + ?Sized,
{
  let lookup_err = match provider.lookup_exact(manifest_path) {
    Ok(found) => return Ok(found),
    Err(err) => err,
  };
  debug!(requested = manifest_path, error = %lookup_err, "exact runfile lookup failed");

  if let Some(suggestion) = find_closest_in(provider, manifest_path) {
    return Err(ResolveError::Suggestion {
      requested: manifest_path.to_string(),
      suggestion,
    });
  }

  match provider.runfiles_root() {
    Ok(directory) => Err(ResolveError::NotInDirectory {
      requested: manifest_path.to_string(),
      directory,
    }),
    Err(root_err) => {
      debug!(error = %root_err, "runfiles root unavailable");
      Err(ResolveError::Lookup(lookup_err))
    }
  }
}

/// Why a runfile could not be resolved.
#[derive(Debug)]
pub enum ResolveError {
  /// Not found, but a known runfile looks like what was meant.
  Suggestion {
    /// Logical path that was requested.
    requested: String,
    /// Closest known entry.
    suggestion: RunfileEntry,
  },
  /// Not found in the runfiles directory and nothing similar is known.
  NotInDirectory {
    /// Logical path that was requested.
    requested: String,
    /// Runfiles directory that was searched.
    directory: PathBuf,
  },
  /// The provider's lookup error, when no better explanation is available.
  Lookup(ProviderError),
}

impl ResolveError {
  /// Suggested entry, if any.
  pub fn suggestion(&self) -> Option<&RunfileEntry> {
    match self {
      Self::Suggestion { suggestion, .. } => Some(suggestion),
      _ => None,
    }
  }
}

impl std::fmt::Display for ResolveError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Suggestion {
        requested,
        suggestion,
      } => write!(
        f,
        "manifest file {} not found, did you mean {}?",
        requested,
        suggestion.short_path()
      ),
      Self::NotInDirectory {
        requested,
        directory,
      } => write!(
        f,
        "manifest file {requested:?} not found in runfile directory {directory:?}"
      ),
      Self::Lookup(err) => write!(f, "{err}"),
    }
  }
}

impl std::error::Error for ResolveError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Lookup(err) => Some(err),
      _ => None,
    }
  }
}
