//! Provider that reads runfiles straight from a staged runfiles directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{trace, warn};

use super::{ManifestProvider, ProviderError};
use crate::models::RunfileEntry;

/// Runfiles staged as a directory tree, e.g. `bazel-bin/tool.runfiles`.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
  root: PathBuf,
  workspace: Option<String>,
}

impl DirectoryProvider {
  /// Create a provider rooted at `root`. The directory is not checked until queried.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      workspace: None,
    }
  }

  /// Also try `<root>/<workspace>/<path>` when a lookup misses.
  pub fn with_workspace(mut self, workspace: Option<String>) -> Self {
    self.workspace = workspace.filter(|value| !value.is_empty());
    self
  }

  /// Root of the runfiles tree.
  pub fn root(&self) -> &Path {
    &self.root
  }

  fn existing(&self, logical_path: &str) -> Option<PathBuf> {
    let candidate = self.root.join(logical_path);
    candidate.exists().then_some(candidate)
  }

  /// Depth-first walk in file name order. Symlinks are reported as entries and never
  /// followed, so the walk visits each directory once.
  fn walk(
    &self,
    dir: &Path,
    prefix: &str,
    out: &mut Vec<RunfileEntry>,
  ) -> Result<(), ProviderError> {
    let mut children = fs::read_dir(dir)
      .and_then(|entries| entries.collect::<Result<Vec<_>, _>>())
      .map_err(|err| ProviderError::io(dir, err))?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
      let path = child.path();
      let Some(name) = child.file_name().to_str().map(str::to_string) else {
        warn!(path = %path.display(), "skipping runfile with a non UTF-8 name");
        continue;
      };
      let logical = if prefix.is_empty() {
        name
      } else {
        format!("{prefix}/{name}")
      };

      let file_type = child
        .file_type()
        .map_err(|err| ProviderError::io(&path, err))?;
      if file_type.is_dir() {
        self.walk(&path, &logical, out)?;
      } else {
        out.push(RunfileEntry::new(logical, path));
      }
    }

    Ok(())
  }
}

impl ManifestProvider for DirectoryProvider {
  fn lookup_exact(&self, logical_path: &str) -> Result<PathBuf, ProviderError> {
    if !is_contained(logical_path) {
      trace!(requested = logical_path, "rejected path escaping runfiles root");
      return Err(ProviderError::not_found(logical_path));
    }

    if let Some(found) = self.existing(logical_path) {
      return Ok(found);
    }

    self
      .workspace
      .as_ref()
      .and_then(|workspace| self.existing(&format!("{workspace}/{logical_path}")))
      .ok_or_else(|| ProviderError::not_found(logical_path))
  }

  fn list_entries(&self) -> Result<Vec<RunfileEntry>, ProviderError> {
    let mut entries = Vec::new();
    self.walk(&self.root, "", &mut entries)?;
    Ok(entries)
  }

  fn runfiles_root(&self) -> Result<PathBuf, ProviderError> {
    Ok(self.root.clone())
  }
}

/// Relative paths that stay below the root.
fn is_contained(logical_path: &str) -> bool {
  if logical_path.is_empty() || logical_path.starts_with('/') {
    return false;
  }

  Path::new(logical_path)
    .components()
    .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn staged_tree() -> tempfile::TempDir {
    let temp = tempdir().expect("failed to create temp dir");
    let root = temp.path();
    fs::create_dir_all(root.join("main/pkg")).expect("failed to create dirs");
    fs::create_dir_all(root.join("other")).expect("failed to create dirs");
    fs::write(root.join("main/pkg/b.txt"), "b").expect("failed to write file");
    fs::write(root.join("main/pkg/a.txt"), "a").expect("failed to write file");
    fs::write(root.join("other/tool.sh"), "#!/bin/sh").expect("failed to write file");
    temp
  }

  #[test]
  fn lists_files_in_sorted_depth_first_order() {
    let temp = staged_tree();
    let provider = DirectoryProvider::new(temp.path());

    let entries = provider.list_entries().expect("tree should list");
    let logical: Vec<&str> = entries
      .iter()
      .map(|entry| entry.logical_path.as_str())
      .collect();

    assert_eq!(logical, vec![
      "main/pkg/a.txt",
      "main/pkg/b.txt",
      "other/tool.sh"
    ]);
    assert_eq!(entries[2].physical_path, temp.path().join("other/tool.sh"));
  }

  #[test]
  fn resolves_existing_paths_and_workspace_fallback() {
    let temp = staged_tree();
    let provider = DirectoryProvider::new(temp.path()).with_workspace(Some("main".into()));

    assert_eq!(
      provider.lookup_exact("main/pkg/a.txt").expect("path should resolve"),
      temp.path().join("main/pkg/a.txt")
    );
    assert_eq!(
      provider.lookup_exact("pkg/b.txt").expect("workspace path should resolve"),
      temp.path().join("main/pkg/b.txt")
    );
    assert!(
      provider
        .lookup_exact("pkg/c.txt")
        .expect_err("missing file should fail")
        .is_not_found()
    );
  }

  #[test]
  fn rejects_paths_outside_the_root() {
    let temp = staged_tree();
    let provider = DirectoryProvider::new(temp.path().join("main"));

    for requested in ["", "/etc/passwd", "../other/tool.sh", "pkg/../../other/tool.sh"] {
      assert!(
        provider
          .lookup_exact(requested)
          .expect_err("escaping path should fail")
          .is_not_found(),
        "{requested} should be rejected"
      );
    }
  }

  #[cfg(unix)]
  #[test]
  fn symlinked_directories_are_listed_but_not_descended() {
    use std::os::unix::fs::symlink;

    let temp = tempdir().expect("failed to create temp dir");
    let root = temp.path();
    fs::write(root.join("f.txt"), "f").expect("failed to write file");
    symlink(root, root.join("loop")).expect("failed to create symlink");
    symlink(root, root.join("again")).expect("failed to create symlink");

    let entries = DirectoryProvider::new(root)
      .list_entries()
      .expect("tree should list");
    let logical: Vec<&str> = entries
      .iter()
      .map(|entry| entry.logical_path.as_str())
      .collect();

    assert_eq!(logical, vec!["again", "f.txt", "loop"]);
  }

  #[cfg(target_os = "linux")]
  #[test]
  fn non_utf8_names_are_skipped() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = tempdir().expect("failed to create temp dir");
    fs::write(temp.path().join("ok.txt"), "ok").expect("failed to write file");
    fs::write(temp.path().join(OsStr::from_bytes(b"bad\xff.txt")), "x")
      .expect("failed to write file");

    let entries = DirectoryProvider::new(temp.path())
      .list_entries()
      .expect("tree should list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].logical_path, "ok.txt");
  }

  #[test]
  fn listing_a_missing_root_is_an_io_error() {
    let temp = tempdir().expect("failed to create temp dir");
    let provider = DirectoryProvider::new(temp.path().join("absent.runfiles"));

    assert!(matches!(
      provider.list_entries(),
      Err(ProviderError::Io { .. })
    ));
    assert_eq!(
      provider.runfiles_root().expect("root is always known"),
      temp.path().join("absent.runfiles")
    );
  }
}
