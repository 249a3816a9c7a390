//! Provider backed by a runfiles MANIFEST file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::{ManifestProvider, ProviderError};
use crate::models::RunfileEntry;

/// Runfiles read from a `<logical> <physical>` manifest.
///
/// Entries keep the manifest's line order so enumeration, and therefore suggestion
/// tie-breaking, is stable between runs.
#[derive(Debug, Clone)]
pub struct ManifestFileProvider {
  source: PathBuf,
  entries: Vec<RunfileEntry>,
  index: HashMap<String, usize>,
  workspace: Option<String>,
}

impl ManifestFileProvider {
  /// Read and parse the manifest stored at `path`.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| ProviderError::io(path, err))?;
    Self::parse(path, &contents)
  }

  /// Parse manifest contents that were read from `source`.
  pub fn parse(source: impl AsRef<Path>, contents: &str) -> Result<Self, ProviderError> {
    let source = source.as_ref().to_path_buf();
    let mut entries = Vec::new();
    let mut index = HashMap::new();

    for (number, line) in contents.split('\n').enumerate() {
      if line.is_empty() {
        continue;
      }

      let entry = parse_line(line).ok_or_else(|| ProviderError::MalformedManifest {
        path: source.clone(),
        line: number + 1,
        content: line.to_string(),
      })?;

      index
        .entry(entry.logical_path.clone())
        .or_insert(entries.len());
      entries.push(entry);
    }

    debug!(
      manifest = %source.display(),
      entries = entries.len(),
      "loaded runfiles manifest"
    );

    Ok(Self {
      source,
      entries,
      index,
      workspace: None,
    })
  }

  /// Also try `<workspace>/<path>` when a lookup misses.
  pub fn with_workspace(mut self, workspace: Option<String>) -> Self {
    self.workspace = workspace.filter(|value| !value.is_empty());
    self
  }

  /// Path of the manifest file.
  pub fn source(&self) -> &Path {
    &self.source
  }

  /// Entries in manifest order.
  pub fn entries(&self) -> &[RunfileEntry] {
    &self.entries
  }

  fn get(&self, logical_path: &str) -> Option<&RunfileEntry> {
    self
      .index
      .get(logical_path)
      .and_then(|position| self.entries.get(*position))
  }
}

impl ManifestProvider for ManifestFileProvider {
  fn lookup_exact(&self, logical_path: &str) -> Result<PathBuf, ProviderError> {
    if let Some(entry) = self.get(logical_path) {
      return Ok(entry.physical_path.clone());
    }

    if let Some(workspace) = &self.workspace {
      let scoped = format!("{workspace}/{logical_path}");
      if let Some(entry) = self.get(&scoped) {
        trace!(requested = logical_path, scoped = %scoped, "resolved via workspace prefix");
        return Ok(entry.physical_path.clone());
      }
    }

    Err(ProviderError::not_found(logical_path))
  }

  fn list_entries(&self) -> Result<Vec<RunfileEntry>, ProviderError> {
    Ok(self.entries.clone())
  }

  fn runfiles_root(&self) -> Result<PathBuf, ProviderError> {
    sibling_runfiles_dir(&self.source).ok_or_else(|| {
      ProviderError::unavailable(format!(
        "no runfiles directory next to manifest {}",
        self.source.display()
      ))
    })
  }
}

/// Locate the runfiles directory belonging to a manifest file.
///
/// Handles both `<bin>.runfiles_manifest` and `<bin>.runfiles/MANIFEST` layouts.
pub(crate) fn sibling_runfiles_dir(manifest: &Path) -> Option<PathBuf> {
  let file_name = manifest.file_name()?.to_str()?;

  let candidate = if let Some(stem) = file_name.strip_suffix(".runfiles_manifest") {
    manifest.with_file_name(format!("{stem}.runfiles"))
  } else if file_name == "MANIFEST" {
    let parent = manifest.parent()?;
    if !parent.file_name()?.to_str()?.ends_with(".runfiles") {
      return None;
    }
    parent.to_path_buf()
  } else {
    return None;
  };

  candidate.is_dir().then_some(candidate)
}

fn parse_line(line: &str) -> Option<RunfileEntry> {
  let (escaped, body) = match line.strip_prefix(' ') {
    Some(rest) => (true, rest),
    None => (false, line),
  };

  let (logical, physical) = body.split_once(' ').unwrap_or((body, ""));
  if logical.is_empty() {
    return None;
  }

  if !escaped {
    return Some(RunfileEntry::new(logical, physical));
  }

  let logical = unescape(logical, true)?;
  let physical = unescape(physical, false)?;
  Some(RunfileEntry::new(logical, physical))
}

/// Decode `\s`, `\n` and `\b` escapes. `\s` is only valid in logical paths.
fn unescape(raw: &str, allow_space: bool) -> Option<String> {
  let mut decoded = String::with_capacity(raw.len());
  let mut chars = raw.chars();

  while let Some(ch) = chars.next() {
    if ch != '\\' {
      decoded.push(ch);
      continue;
    }

    match chars.next()? {
      's' if allow_space => decoded.push(' '),
      'n' => decoded.push('\n'),
      'b' => decoded.push('\\'),
      _ => return None,
    }
  }

  Some(decoded)
}
