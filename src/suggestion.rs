//! Closest-match lookup used when a runfile cannot be resolved exactly.
//!
//! Only the trailing part of the paths is compared: a request with a misspelt workspace or
//! package prefix still finds its file, a short unrelated name finds nothing.

use tracing::{debug, trace};

use crate::models::RunfileEntry;
use crate::provider::ManifestProvider;

/// Fraction of the requested path the shared suffix must exceed to be suggested.
pub const SUGGESTION_THRESHOLD: f64 = 0.40;

/// Longest string both `a` and `b` end with, borrowed from `a`.
///
/// Characters are compared from the end of both strings until they differ or either
/// string runs out, so the result always lies on a character boundary.
pub fn shared_suffix<'a>(a: &'a str, b: &str) -> &'a str {
  let shared: usize = a
    .chars()
    .rev()
    .zip(b.chars().rev())
    .take_while(|(left, right)| left == right)
    .map(|(left, _)| left.len_utf8())
    .sum();

  &a[a.len() - shared..]
}

/// Pick the entry whose logical path shares the longest suffix with `manifest_path`.
///
/// Entries are scanned in order and only a strictly longer suffix replaces the current
/// best, so the first entry wins ties. Scanning stops once `manifest_path` is a suffix of
/// a candidate in full. The winner is only returned when its shared suffix covers more than
/// [`SUGGESTION_THRESHOLD`] of `manifest_path`.
pub fn find_closest<'e>(
  manifest_path: &str,
  entries: &'e [RunfileEntry],
) -> Option<&'e RunfileEntry> {
  if manifest_path.is_empty() {
    return None;
  }

  let mut best: Option<&RunfileEntry> = None;
  let mut longest = 0;

  for entry in entries {
    let shared = shared_suffix(manifest_path, &entry.logical_path).len();
    if shared > longest {
      longest = shared;
      best = Some(entry);
      if shared == manifest_path.len() {
        break;
      }
    }
  }

  let ratio = longest as f64 / manifest_path.len() as f64;
  match best {
    Some(entry) if ratio > SUGGESTION_THRESHOLD => {
      debug!(
        requested = manifest_path,
        suggestion = %entry.logical_path,
        ratio,
        "found close runfile match"
      );
      Some(entry)
    }
    _ => {
      trace!(requested = manifest_path, ratio, "no runfile close enough to suggest");
      None
    }
  }
}

/// Enumerate `provider` and pick the closest entry.
///
/// Enumeration failures only mean there is nothing to suggest.
pub fn find_closest_in<P>(provider: &P, manifest_path: &str) -> Option<RunfileEntry>
where
  P: ManifestProvider + ?Sized,
{
  let entries = match provider.list_entries() {
    Ok(entries) => entries,
    Err(err) => {
      debug!(error = %err, "unable to enumerate runfiles for suggestions");
      return None;
    }
  };

  find_closest(manifest_path, &entries).cloned()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entries(paths: &[&str]) -> Vec<RunfileEntry> {
    paths
      .iter()
      .map(|path| RunfileEntry::new(*path, format!("/abs/{path}")))
      .collect()
  }

  #[test]
  fn shared_suffix_of_identical_strings_is_the_string() {
    for value in ["a", "main/pkg/file.txt", "ünïcödé/ß"] {
      assert_eq!(shared_suffix(value, value), value);
    }
  }

  #[test]
  fn shared_suffix_is_empty_without_common_trailing_character() {
    assert_eq!(shared_suffix("abc", "abd"), "");
    assert_eq!(shared_suffix("x", "y"), "");
    assert_eq!(shared_suffix("", "anything"), "");
  }

  #[test]
  fn shared_suffix_is_bounded_by_the_shorter_string() {
    assert_eq!(shared_suffix("txt", "main/file.txt"), "txt");
    assert_eq!(shared_suffix("main/file.txt", "txt"), "txt");
    assert_eq!(shared_suffix("foo/barr.txt", "foo/bar.txt"), "r.txt");

    let suffix = shared_suffix("pkg/alpha/data.json", "other/beta/data.json");
    assert_eq!(suffix, "/data.json");
    assert!("pkg/alpha/data.json".ends_with(suffix));
    assert!("other/beta/data.json".ends_with(suffix));
  }

  #[test]
  fn shared_suffix_never_splits_multibyte_characters() {
    // 'é' and 'ũ' share their final UTF-8 byte.
    assert_eq!(shared_suffix("é", "ũ"), "");
    assert_eq!(shared_suffix("café", "thé"), "é");
  }

  #[test]
  fn empty_request_never_gets_a_suggestion() {
    let known = entries(&["", "a", "main/file.txt"]);
    assert_eq!(find_closest("", &known), None);
  }

  #[test]
  fn suggests_entry_with_long_enough_suffix() {
    let known = entries(&["foo/bar.txt", "baz/qux.txt"]);
    let best = find_closest("foo/barr.txt", &known).expect("a suggestion should be found");
    assert_eq!(best.logical_path, "foo/bar.txt");
  }

  #[test]
  fn rejects_matches_at_or_below_the_threshold() {
    let known = entries(&["foo/bar.txt", "baz/qux.txt"]);
    assert_eq!(find_closest("zzz", &known), None);

    // 2 of 5 characters is exactly 40%, which is not enough.
    let known = entries(&["xyzab"]);
    assert_eq!(find_closest("123ab", &known), None);
    assert!(find_closest("12zab", &known).is_some());
  }

  #[test]
  fn first_entry_wins_ties() {
    let known = entries(&["x/data.txt", "y/data.txt"]);
    let best = find_closest("z/data.txt", &known).expect("a suggestion should be found");
    assert_eq!(best.logical_path, "x/data.txt");

    let reversed = entries(&["y/data.txt", "x/data.txt"]);
    let best = find_closest("z/data.txt", &reversed).expect("a suggestion should be found");
    assert_eq!(best.logical_path, "y/data.txt");
  }

  #[test]
  fn stops_at_first_full_length_match() {
    let known = entries(&["a/pkg/file.txt", "b/pkg/file.txt", "pkg/file.txt"]);
    let best = find_closest("pkg/file.txt", &known).expect("a suggestion should be found");
    assert_eq!(best.logical_path, "a/pkg/file.txt");
  }

  #[test]
  fn candidate_contained_in_request_does_not_stop_the_scan() {
    let known = entries(&["file.txt", "main/pkg/file.txt"]);
    let best = find_closest("other/pkg/file.txt", &known).expect("a suggestion should be found");
    assert_eq!(best.logical_path, "main/pkg/file.txt");
  }

  #[test]
  fn no_entries_means_no_suggestion() {
    assert_eq!(find_closest("main/file.txt", &[]), None);
  }
}
