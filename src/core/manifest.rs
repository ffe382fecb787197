//! Manifest version store: read and write the `version` field of package.json
//!
//! Writes are full-file rewrites that touch only the version field. Key
//! order, unrecognized fields and 2-space indentation survive the round
//! trip (serde_json with `preserve_order`). A write is not transactional
//! with the git operations that follow it; a crash between write and
//! commit leaves an uncommitted change that the next release attempt's
//! clean-tree check refuses to proceed past.

use crate::core::error::{ManifestError, ReleaseResult};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name, fixed relative to the project root
pub const MANIFEST_FILE: &str = "package.json";

/// Path of the manifest inside a project
pub fn manifest_path(project: &Path) -> PathBuf {
  project.join(MANIFEST_FILE)
}

/// Read the manifest's version field
pub fn read_version(project: &Path) -> ReleaseResult<String> {
  let path = manifest_path(project);
  let doc = read_document(&path)?;

  match doc.get("version").and_then(Value::as_str) {
    Some(version) => Ok(version.to_string()),
    None => Err(
      ManifestError::Parse {
        path,
        reason: "missing or non-string `version` field".to_string(),
      }
      .into(),
    ),
  }
}

/// Overwrite the manifest's version field, preserving everything else
pub fn write_version(project: &Path, version: &str) -> ReleaseResult<()> {
  let path = manifest_path(project);
  let mut doc = read_document(&path)?;

  let Some(object) = doc.as_object_mut() else {
    return Err(
      ManifestError::Parse {
        path,
        reason: "top-level value is not an object".to_string(),
      }
      .into(),
    );
  };
  object.insert("version".to_string(), Value::String(version.to_string()));

  let mut rendered = serde_json::to_string_pretty(&doc).map_err(|e| ManifestError::Parse {
    path: path.clone(),
    reason: e.to_string(),
  })?;
  rendered.push('\n');

  fs::write(&path, rendered).map_err(|source| ManifestError::Write { path, source })?;
  Ok(())
}

fn read_document(path: &Path) -> ReleaseResult<Value> {
  if !path.exists() {
    return Err(
      ManifestError::Missing {
        path: path.to_path_buf(),
      }
      .into(),
    );
  }

  let raw = fs::read_to_string(path)?;
  serde_json::from_str(&raw).map_err(|e| {
    ManifestError::Parse {
      path: path.to_path_buf(),
      reason: e.to_string(),
    }
    .into()
  })
}
