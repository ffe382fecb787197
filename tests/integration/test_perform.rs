//! Integration tests for the release transaction and its rollback

use crate::helpers::TestProject;
use anyhow::Result;
use shipit::core::error::{GitError, ReleaseError, StepError};
use shipit::release::{ReleaseConfig, ReleaseStep, StepContext, perform};
use std::sync::{Arc, Mutex};

fn ok_step() -> Box<dyn ReleaseStep> {
  Box::new(|_: &StepContext| -> anyhow::Result<()> { Ok(()) })
}

#[test]
fn release_bumps_tags_and_pushes() -> Result<()> {
  let proj = TestProject::new("1.2.3-SNAPSHOT")?;

  let outcome = perform(ReleaseConfig::new(&proj.path, ok_step()))?;

  assert_eq!(outcome.release_version, "1.2.4");
  assert_eq!(outcome.dev_version, "1.2.5-SNAPSHOT");
  assert_eq!(proj.manifest_version()?, "1.2.5-SNAPSHOT");

  assert_eq!(proj.local_tags()?, vec!["1.2.4".to_string()]);
  assert!(proj.remote_tags()?.contains(&"1.2.4".to_string()));
  assert_eq!(proj.remote_main_sha()?, proj.head_sha()?);

  // Exactly two commits on top of the initial one, in order
  let messages = proj.log_messages(10)?;
  assert_eq!(
    messages,
    vec![
      "[release] - updating dev version to 1.2.5-SNAPSHOT".to_string(),
      "[release] - releasing 1.2.4".to_string(),
      "Initial project setup".to_string(),
    ]
  );

  Ok(())
}

#[test]
fn build_step_receives_the_release_version() -> Result<()> {
  let proj = TestProject::new("0.1.0-SNAPSHOT")?;
  let seen = Arc::new(Mutex::new(None));
  let seen_by_build = Arc::clone(&seen);

  let config = ReleaseConfig::new(
    &proj.path,
    Box::new(move |ctx: &StepContext| -> anyhow::Result<()> {
      *seen_by_build.lock().unwrap() = Some(ctx.release_version.clone());
      Ok(())
    }),
  );
  perform(config)?;

  assert_eq!(seen.lock().unwrap().as_deref(), Some("0.1.1"));
  Ok(())
}

#[test]
fn build_runs_against_the_release_manifest() -> Result<()> {
  // The release bump is written before the build step runs
  let proj = TestProject::new("1.2.3-SNAPSHOT")?;
  let manifest = proj.path.join("package.json");
  let seen = Arc::new(Mutex::new(String::new()));
  let seen_by_build = Arc::clone(&seen);

  let config = ReleaseConfig::new(
    &proj.path,
    Box::new(move |_: &StepContext| -> anyhow::Result<()> {
      let raw = std::fs::read_to_string(&manifest)?;
      let doc: serde_json::Value = serde_json::from_str(&raw)?;
      *seen_by_build.lock().unwrap() = doc["version"].as_str().unwrap_or_default().to_string();
      Ok(())
    }),
  );
  perform(config)?;

  assert_eq!(*seen.lock().unwrap(), "1.2.4");
  Ok(())
}

#[test]
fn build_failure_rolls_back() -> Result<()> {
  let proj = TestProject::new("1.2.3-SNAPSHOT")?;
  let before = proj.head_sha()?;

  let config = ReleaseConfig::new(
    &proj.path,
    Box::new(|_: &StepContext| -> anyhow::Result<()> { anyhow::bail!("tests failed") }),
  );
  let err = perform(config).unwrap_err();

  assert!(matches!(err, ReleaseError::Step(StepError::Build { .. })));
  assert!(err.to_string().contains("tests failed"));

  // Tree reset, no tag anywhere, nothing pushed
  assert_eq!(proj.manifest_version()?, "1.2.3-SNAPSHOT");
  assert_eq!(proj.head_sha()?, before);
  assert!(proj.local_tags()?.is_empty());
  assert!(proj.remote_tags()?.is_empty());
  assert_eq!(proj.remote_main_sha()?, before);

  Ok(())
}

#[test]
fn post_release_failure_deletes_the_tag() -> Result<()> {
  let proj = TestProject::new("1.2.3-SNAPSHOT")?;
  let before = proj.head_sha()?;

  let mut config = ReleaseConfig::new(&proj.path, ok_step());
  config.post_release = Some(Box::new(|_: &StepContext| -> anyhow::Result<()> {
    anyhow::bail!("publish rejected")
  }));
  let err = perform(config).unwrap_err();

  assert!(matches!(err, ReleaseError::Step(StepError::PostRelease { .. })));

  // The tag existed when the step ran; rollback removed it again
  assert!(proj.local_tags()?.is_empty());
  assert_eq!(proj.manifest_version()?, "1.2.3-SNAPSHOT");
  assert_eq!(proj.head_sha()?, before);

  Ok(())
}

#[test]
fn post_release_runs_after_tagging() -> Result<()> {
  let proj = TestProject::new("2.0.0-SNAPSHOT")?;
  let path = proj.path.clone();
  let saw_tag = Arc::new(Mutex::new(false));
  let saw = Arc::clone(&saw_tag);

  let mut config = ReleaseConfig::new(&proj.path, ok_step());
  config.post_release = Some(Box::new(move |_: &StepContext| -> anyhow::Result<()> {
    let output = std::process::Command::new("git")
      .arg("-C")
      .arg(&path)
      .args(["tag", "--list"])
      .output()?;
    *saw.lock().unwrap() = String::from_utf8_lossy(&output.stdout).contains("2.0.1");
    Ok(())
  }));
  perform(config)?;

  assert!(*saw_tag.lock().unwrap());
  Ok(())
}

#[test]
fn explicit_overrides_win() -> Result<()> {
  let proj = TestProject::new("1.2.3-SNAPSHOT")?;

  let mut config = ReleaseConfig::new(&proj.path, ok_step());
  config.release_version = Some("2.0.0".to_string());
  config.next_dev_version = Some("3.1.4-SNAPSHOT".to_string());
  let outcome = perform(config)?;

  assert_eq!(outcome.release_version, "2.0.0");
  assert_eq!(outcome.dev_version, "3.1.4-SNAPSHOT");
  assert_eq!(proj.manifest_version()?, "3.1.4-SNAPSHOT");
  assert_eq!(proj.local_tags()?, vec!["2.0.0".to_string()]);

  Ok(())
}

#[test]
fn manifest_bystander_fields_survive_a_release() -> Result<()> {
  let proj = TestProject::new("1.2.3-SNAPSHOT")?;

  perform(ReleaseConfig::new(&proj.path, ok_step()))?;

  let raw = std::fs::read_to_string(proj.path.join("package.json"))?;
  assert!(raw.contains("\"name\": \"demo\""));
  assert!(raw.contains("\"private\": true"));
  // Key order preserved: name before version before scripts
  let name_at = raw.find("\"name\"").unwrap();
  let version_at = raw.find("\"version\"").unwrap();
  let scripts_at = raw.find("\"scripts\"").unwrap();
  assert!(name_at < version_at && version_at < scripts_at);

  Ok(())
}

#[test]
fn failed_rollback_chains_both_errors() -> Result<()> {
  let proj = TestProject::new("1.2.3-SNAPSHOT")?;
  let path = proj.path.clone();

  let mut config = ReleaseConfig::new(&proj.path, ok_step());
  // The step deletes the release tag itself and then fails, so the
  // rollback's own tag-delete fails too and must chain, not mask.
  config.post_release = Some(Box::new(move |_: &StepContext| -> anyhow::Result<()> {
    let status = std::process::Command::new("git")
      .arg("-C")
      .arg(&path)
      .args(["tag", "-d", "1.2.4"])
      .status()?;
    anyhow::ensure!(status.success(), "could not delete tag");
    anyhow::bail!("publish rejected")
  }));
  let err = perform(config).unwrap_err();

  let ReleaseError::RollbackFailed { original, rollback } = err else {
    panic!("expected RollbackFailed, got: {}", err);
  };
  assert!(matches!(*original, ReleaseError::Step(StepError::PostRelease { .. })));
  assert!(matches!(*rollback, ReleaseError::Git(GitError::CommandFailed { .. })));

  // The reset half of the rollback still ran
  assert_eq!(proj.manifest_version()?, "1.2.3-SNAPSHOT");

  Ok(())
}
