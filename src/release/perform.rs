//! The release transaction: preflight, mutate, push, roll back on failure
//!
//! Ordered sequence, each step gated on the previous:
//!
//! 1. Validate config (project path, build step, manifest present)
//! 2. Read the manifest version; require a development version
//! 3. Require a clean working tree
//! 4. Record the rollback point (HEAD commit)
//! 5. Record the development branch
//! 6. Write the release version to the manifest
//! 7. Run the caller's build step
//! 8. Commit the manifest
//! 9. Create the annotated release tag (tag name is the plain version string)
//! 10. Run the optional post-release step
//! 11. Write the next development version to the manifest
//! 12. Commit the manifest
//! 13. Push the tag to origin
//! 14. Push the branch to origin
//!
//! Failure anywhere after step 5 hard-resets the tree to the rollback
//! point and deletes the tag if one was created. The triggering error is
//! re-raised; a rollback failure chains with it instead of masking it.

use crate::core::error::{ConfigError, GitError, ReleaseError, ReleaseResult, StepError, VersionError};
use crate::core::vcs::SystemGit;
use crate::core::{manifest, version};
use crate::release::config::{ReleaseConfig, ReleaseStep, StepContext};
use log::{debug, info, warn};
use semver::Version;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Successful release summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseOutcome {
  /// The version that was tagged and pushed
  pub release_version: String,
  /// The development version the manifest was left at
  pub dev_version: String,
  /// Elapsed milliseconds for the whole transaction
  pub release_time: u64,
}

/// State of one release attempt. Stack-local to a single [`perform`]
/// call, populated incrementally as steps complete, discarded when the
/// attempt resolves.
struct ReleaseSession {
  started: Instant,
  dev_version: Version,
  dev_branch: String,
  pre_release_commit: String,
  release_version: Option<Version>,
  release_tag: Option<String>,
  next_dev_version: Option<Version>,
}

/// Run one release transaction.
///
/// Configuration errors are raised synchronously before any side effect.
/// Preflight failures (bad version, dirty tree) happen before any
/// mutation, so those attempts are no-ops on the repository. Once the
/// manifest is written, any failure triggers rollback. Concurrent calls
/// against the same project are caller-level misuse; no locking is done.
pub fn perform(config: ReleaseConfig) -> ReleaseResult<ReleaseOutcome> {
  let started = Instant::now();

  let ReleaseConfig {
    project_path,
    build,
    post_release,
    release_version: explicit_release,
    next_dev_version: explicit_next_dev,
    debug: trace,
  } = config;

  // Configuration errors are synchronous: nothing has started, so there
  // is nothing to roll back.
  let project = project_path.ok_or(ConfigError::MissingProjectPath)?;
  let mut build = build.ok_or(ConfigError::MissingBuildStep)?;
  if !project.is_dir() {
    return Err(ConfigError::ProjectNotFound { path: project }.into());
  }
  let manifest_file = manifest::manifest_path(&project);
  if !manifest_file.exists() {
    return Err(ConfigError::ManifestMissing { path: manifest_file }.into());
  }

  let git = SystemGit::new(&project).with_trace(trace);

  // Preflight: reject before any mutation, so rollback is never needed
  // for this class of failure.
  let raw = manifest::read_version(&project)?;
  let dev_version = version::parse(&raw)?;
  if !version::is_development(&dev_version) {
    return Err(VersionError::NotDevelopment { version: raw }.into());
  }

  let status = git.status_porcelain()?;
  if !status.trim().is_empty() {
    return Err(GitError::DirtyWorkingTree { status }.into());
  }

  let mut session = ReleaseSession {
    started,
    dev_version,
    pre_release_commit: git.head_commit()?,
    dev_branch: git.current_branch()?,
    release_version: None,
    release_tag: None,
    next_dev_version: None,
  };
  debug!(
    "release starting from {} on branch {}",
    session.pre_release_commit, session.dev_branch
  );

  let result = run_transaction(
    &git,
    &project,
    &mut session,
    build.as_mut(),
    post_release,
    explicit_release,
    explicit_next_dev,
  );

  match result {
    Ok(outcome) => Ok(outcome),
    Err(original) => match roll_back(&git, &session) {
      Ok(()) => Err(original),
      Err(rollback) => Err(ReleaseError::RollbackFailed {
        original: Box::new(original),
        rollback: Box::new(rollback),
      }),
    },
  }
}

#[allow(clippy::too_many_arguments)]
fn run_transaction(
  git: &SystemGit,
  project: &Path,
  session: &mut ReleaseSession,
  build: &mut dyn ReleaseStep,
  post_release: Option<Box<dyn ReleaseStep>>,
  explicit_release: Option<String>,
  explicit_next_dev: Option<String>,
) -> ReleaseResult<ReleaseOutcome> {
  // Explicit configuration always wins over derived versions
  let release_version = match &explicit_release {
    Some(raw) => version::parse(raw)?,
    None => version::release_from(&session.dev_version),
  };
  manifest::write_version(project, &release_version.to_string())?;
  session.release_version = Some(release_version.clone());
  info!("building {}", release_version);

  let ctx = StepContext {
    release_version: release_version.to_string(),
  };
  build.run(&ctx).map_err(|source| StepError::Build { source })?;

  git.commit_path(
    manifest::MANIFEST_FILE,
    &format!("[release] - releasing {}", release_version),
  )?;

  // Recorded the moment it exists, so any later failure deletes it
  let tag = release_version.to_string();
  git.tag_annotated(&tag, &format!("[release] - {} release", release_version))?;
  session.release_tag = Some(tag.clone());
  info!("tagged {}", tag);

  if let Some(mut step) = post_release {
    step.run(&ctx).map_err(|source| StepError::PostRelease { source })?;
  }

  let next_dev = match &explicit_next_dev {
    Some(raw) => version::parse(raw)?,
    None => version::next_development(&release_version),
  };
  manifest::write_version(project, &next_dev.to_string())?;
  session.next_dev_version = Some(next_dev.clone());

  git.commit_path(
    manifest::MANIFEST_FILE,
    &format!("[release] - updating dev version to {}", next_dev),
  )?;

  git.push("origin", &tag)?;
  git.push("origin", &session.dev_branch)?;
  info!("pushed {} and {} to origin", tag, session.dev_branch);

  Ok(ReleaseOutcome {
    release_version: release_version.to_string(),
    dev_version: next_dev.to_string(),
    release_time: session.started.elapsed().as_millis() as u64,
  })
}

/// Best-effort compensation: reset to the rollback point, then delete the
/// release tag if one was created, in that order.
fn roll_back(git: &SystemGit, session: &ReleaseSession) -> ReleaseResult<()> {
  match &session.release_version {
    Some(version) => warn!(
      "release of {} failed, rolling back to {}",
      version, session.pre_release_commit
    ),
    None => warn!("release failed, rolling back to {}", session.pre_release_commit),
  }
  if let Some(next) = &session.next_dev_version {
    debug!("discarding next development version {}", next);
  }

  git.reset_hard(&session.pre_release_commit)?;
  if let Some(tag) = &session.release_tag {
    git.delete_tag(tag)?;
  }
  Ok(())
}
