//! Release command implementation
//!
//! Wires CLI flags into a [`ReleaseConfig`] with shell-command steps and
//! prints a human summary (or the outcome as JSON).

use crate::core::error::ReleaseResult;
use crate::release::{ReleaseConfig, ReleaseStep, ShellStep, perform};
use std::path::PathBuf;

#[allow(clippy::too_many_arguments)]
pub fn run_release(
  project: PathBuf,
  build: String,
  post_release: Option<String>,
  release_version: Option<String>,
  next_version: Option<String>,
  json: bool,
  debug: bool,
) -> ReleaseResult<()> {
  let mut config = ReleaseConfig::new(&project, Box::new(ShellStep::new(build).current_dir(&project)));
  config.post_release =
    post_release.map(|command| Box::new(ShellStep::new(command).current_dir(&project)) as Box<dyn ReleaseStep>);
  config.release_version = release_version;
  config.next_dev_version = next_version;
  config.debug = debug;

  if !json {
    println!("📦 Releasing {}", project.display());
  }

  let outcome = perform(config)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&outcome)?);
  } else {
    println!();
    println!("✅ Released {}", outcome.release_version);
    println!("   Dev version is now {}", outcome.dev_version);
    println!("   Completed in {} ms", outcome.release_time);
  }

  Ok(())
}
