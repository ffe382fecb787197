//! Release configuration and caller-supplied steps

use anyhow::Context;
use std::path::PathBuf;
use std::process::Command;

/// Context handed to caller-supplied steps
#[derive(Debug, Clone)]
pub struct StepContext {
  /// The version being released
  pub release_version: String,
}

/// A caller-supplied operation: invoked once, awaited once, producing a
/// tagged outcome. Failures are opaque to the orchestrator and trigger
/// rollback.
pub trait ReleaseStep {
  fn run(&mut self, ctx: &StepContext) -> anyhow::Result<()>;
}

impl<F> ReleaseStep for F
where
  F: FnMut(&StepContext) -> anyhow::Result<()>,
{
  fn run(&mut self, ctx: &StepContext) -> anyhow::Result<()> {
    self(ctx)
  }
}

/// A step that runs a shell command with `RELEASE_VERSION` exported
pub struct ShellStep {
  command: String,
  cwd: Option<PathBuf>,
}

impl ShellStep {
  pub fn new(command: impl Into<String>) -> Self {
    Self {
      command: command.into(),
      cwd: None,
    }
  }

  /// Run the command in a specific directory instead of the caller's
  pub fn current_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
    self.cwd = Some(cwd.into());
    self
  }
}

impl ReleaseStep for ShellStep {
  fn run(&mut self, ctx: &StepContext) -> anyhow::Result<()> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&self.command);
    cmd.env("RELEASE_VERSION", &ctx.release_version);
    if let Some(cwd) = &self.cwd {
      cmd.current_dir(cwd);
    }

    let status = cmd
      .status()
      .with_context(|| format!("failed to spawn `{}`", self.command))?;
    anyhow::ensure!(status.success(), "`{}` exited with {}", self.command, status);
    Ok(())
  }
}

/// Configuration for one release, immutable for the duration of the attempt.
///
/// `project_path` and `build` are mandatory; their absence is a
/// configuration error raised before any side effect occurs. The debug
/// flag is threaded through the session explicitly rather than living in
/// process-global state.
#[derive(Default)]
pub struct ReleaseConfig {
  /// Project directory containing the manifest (required)
  pub project_path: Option<PathBuf>,

  /// Build step, run after the release bump is written (required)
  pub build: Option<Box<dyn ReleaseStep>>,

  /// Optional step run after tagging, before the next-dev bump
  pub post_release: Option<Box<dyn ReleaseStep>>,

  /// Explicit release version; wins over the derived next patch
  pub release_version: Option<String>,

  /// Explicit next development version; wins over the derived one
  pub next_dev_version: Option<String>,

  /// Trace every git invocation's captured output
  pub debug: bool,
}

impl ReleaseConfig {
  /// Convenience constructor for the two mandatory fields
  pub fn new(project_path: impl Into<PathBuf>, build: Box<dyn ReleaseStep>) -> Self {
    Self {
      project_path: Some(project_path.into()),
      build: Some(build),
      ..Self::default()
    }
  }
}
