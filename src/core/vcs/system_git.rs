//! System git client - zero dependencies, one subprocess per call
//!
//! All version-control operations go through [`SystemGit::run`]:
//! - Safe subprocess execution (isolated environment)
//! - A hard kill-timeout so a hung `git push` cannot wedge a release
//! - Exit-status classification into typed errors that embed the full
//!   command line and captured output
//!
//! No retry is attempted here; a git failure is terminal and rollback
//! policy lives with the orchestrator.

use crate::core::error::{GitError, ReleaseError, ReleaseResult};
use crate::core::vcs::CommandResult;
use log::debug;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Hard ceiling on any single git invocation
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Git client using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  repo_path: PathBuf,

  /// Kill-timeout applied to every invocation
  timeout: Duration,

  /// Log captured output of every command (per-session, not ambient)
  trace: bool,
}

impl SystemGit {
  /// Create a client for a working directory
  pub fn new(repo_path: impl Into<PathBuf>) -> Self {
    Self {
      repo_path: repo_path.into(),
      timeout: COMMAND_TIMEOUT,
      trace: false,
    }
  }

  /// Enable full command-output tracing for this client
  pub fn with_trace(mut self, trace: bool) -> Self {
    self.trace = trace;
    self
  }

  /// Run one git command, blocking until exit or the kill-timeout
  pub fn run(&self, args: &[&str]) -> ReleaseResult<CommandResult> {
    let mut cmd = self.git_cmd();
    cmd.args(args);

    let mut rendered = String::from("git");
    for arg in args {
      rendered.push(' ');
      rendered.push_str(arg);
    }

    self.run_with_timeout(cmd, rendered)
  }

  /// HEAD commit SHA, trimmed
  pub fn head_commit(&self) -> ReleaseResult<String> {
    let result = self.run(&["rev-parse", "--verify", "HEAD"])?;
    let sha = result.stdout.trim().to_string();
    if sha.is_empty() {
      return Err(GitError::CommitUnreadable.into());
    }
    Ok(sha)
  }

  /// Current branch name, trimmed
  pub fn current_branch(&self) -> ReleaseResult<String> {
    let result = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
    let branch = result.stdout.trim().to_string();
    if branch.is_empty() {
      return Err(GitError::BranchUnreadable.into());
    }
    Ok(branch)
  }

  /// Raw porcelain status output; empty means a clean tree
  pub fn status_porcelain(&self) -> ReleaseResult<String> {
    Ok(self.run(&["status", "--porcelain"])?.stdout)
  }

  /// Commit exactly one path
  pub fn commit_path(&self, path: &str, message: &str) -> ReleaseResult<()> {
    self.run(&["commit", path, "-m", message])?;
    Ok(())
  }

  /// Create an annotated tag
  pub fn tag_annotated(&self, tag: &str, message: &str) -> ReleaseResult<()> {
    self.run(&["tag", "-a", "-m", message, tag])?;
    Ok(())
  }

  /// Push a ref to a remote
  pub fn push(&self, remote: &str, refname: &str) -> ReleaseResult<()> {
    self.run(&["push", remote, refname])?;
    Ok(())
  }

  /// Hard-reset the working tree to a commit
  pub fn reset_hard(&self, sha: &str) -> ReleaseResult<()> {
    self.run(&["reset", "--hard", sha])?;
    Ok(())
  }

  /// Delete a local tag
  pub fn delete_tag(&self, tag: &str) -> ReleaseResult<()> {
    self.run(&["tag", "-d", tag])?;
    Ok(())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust ambient git variables)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }

  fn run_with_timeout(&self, mut cmd: Command, rendered: String) -> ReleaseResult<CommandResult> {
    debug!("running `{}` in {}", rendered, self.repo_path.display());

    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = cmd.spawn().map_err(ReleaseError::Io)?;

    // Drain pipes off-thread so a chatty command can't deadlock on a full pipe
    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let deadline = Instant::now() + self.timeout;
    let status = loop {
      match child.try_wait().map_err(ReleaseError::Io)? {
        Some(status) => break status,
        None if Instant::now() >= deadline => {
          let _ = child.kill();
          let _ = child.wait();
          return Err(
            GitError::Timeout {
              command: rendered,
              seconds: self.timeout.as_secs(),
            }
            .into(),
          );
        }
        None => thread::sleep(POLL_INTERVAL),
      }
    };

    let stdout = stdout_reader.map(|h| h.join().unwrap_or_default()).unwrap_or_default();
    let stderr = stderr_reader.map(|h| h.join().unwrap_or_default()).unwrap_or_default();

    if self.trace {
      if !stdout.is_empty() {
        debug!("`{}` stdout:\n{}", rendered, stdout.trim_end());
      }
      if !stderr.is_empty() {
        debug!("`{}` stderr:\n{}", rendered, stderr.trim_end());
      }
    }

    if !status.success() {
      return Err(
        GitError::CommandFailed {
          command: rendered,
          code: status.code(),
          stdout,
          stderr,
        }
        .into(),
      );
    }

    Ok(CommandResult {
      stdout,
      stderr,
      code: status.code(),
    })
  }
}

fn drain(source: Option<impl Read + Send + 'static>) -> Option<thread::JoinHandle<String>> {
  source.map(|mut reader| {
    thread::spawn(move || {
      let mut buf = Vec::new();
      let _ = reader.read_to_end(&mut buf);
      String::from_utf8_lossy(&buf).into_owned()
    })
  })
}
