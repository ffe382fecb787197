//! Error types for shipit with contextual messages and exit codes
//!
//! One unified error type categorizes everything that can go wrong during a
//! release and carries enough context (command line, exit code, captured
//! output, version strings) to diagnose a failure without re-running it.
//! Errors that have a well-known operator fix also carry a help message.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for shipit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, build step, I/O)
  System = 2,
  /// Validation failure (version check, dirty working tree)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for shipit
#[derive(Debug)]
pub enum ReleaseError {
  /// Caller configuration errors, raised before any side effect
  Config(ConfigError),

  /// Manifest version rejected before mutation begins
  Version(VersionError),

  /// Git operation errors
  Git(GitError),

  /// Manifest file I/O and parse errors
  Manifest(ManifestError),

  /// Caller-supplied build/post-release step failures
  Step(StepError),

  /// The release failed AND the compensating rollback failed too.
  /// Both errors surface; neither masks the other.
  RollbackFailed {
    original: Box<ReleaseError>,
    rollback: Box<ReleaseError>,
  },

  /// I/O errors
  Io(io::Error),
}

impl ReleaseError {
  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Version(_) => ExitCode::Validation,
      ReleaseError::Git(GitError::DirtyWorkingTree { .. }) => ExitCode::Validation,
      ReleaseError::Git(_) => ExitCode::System,
      ReleaseError::Manifest(_) => ExitCode::System,
      ReleaseError::Step(_) => ExitCode::System,
      ReleaseError::RollbackFailed { .. } => ExitCode::System,
      ReleaseError::Io(_) => ExitCode::System,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Version(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::RollbackFailed { .. } => Some(
        "The repository may be in a partially released state. Inspect `git log`, `git tag` and the manifest before retrying.".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Version(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Manifest(e) => write!(f, "{}", e),
      ReleaseError::Step(e) => write!(f, "{}", e),
      ReleaseError::RollbackFailed { original, rollback } => {
        write!(f, "Release failed: {}\nRollback also failed: {}", original, rollback)
      }
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::RollbackFailed { original, .. } => Some(original.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::Io(io::Error::other(err))
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<VersionError> for ReleaseError {
  fn from(err: VersionError) -> Self {
    ReleaseError::Version(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<ManifestError> for ReleaseError {
  fn from(err: ManifestError) -> Self {
    ReleaseError::Manifest(err)
  }
}

impl From<StepError> for ReleaseError {
  fn from(err: StepError) -> Self {
    ReleaseError::Step(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// No project path supplied
  MissingProjectPath,

  /// No build step supplied
  MissingBuildStep,

  /// Project directory does not exist
  ProjectNotFound { path: PathBuf },

  /// Manifest file missing from the project
  ManifestMissing { path: PathBuf },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::ManifestMissing { path } => Some(format!(
        "shipit releases manifest-versioned projects. Expected a package.json at: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingProjectPath => write!(f, "No project path configured"),
      ConfigError::MissingBuildStep => write!(f, "No build step configured"),
      ConfigError::ProjectNotFound { path } => {
        write!(f, "Project directory not found: {}", path.display())
      }
      ConfigError::ManifestMissing { path } => {
        write!(f, "No manifest found at: {}", path.display())
      }
    }
  }
}

/// Version validation errors
#[derive(Debug)]
pub enum VersionError {
  /// Not a MAJOR.MINOR.PATCH semantic version
  Malformed { version: String, reason: String },

  /// A valid version, but not carrying the development marker
  NotDevelopment { version: String },
}

impl VersionError {
  fn help_message(&self) -> Option<String> {
    match self {
      VersionError::NotDevelopment { .. } => Some(
        "Only development versions can be released. Set the manifest version to e.g. `1.2.3-SNAPSHOT` first."
          .to_string(),
      ),
      VersionError::Malformed { .. } => {
        Some("The manifest version must have exactly three numeric components, e.g. `1.2.3-SNAPSHOT`.".to_string())
      }
    }
  }
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionError::Malformed { version, reason } => {
        write!(f, "Invalid manifest version '{}': {}", version, reason)
      }
      VersionError::NotDevelopment { version } => {
        write!(f, "Manifest version '{}' is not a development version", version)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command exited non-zero
  CommandFailed {
    command: String,
    code: Option<i32>,
    stdout: String,
    stderr: String,
  },

  /// Git command exceeded the subprocess timeout and was killed
  Timeout { command: String, seconds: u64 },

  /// Uncommitted or untracked paths in the working tree
  DirtyWorkingTree { status: String },

  /// HEAD commit could not be resolved (detached/unborn HEAD)
  CommitUnreadable,

  /// Current branch name could not be resolved
  BranchUnreadable,
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::DirtyWorkingTree { .. } => {
        Some("Commit or stash your changes, then run the release again.".to_string())
      }
      GitError::CommandFailed { stderr, .. } => {
        if stderr.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Pull first, then release again.".to_string())
        } else if stderr.contains("permission denied") || stderr.contains("403") {
          Some("Check your SSH key permissions and remote access.".to_string())
        } else {
          None
        }
      }
      GitError::Timeout { .. } => {
        Some("The git command hung. Check remote connectivity and credential prompts.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed {
        command,
        code,
        stdout,
        stderr,
      } => {
        match code {
          Some(code) => write!(f, "Git command failed: {} (exit code {})", command, code)?,
          None => write!(f, "Git command failed: {} (killed by signal)", command)?,
        }
        if !stdout.trim().is_empty() {
          write!(f, "\nstdout: {}", stdout.trim_end())?;
        }
        if !stderr.trim().is_empty() {
          write!(f, "\nstderr: {}", stderr.trim_end())?;
        }
        Ok(())
      }
      GitError::Timeout { command, seconds } => {
        write!(f, "Git command timed out after {}s: {}", seconds, command)
      }
      GitError::DirtyWorkingTree { status } => {
        write!(f, "Working tree is not clean:\n{}", status.trim_end())
      }
      GitError::CommitUnreadable => write!(f, "Could not read the current commit (detached or unborn HEAD?)"),
      GitError::BranchUnreadable => write!(f, "Could not read the current branch name"),
    }
  }
}

/// Manifest file errors
#[derive(Debug)]
pub enum ManifestError {
  /// Manifest file does not exist
  Missing { path: PathBuf },

  /// Manifest exists but could not be understood
  Parse { path: PathBuf, reason: String },

  /// Manifest rewrite failed
  Write { path: PathBuf, source: io::Error },
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::Missing { path } => write!(f, "Manifest not found: {}", path.display()),
      ManifestError::Parse { path, reason } => {
        write!(f, "Failed to parse manifest {}: {}", path.display(), reason)
      }
      ManifestError::Write { path, source } => {
        write!(f, "Failed to write manifest {}: {}", path.display(), source)
      }
    }
  }
}

/// Caller-supplied step failures, wrapped opaquely
#[derive(Debug)]
pub enum StepError {
  /// The build step reported failure
  Build { source: anyhow::Error },

  /// The post-release step reported failure
  PostRelease { source: anyhow::Error },
}

impl fmt::Display for StepError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepError::Build { source } => write!(f, "Build step failed: {:#}", source),
      StepError::PostRelease { source } => write!(f, "Post-release step failed: {:#}", source),
    }
  }
}

/// Result type alias for shipit
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
