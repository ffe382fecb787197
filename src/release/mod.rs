//! Release orchestration
//!
//! One [`perform`] call is one release transaction.
//!
//! # Core Invariants
//!
//! 1. **Nothing is mutated until the preflight passes**
//!    - Manifest version must be a development version
//!    - Working tree must be clean
//!    - HEAD commit and branch must be readable (they are the rollback point)
//!
//! 2. **Every mutation after the rollback point is compensated on failure**
//!    - Hard reset to the pre-release commit, then delete the release tag
//!      if one was created, in that order
//!    - The triggering error is always re-raised; if rollback itself fails,
//!      both errors surface chained
//!
//! 3. **Exactly five mutating git commands on the happy path, in order**
//!    - commit release bump, tag, commit next-dev bump, push tag, push branch
//!
//! # Example
//!
//! ```no_run
//! use shipit::release::{perform, ReleaseConfig, ShellStep};
//!
//! let mut config = ReleaseConfig::default();
//! config.project_path = Some("/path/to/project".into());
//! config.build = Some(Box::new(ShellStep::new("npm test")));
//! let outcome = perform(config)?;
//! println!("released {}", outcome.release_version);
//! # Ok::<(), shipit::core::error::ReleaseError>(())
//! ```

pub mod config;
pub mod perform;

pub use config::{ReleaseConfig, ReleaseStep, ShellStep, StepContext};
pub use perform::{ReleaseOutcome, perform};
