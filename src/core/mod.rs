//! Core building blocks for the release workflow
//!
//! - **error**: unified error types with exit codes and help messages
//! - **manifest**: version field I/O for package.json
//! - **version**: development-marker policy and patch bumps
//! - **vcs**: git operations via system git (SystemGit)

pub mod error;
pub mod manifest;
pub mod version;
pub mod vcs;
