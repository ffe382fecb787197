//! shipit - automated snapshot-to-release workflow
//!
//! Projects that track a development version (`1.2.3-SNAPSHOT`) in their
//! `package.json` can hand the whole release ceremony to [`release::perform`]:
//! validate the working tree, bump to the release version, run the caller's
//! build, commit and tag, run an optional post-release step, bump to the next
//! development version, and push commits and tag to `origin`. Any failure
//! after the first mutation rolls the tree and tag state back to the
//! pre-release commit.

pub mod commands;
pub mod core;
pub mod release;
