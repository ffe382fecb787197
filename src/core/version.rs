//! Version policy: development-marker handling and patch bumps
//!
//! Pure functions over `semver::Version`. A development version is a
//! three-component semver whose prerelease component is the literal
//! `SNAPSHOT` marker. The semver grammar itself enforces the
//! three-numeric-components rule, so `1.2-SNAPSHOT` is rejected at parse
//! time.

use crate::core::error::VersionError;
use semver::{Prerelease, Version};

/// The development marker carried by work-in-progress versions
pub const DEV_MARKER: &str = "SNAPSHOT";

/// Parse a manifest version string
pub fn parse(raw: &str) -> Result<Version, VersionError> {
  Version::parse(raw.trim()).map_err(|e| VersionError::Malformed {
    version: raw.to_string(),
    reason: e.to_string(),
  })
}

/// True iff the version carries the development marker
pub fn is_development(version: &Version) -> bool {
  version.pre.as_str() == DEV_MARKER
}

/// Increment the patch component, dropping prerelease and build metadata
pub fn next_patch(version: &Version) -> Version {
  Version::new(version.major, version.minor, version.patch + 1)
}

/// Release version derived from a development version: next patch, marker stripped
pub fn release_from(dev: &Version) -> Version {
  next_patch(dev)
}

/// Next development version derived from a release version: next patch, marker re-appended
pub fn next_development(release: &Version) -> Version {
  let mut next = next_patch(release);
  // DEV_MARKER is a valid prerelease identifier
  next.pre = Prerelease::new(DEV_MARKER).unwrap_or(Prerelease::EMPTY);
  next
}
