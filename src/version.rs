//! Release version extraction.
//!
//! The release version is read from the `AssemblyVersion` attribute in the
//! library's assembly metadata source file. Only the major and minor
//! components end up in release file names.

use crate::error::{PackagerError, Result};
use crate::path_guard::{Action, PathGuard};
use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Matches `[assembly: AssemblyVersion("X.Y.Z")]` with an optional fourth
/// component; the patch and build components may be `*`.
static ASSEMBLY_VERSION: Lazy<Regex> = Lazy::new(assembly_version_pattern);

#[expect(clippy::expect_used, reason = "the pattern is a compile-time constant")]
fn assembly_version_pattern() -> Regex {
    Regex::new(r#"^\[assembly: AssemblyVersion.*\("(\d+)\.(\d+)\.(\*|\d+)(\.(\*|\d+))?"\)\]"#)
        .expect("assembly version pattern is valid")
}

/// Line comment marker in the metadata source.
const COMMENT_MARKER: &str = "//";

/// A `MAJOR.MINOR` release version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    major: u32,
    minor: u32,
}

impl Version {
    /// Create a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Major component.
    #[must_use]
    pub const fn major(self) -> u32 {
        self.major
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(self) -> u32 {
        self.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parse a single source line as a version declaration.
///
/// Returns `None` for lines that do not match, including lines whose major
/// or minor component does not fit in a `u32`.
///
/// # Examples
///
/// ```
/// use kspdev_packager::version::{Version, parse_version_declaration};
///
/// let line = r#"[assembly: AssemblyVersion("2.7.3.1")]"#;
/// assert_eq!(parse_version_declaration(line), Some(Version::new(2, 7)));
/// assert_eq!(parse_version_declaration("using System;"), None);
/// ```
#[must_use]
pub fn parse_version_declaration(line: &str) -> Option<Version> {
    let captures = ASSEMBLY_VERSION.captures(line)?;
    let major = captures.get(1)?.as_str().parse().ok()?;
    let minor = captures.get(2)?.as_str().parse().ok()?;
    Some(Version::new(major, minor))
}

/// Return the first version declared in `contents`, skipping commented-out
/// lines.
#[must_use]
pub fn find_version(contents: &str) -> Option<Version> {
    for line in contents.lines() {
        if line.trim_start().starts_with(COMMENT_MARKER) {
            continue;
        }
        if let Some(version) = parse_version_declaration(line) {
            return Some(version);
        }
    }
    None
}

/// Read the version from the metadata file at `path`.
///
/// The path must lie within the project root held by `project`.
///
/// # Errors
///
/// Returns [`PackagerError::PathEscape`] if the path leaves the project
/// root, an I/O error if the file cannot be read, or
/// [`PackagerError::VersionNotFound`] when no line declares a version.
pub fn extract_version(project: &PathGuard, path: &Utf8Path) -> Result<Version> {
    let path = project.confine(path, Action::GetVersion)?;
    log::debug!("scanning {path} for AssemblyVersion");
    let contents = std::fs::read_to_string(&path)?;
    find_version(&contents).ok_or(PackagerError::VersionNotFound { path })
}
