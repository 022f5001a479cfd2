//! Path containment checks.
//!
//! Every file-system operation in the packager asks a [`PathGuard`] for the
//! absolute form of the path it is about to touch. Reads are confined to the
//! project root and writes or deletes to the release root, so a misconfigured
//! file name such as `../../secret` fails loudly instead of escaping.

use crate::error::{PackagerError, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::fmt;

/// The operation a containment check is performed for.
///
/// Reported in [`PackagerError::PathEscape`] so the diagnostic says what the
/// packager was trying to do when the path was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Creating a directory tree.
    MakePath,
    /// Reading the source side of a copy.
    CopyFrom,
    /// Writing the destination side of a copy.
    CopyTo,
    /// Removing a staged file or folder.
    Delete,
    /// Reading the version metadata file.
    GetVersion,
    /// Writing the output archive.
    Package,
    /// Locating the release folder or reading it for archiving.
    Release,
    /// Checking for the compiled binary.
    Binary,
}

impl Action {
    /// Upper-case label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MakePath => "MAKE PATH",
            Self::CopyFrom => "COPY-FROM",
            Self::CopyTo => "COPY-TO",
            Self::Delete => "DELETE",
            Self::GetVersion => "GET VERSION",
            Self::Package => "PACKAGE",
            Self::Release => "RELEASE",
            Self::Binary => "BINARY",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Confines candidate paths to a single root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGuard {
    root: Utf8PathBuf,
}

impl PathGuard {
    /// Create a guard for `root`.
    ///
    /// A relative root is resolved against the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be read or is not
    /// valid UTF-8.
    pub fn new(root: impl AsRef<Utf8Path>) -> Result<Self> {
        Ok(Self {
            root: absolute(root.as_ref())?,
        })
    }

    /// Absolute form of the guarded root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Return the absolute form of `candidate` if it lies at or beneath the
    /// root.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::PathEscape`] when the candidate resolves to a
    /// location outside the root, or an I/O error if a relative candidate
    /// cannot be resolved.
    ///
    /// # Examples
    ///
    /// ```
    /// use kspdev_packager::path_guard::{Action, PathGuard};
    ///
    /// let guard = PathGuard::new("/work/project")?;
    /// let inside = guard.confine("/work/project/Release/a.dll", Action::CopyTo)?;
    /// assert_eq!(inside, "/work/project/Release/a.dll");
    /// assert!(guard.confine("/work/project/../secret", Action::Delete).is_err());
    /// # Ok::<(), kspdev_packager::error::PackagerError>(())
    /// ```
    pub fn confine(&self, candidate: impl AsRef<Utf8Path>, action: Action) -> Result<Utf8PathBuf> {
        let path = absolute(candidate.as_ref())?;
        if path.strip_prefix(&self.root).is_ok() {
            log::trace!("{action}: {path} is within {}", self.root);
            return Ok(path);
        }
        Err(PackagerError::PathEscape {
            path,
            root: self.root.clone(),
            action,
        })
    }

    /// Create a guard for a directory strictly beneath this root.
    ///
    /// Used for the release folder, which is wiped on every run and so must
    /// neither leave the project nor be the project itself.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::PathEscape`] when `candidate` resolves outside
    /// this root or to the root itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use kspdev_packager::path_guard::{Action, PathGuard};
    ///
    /// let project = PathGuard::new("/work/project")?;
    /// let release = project.nested("/work/project/Release", Action::Release)?;
    /// assert_eq!(release.root().as_str(), "/work/project/Release");
    /// assert!(project.nested("/work/project/.", Action::Release).is_err());
    /// assert!(project.nested("/work/project/../x", Action::Release).is_err());
    /// # Ok::<(), kspdev_packager::error::PackagerError>(())
    /// ```
    pub fn nested(&self, candidate: impl AsRef<Utf8Path>, action: Action) -> Result<Self> {
        let root = self.confine(candidate, action)?;
        if root == self.root {
            return Err(PackagerError::PathEscape {
                path: root,
                root: self.root.clone(),
                action,
            });
        }
        Ok(Self { root })
    }
}

/// Resolve `path` to an absolute, lexically normalised path.
///
/// Relative paths are joined onto the current working directory. `.`
/// components are dropped and `..` components remove the preceding
/// component; the file system is never consulted, so symlinks are not
/// followed.
///
/// # Errors
///
/// Returns an error if the working directory cannot be read or is not valid
/// UTF-8.
pub fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(normalise(path));
    }
    let cwd = std::env::current_dir()?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| PackagerError::NonUtf8Path {
        path: e.into_path_buf().display().to_string(),
    })?;
    Ok(normalise(&cwd.join(path)))
}

/// Lexically normalise `path` without touching the file system.
#[must_use]
pub fn normalise(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::Prefix(_) | Utf8Component::RootDir => out.push(component.as_str()),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                // `..` at the root stays at the root.
                out.pop();
            }
            Utf8Component::Normal(part) => out.push(part),
        }
    }
    out
}
