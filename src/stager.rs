//! Release folder staging.
//!
//! The stager is the only component that creates, copies into, or deletes
//! from the release folder. Every path it receives passes through a
//! [`PathGuard`] first: sources must live in the project root, destinations
//! and deletions in the release root.

use crate::error::{PackagerError, Result};
use crate::path_guard::{Action, PathGuard};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

/// A single copy into the release folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    /// File or folder to copy; must lie within the project root.
    pub source: Utf8PathBuf,
    /// Folder to copy into; must lie within the release root.
    pub dest_folder: Utf8PathBuf,
    /// New file name for a copied file. Ignored for folders.
    pub dest_filename: Option<String>,
    /// Whether a missing source is an error or a skip.
    pub must_exist: bool,
}

impl CopyRequest {
    /// Copy `source` into `dest_folder`, keeping its name. The source must
    /// exist.
    #[must_use]
    pub fn new(source: impl Into<Utf8PathBuf>, dest_folder: impl Into<Utf8PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest_folder: dest_folder.into(),
            dest_filename: None,
            must_exist: true,
        }
    }

    /// Rename the copied file.
    #[must_use]
    pub fn renamed(mut self, dest_filename: impl Into<String>) -> Self {
        self.dest_filename = Some(dest_filename.into());
        self
    }

    /// Skip the copy instead of failing when the source is absent.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.must_exist = false;
        self
    }
}

/// What a [`ReleaseStager::copy`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// A single file was copied.
    File {
        /// Absolute source path.
        source: Utf8PathBuf,
        /// Absolute destination path.
        destination: Utf8PathBuf,
        /// Whether the destination name differs from the source name.
        renamed: bool,
    },
    /// A folder tree was copied.
    Directory {
        /// Absolute source folder.
        source: Utf8PathBuf,
        /// Absolute destination folder.
        destination: Utf8PathBuf,
    },
    /// The optional source was absent; nothing was copied.
    Skipped {
        /// Absolute source path that was not found.
        source: Utf8PathBuf,
    },
}

/// What a [`ReleaseStager::remove`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// A file was deleted.
    File(Utf8PathBuf),
    /// A folder tree was deleted.
    Directory(Utf8PathBuf),
    /// Nothing existed at the path.
    Absent(Utf8PathBuf),
}

/// Creates, copies, and deletes release files within their allowed roots.
#[derive(Debug, Clone)]
pub struct ReleaseStager {
    project: PathGuard,
    release: PathGuard,
}

impl ReleaseStager {
    /// Create a stager confining reads to `project` and writes to `release`.
    #[must_use]
    pub const fn new(project: PathGuard, release: PathGuard) -> Self {
        Self { project, release }
    }

    /// Guard for the project root.
    #[must_use]
    pub const fn project(&self) -> &PathGuard {
        &self.project
    }

    /// Guard for the release root.
    #[must_use]
    pub const fn release(&self) -> &PathGuard {
        &self.release
    }

    /// Create `path` and any missing parents within the project root.
    ///
    /// Returns `true` if the directory was created and `false` if it
    /// already existed.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::PathEscape`] for a path outside the project
    /// root, or an I/O error if creation fails.
    pub fn ensure_directory(&self, path: &Utf8Path) -> Result<bool> {
        let path = self.project.confine(path, Action::MakePath)?;
        if path.is_dir() {
            return Ok(false);
        }
        log::info!("create folder: {path}");
        fs::create_dir_all(&path)?;
        Ok(true)
    }

    /// Copy a file or folder from the project into the release folder.
    ///
    /// Files land at `dest_folder/<dest_filename or source name>`. Folders
    /// are copied recursively to `dest_folder/<source name>`, which must not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::PathEscape`] if any involved path leaves
    /// its root or a source folder contains `dest_folder`,
    /// [`PackagerError::MissingSource`] if a required source is absent, or
    /// an I/O error if copying fails.
    pub fn copy(&self, request: &CopyRequest) -> Result<CopyOutcome> {
        let source = self.project.confine(&request.source, Action::CopyFrom)?;
        let dest_folder = self.release.confine(&request.dest_folder, Action::CopyTo)?;
        let destination = match &request.dest_filename {
            Some(name) => self.release.confine(dest_folder.join(name), Action::CopyTo)?,
            None => dest_folder.clone(),
        };

        if source.is_file() {
            self.ensure_directory(&dest_folder)?;
            let renamed = request.dest_filename.is_some();
            let destination = if renamed {
                destination
            } else {
                self.release
                    .confine(dest_folder.join(file_name(&source)?), Action::CopyTo)?
            };
            log::debug!("copy file {source} -> {destination}");
            fs::copy(&source, &destination)?;
            return Ok(CopyOutcome::File {
                source,
                destination,
                renamed,
            });
        }

        if source.is_dir() {
            // A folder copied into itself would never finish.
            if dest_folder.starts_with(&source) {
                return Err(PackagerError::PathEscape {
                    path: source,
                    root: dest_folder,
                    action: Action::CopyFrom,
                });
            }
            let destination = self
                .release
                .confine(dest_folder.join(file_name(&source)?), Action::CopyTo)?;
            log::debug!("copy folder {source} -> {destination}");
            copy_tree(&source, &destination)?;
            return Ok(CopyOutcome::Directory {
                source,
                destination,
            });
        }

        if request.must_exist {
            return Err(PackagerError::MissingSource { path: source });
        }
        log::warn!("skipping missing optional source: {source}");
        Ok(CopyOutcome::Skipped { source })
    }

    /// Delete a file or folder tree within the release root.
    ///
    /// An absent target is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::PathEscape`] for a path outside the release
    /// root, or an I/O error if deletion of an existing target fails.
    pub fn remove(&self, path: &Utf8Path) -> Result<RemoveOutcome> {
        let path = self.release.confine(path, Action::Delete)?;
        if path.is_file() {
            log::debug!("drop file {path}");
            fs::remove_file(&path)?;
            return Ok(RemoveOutcome::File(path));
        }
        match fs::remove_dir_all(&path) {
            Ok(()) => {
                log::debug!("drop folder {path}");
                Ok(RemoveOutcome::Directory(path))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("nothing to drop at {path}");
                Ok(RemoveOutcome::Absent(path))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Final component of `path`.
fn file_name(path: &Utf8Path) -> Result<&str> {
    path.file_name().ok_or_else(|| {
        PackagerError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("path has no file name: {path}"),
        ))
    })
}

/// Recursively copy the folder `source` to `destination`.
///
/// `destination` must not exist; its parent is created as needed.
fn copy_tree(source: &Utf8Path, destination: &Utf8Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir(destination)?;
    for entry in source.read_dir_utf8()? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "stager_tests.rs"]
mod tests;
