//! Release archive creation.
//!
//! Zips the staged release folder into a single archive at the project root.
//! Entry names are relative to the release folder, use `/` separators, and
//! are written in sorted order so two runs over the same tree produce the
//! same entry list.

use crate::error::{PackagerError, Result};
use crate::path_guard::{Action, PathGuard};
use camino::{Utf8Path, Utf8PathBuf};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Read};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Result of a successful [`PackageMaker::make_package`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutput {
    /// Absolute path of the written archive.
    pub archive_path: Utf8PathBuf,
    /// Entry names in the order they were written.
    pub entries: Vec<String>,
    /// Lowercase hex SHA-256 digest of the archive file.
    pub sha256: String,
    /// Whether an existing archive was deleted first.
    pub replaced: bool,
}

/// Archives the release folder.
#[derive(Debug, Clone)]
pub struct PackageMaker {
    project: PathGuard,
    release_dir: Utf8PathBuf,
}

impl PackageMaker {
    /// Create a package maker for the release folder at `release_dir`.
    #[must_use]
    pub fn new(project: PathGuard, release_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            project,
            release_dir: release_dir.into(),
        }
    }

    /// Write the release folder into `<project root>/<name>`.
    ///
    /// When an archive already exists at that path, it is deleted first if
    /// `overwrite` is set; otherwise nothing is touched.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::PathEscape`] if the archive or release folder
    /// leaves the project root, [`PackagerError::PackageExists`] if the
    /// archive exists and `overwrite` is off, or an I/O or archive error if
    /// writing fails.
    pub fn make_package(&self, name: &str, overwrite: bool) -> Result<PackageOutput> {
        let archive_path = self
            .project
            .confine(self.project.root().join(name), Action::Package)?;
        let release_dir = self.project.confine(&self.release_dir, Action::Release)?;

        let replaced = archive_path.exists();
        if replaced {
            if !overwrite {
                return Err(PackagerError::PackageExists { path: archive_path });
            }
            log::info!("package already exists, deleting {archive_path}");
            fs::remove_file(&archive_path)?;
        }

        let entries = write_archive(&archive_path, &release_dir)?;
        let sha256 = compute_sha256(&archive_path)?;
        log::debug!("wrote {} entries to {archive_path}", entries.len());

        Ok(PackageOutput {
            archive_path,
            entries,
            sha256,
            replaced,
        })
    }
}

/// Zip every file and folder beneath `source_dir` into `archive_path`.
///
/// Returns the entry names in write order. Folder entries carry a trailing
/// `/`; the root folder itself is not written.
///
/// # Errors
///
/// Returns an I/O or archive error if reading the tree or writing the
/// archive fails.
pub fn write_archive(archive_path: &Utf8Path, source_dir: &Utf8Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    collect_entries(source_dir, "", &mut files)?;

    let mut writer = zip::ZipWriter::new(File::create(archive_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut entries = Vec::with_capacity(files.len());

    for (entry_name, source) in files {
        match source {
            Some(path) => {
                writer.start_file(entry_name.as_str(), options)?;
                io::copy(&mut File::open(&path)?, &mut writer)?;
            }
            None => writer.add_directory(entry_name.as_str(), options)?,
        }
        entries.push(entry_name);
    }

    writer.finish()?;
    Ok(entries)
}

/// Walk `dir` depth-first in sorted order, pushing `(entry name, file path)`
/// pairs; folders are pushed with `None`.
fn collect_entries(
    dir: &Utf8Path,
    prefix: &str,
    out: &mut Vec<(String, Option<Utf8PathBuf>)>,
) -> Result<()> {
    let mut children = dir
        .read_dir_utf8()?
        .map(|entry| entry.map(|e| e.path().to_owned()))
        .collect::<io::Result<Vec<_>>>()?;
    children.sort();

    for child in children {
        let Some(name) = child.file_name() else {
            continue;
        };
        let entry_name = format!("{prefix}{name}");
        if child.is_dir() {
            let folder = format!("{entry_name}/");
            out.push((folder.clone(), None));
            collect_entries(&child, &folder, out)?;
        } else {
            out.push((entry_name, Some(child)));
        }
    }
    Ok(())
}

/// Compute the lowercase hex SHA-256 digest of a file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn compute_sha256(path: &Utf8Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        let Some(chunk) = buffer.get(..bytes_read) else {
            break;
        };
        if chunk.is_empty() {
            break;
        }
        hasher.update(chunk);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// List the entry names stored in a zip archive.
///
/// # Errors
///
/// Returns an I/O or archive error if the archive cannot be read.
pub fn list_entries(archive_path: &Utf8Path) -> Result<Vec<String>> {
    let archive = zip::ZipArchive::new(File::open(archive_path)?)?;
    Ok(archive.file_names().map(str::to_owned).collect())
}

#[cfg(test)]
#[path = "package_tests.rs"]
mod tests;
