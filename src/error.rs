//! Error types for the release packager.
//!
//! Every failure in the workflow is fatal. Each variant names the offending
//! path, file, or action so the diagnostic printed by the binary is enough to
//! locate the problem without re-running with extra logging.

use crate::path_guard::Action;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while building, staging, or packaging a release.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// A path resolved to a location outside the root allowed for the action.
    #[error("action {action} is not permitted above the root: {path} (root={root})")]
    PathEscape {
        /// Absolute form of the rejected path.
        path: Utf8PathBuf,
        /// Absolute form of the root the path had to stay beneath.
        root: Utf8PathBuf,
        /// The guarded operation.
        action: Action,
    },

    /// A required input file or folder does not exist.
    #[error("source path not found: {path}")]
    MissingSource {
        /// Absolute path of the missing source.
        path: Utf8PathBuf,
    },

    /// The external build failed or did not produce the expected artifact.
    #[error("compilation failed ({command}); cannot find target artifact: {artifact}")]
    BuildFailed {
        /// The build command that was invoked.
        command: String,
        /// Absolute path of the artifact that was expected afterwards.
        artifact: Utf8PathBuf,
        /// Exit code reported by the build, if it exited normally.
        exit_code: Option<i32>,
    },

    /// No version declaration was found in the metadata file.
    #[error("cannot extract version from: {path}")]
    VersionNotFound {
        /// Absolute path of the file that was searched.
        path: Utf8PathBuf,
    },

    /// The archive for this version already exists and overwriting is off.
    #[error("package for this version already exists: {path}")]
    PackageExists {
        /// Absolute path of the existing archive.
        path: Utf8PathBuf,
    },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration at {path}: {reason}")]
    Config {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the read or parse error.
        reason: String,
    },

    /// A path on the host is not valid UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// Writing the zip archive failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackagerError {
    /// Process exit code for this error.
    ///
    /// A build that exits with a non-zero status propagates its own code.
    /// Every other failure, including a build that exits cleanly without
    /// producing the artifact, maps to `1`.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::BuildFailed {
                exit_code: Some(code),
                ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
