//! Shared test utilities for the packager crate.

use crate::builder::{BuildCollaborator, BuildInvocation};
use crate::error::Result;
use camino::Utf8PathBuf;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::process::ExitStatus;

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// What a stubbed build does when it runs.
#[derive(Debug, Clone)]
pub struct StubBuild {
    /// Exit code the build reports.
    pub exit_code: i32,
    /// File the build writes before exiting, if any.
    pub produces: Option<Utf8PathBuf>,
}

impl StubBuild {
    /// A build that exits 0 and writes `artifact`.
    #[must_use]
    pub fn producing(artifact: impl Into<Utf8PathBuf>) -> Self {
        Self {
            exit_code: 0,
            produces: Some(artifact.into()),
        }
    }

    /// A build that exits with `code` and writes nothing.
    #[must_use]
    pub const fn exiting(code: i32) -> Self {
        Self {
            exit_code: code,
            produces: None,
        }
    }
}

/// A stub implementation of `BuildCollaborator` for testing.
///
/// Plays back queued builds in order and records every invocation so tests
/// can check what would have been run.
#[derive(Debug, Default)]
pub struct StubBuildCollaborator {
    builds: RefCell<VecDeque<StubBuild>>,
    invocations: RefCell<Vec<BuildInvocation>>,
}

impl StubBuildCollaborator {
    /// Creates a stub that plays back `builds` in order.
    #[must_use]
    pub fn new(builds: Vec<StubBuild>) -> Self {
        Self {
            builds: RefCell::new(builds.into()),
            invocations: RefCell::new(Vec::new()),
        }
    }

    /// Invocations received so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<BuildInvocation> {
        self.invocations.borrow().clone()
    }

    /// Asserts that all queued builds have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining builds that were not run.
    pub fn assert_finished(&self) {
        assert!(
            self.builds.borrow().is_empty(),
            "expected no further build invocations"
        );
    }
}

impl BuildCollaborator for StubBuildCollaborator {
    fn run(&self, invocation: &BuildInvocation) -> Result<ExitStatus> {
        self.invocations.borrow_mut().push(invocation.clone());
        let Some(build) = self.builds.borrow_mut().pop_front() else {
            return Err(io::Error::other(format!("unexpected build invocation: {invocation}")).into());
        };

        if let Some(artifact) = &build.produces {
            if let Some(parent) = artifact.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(artifact, b"MZ")?;
        }
        Ok(exit_status(build.exit_code))
    }
}
