//! Binary compilation.
//!
//! The packager does not know how the library is compiled. It runs an
//! external build command through the [`BuildCollaborator`] seam and then
//! checks that the expected binary actually exists, since build scripts are
//! known to exit cleanly without producing output.

use crate::config::PackagerConfig;
use crate::error::{PackagerError, Result};
use crate::path_guard::{Action, PathGuard};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::process::{Command, ExitStatus};

/// A build command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInvocation {
    /// Program to execute.
    pub command: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Directory the program runs in.
    pub working_dir: Utf8PathBuf,
}

impl BuildInvocation {
    /// Build the invocation described by `config`.
    #[must_use]
    pub fn from_config(config: &PackagerConfig) -> Self {
        Self {
            command: config.build_command.clone(),
            args: config.build_args.clone(),
            working_dir: config.build_dir_path(),
        }
    }
}

impl fmt::Display for BuildInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Abstraction over the external build process.
#[cfg_attr(test, mockall::automock)]
pub trait BuildCollaborator {
    /// Run `invocation` to completion and return its exit status.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the process cannot be spawned or waited on.
    fn run(&self, invocation: &BuildInvocation) -> Result<ExitStatus>;
}

/// Runs the build command on the host, inheriting stdio so compiler output
/// reaches the terminal.
///
/// The wait has no timeout; a hung build hangs the packager.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBuildCollaborator;

impl BuildCollaborator for SystemBuildCollaborator {
    fn run(&self, invocation: &BuildInvocation) -> Result<ExitStatus> {
        log::debug!("running {invocation} in {}", invocation.working_dir);
        Command::new(&invocation.command)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .status()
            .map_err(PackagerError::from)
    }
}

/// Compiles the library and verifies the binary exists afterwards.
pub struct BinaryBuilder<'a> {
    invocation: BuildInvocation,
    artifact: Utf8PathBuf,
    project: PathGuard,
    collaborator: &'a dyn BuildCollaborator,
}

impl<'a> BinaryBuilder<'a> {
    /// Create a builder for the binary described by `config`.
    #[must_use]
    pub fn new(
        config: &PackagerConfig,
        project: PathGuard,
        collaborator: &'a dyn BuildCollaborator,
    ) -> Self {
        Self {
            invocation: BuildInvocation::from_config(config),
            artifact: config.binary_path(),
            project,
            collaborator,
        }
    }

    /// The command this builder runs.
    #[must_use]
    pub const fn invocation(&self) -> &BuildInvocation {
        &self.invocation
    }

    /// Configured path of the expected binary.
    #[must_use]
    pub fn artifact(&self) -> &Utf8Path {
        &self.artifact
    }

    /// Run the build and return the absolute path of the produced binary.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::PathEscape`] if the binary path leaves the
    /// project root, an I/O error if the build cannot be started, or
    /// [`PackagerError::BuildFailed`] if the build exits with a non-zero
    /// status or leaves no binary behind.
    pub fn compile(&self) -> Result<Utf8PathBuf> {
        let artifact = self.project.confine(&self.artifact, Action::Binary)?;
        let status = self.collaborator.run(&self.invocation)?;

        if status.success() && artifact.exists() {
            log::debug!("build produced {artifact}");
            return Ok(artifact);
        }

        log::debug!("build finished with {status}; artifact present: {}", artifact.exists());
        Err(PackagerError::BuildFailed {
            command: self.invocation.to_string(),
            artifact,
            exit_code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::exit_status;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Checkout {
        _temp_dir: TempDir,
        config: PackagerConfig,
        project: PathGuard,
    }

    #[fixture]
    fn checkout() -> Checkout {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("utf8 temp path");
        let config = PackagerConfig::default().with_project_root(&root);
        let project = PathGuard::new(&root).expect("guard");
        Checkout {
            _temp_dir: temp_dir,
            config,
            project,
        }
    }

    fn write_artifact(config: &PackagerConfig) {
        let path = config.binary_path();
        std::fs::create_dir_all(path.parent().expect("binary has a parent")).expect("mkdir");
        std::fs::write(&path, b"MZ").expect("write binary");
    }

    #[rstest]
    fn compile_returns_artifact_on_success(checkout: Checkout) {
        write_artifact(&checkout.config);
        let mut collaborator = MockBuildCollaborator::new();
        let expected = BuildInvocation::from_config(&checkout.config);
        collaborator
            .expect_run()
            .withf(move |invocation| *invocation == expected)
            .times(1)
            .returning(|_| Ok(exit_status(0)));

        let builder = BinaryBuilder::new(&checkout.config, checkout.project.clone(), &collaborator);
        let artifact = builder.compile().expect("build succeeds");

        assert!(artifact.ends_with("Source/Bin/Release/KSPDev_Utils.dll"));
    }

    #[rstest]
    fn compile_propagates_non_zero_exit(checkout: Checkout) {
        write_artifact(&checkout.config);
        let mut collaborator = MockBuildCollaborator::new();
        collaborator.expect_run().returning(|_| Ok(exit_status(2)));

        let builder = BinaryBuilder::new(&checkout.config, checkout.project.clone(), &collaborator);
        let err = builder.compile().expect_err("build fails");

        assert!(matches!(
            err,
            PackagerError::BuildFailed {
                exit_code: Some(2),
                ..
            }
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[rstest]
    fn compile_fails_when_artifact_missing_despite_success(checkout: Checkout) {
        let mut collaborator = MockBuildCollaborator::new();
        collaborator.expect_run().returning(|_| Ok(exit_status(0)));

        let builder = BinaryBuilder::new(&checkout.config, checkout.project.clone(), &collaborator);
        let err = builder.compile().expect_err("missing artifact");

        assert!(matches!(err, PackagerError::BuildFailed { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[rstest]
    fn compile_rejects_artifact_outside_project(checkout: Checkout) {
        let mut config = checkout.config.clone();
        config.bin_dir = Utf8PathBuf::from("../elsewhere");
        let mut collaborator = MockBuildCollaborator::new();
        collaborator.expect_run().never();

        let builder = BinaryBuilder::new(&config, checkout.project.clone(), &collaborator);
        let err = builder.compile().expect_err("escape rejected");

        assert!(matches!(
            err,
            PackagerError::PathEscape {
                action: Action::Binary,
                ..
            }
        ));
    }

    #[test]
    fn invocation_display_joins_arguments() {
        let invocation = BuildInvocation {
            command: "msbuild".to_owned(),
            args: vec!["/p:Configuration=Release".to_owned(), "Utils.sln".to_owned()],
            working_dir: Utf8PathBuf::from("/tmp"),
        };
        assert_eq!(
            invocation.to_string(),
            "msbuild /p:Configuration=Release Utils.sln"
        );
    }
}
