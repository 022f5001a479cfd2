//! Release workflow orchestration.
//!
//! Runs the release steps in a fixed order: build, clean, version, stage,
//! package, notify. Each step is a precondition for the next and the first
//! failure ends the run; nothing is retried. Progress goes to the supplied
//! writer unless the workflow is quiet.

use crate::builder::{BinaryBuilder, BuildCollaborator};
use crate::config::PackagerConfig;
use crate::error::Result;
use crate::manifest::ReleaseManifest;
use crate::output::{
    STRAY_FOLDER_REMINDER, describe_copy, describe_remove, is_stray_root_entry, package_report,
    print_dry_run, write_stderr_line,
};
use crate::package::{PackageMaker, PackageOutput, list_entries};
use crate::path_guard::{Action, PathGuard};
use crate::stager::{CopyOutcome, ReleaseStager};
use crate::version::{Version, extract_version};
use std::fmt;
use std::io::Write;

/// One step of the release workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Compile the binary and verify it exists.
    Build,
    /// Remove the previous release folder.
    Clean,
    /// Read the release version.
    Version,
    /// Copy release files into the release folder.
    Stage,
    /// Zip the release folder.
    Package,
    /// Check the archive and print final reminders.
    Notify,
}

impl Step {
    /// Every step, in execution order.
    pub const ALL: [Self; 6] = [
        Self::Build,
        Self::Clean,
        Self::Version,
        Self::Stage,
        Self::Package,
        Self::Notify,
    ];

    /// Progress header printed when the step starts.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Build => "Compiling sources in PROD mode...",
            Self::Clean => "Cleanup release folder...",
            Self::Version => "Extract release version...",
            Self::Stage => "Make release structure...",
            Self::Package => "Making release package...",
            Self::Notify => "Checking release package...",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Build => "build",
            Self::Clean => "clean",
            Self::Version => "version",
            Self::Stage => "stage",
            Self::Package => "package",
            Self::Notify => "notify",
        };
        f.write_str(name)
    }
}

/// Switches that change how the workflow behaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Replace an existing archive for the same version.
    pub overwrite: bool,
    /// Suppress progress output.
    pub quiet: bool,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    /// The extracted release version.
    pub version: Version,
    /// The written archive.
    pub package: PackageOutput,
    /// Outcome of each staged copy, in manifest order.
    pub staged: Vec<CopyOutcome>,
    /// Whether the archive carries a stray top-level `.` entry.
    pub stray_root_entry: bool,
}

/// The release workflow for one configuration.
pub struct ReleaseWorkflow<'a> {
    config: &'a PackagerConfig,
    collaborator: &'a dyn BuildCollaborator,
    options: WorkflowOptions,
}

impl<'a> ReleaseWorkflow<'a> {
    /// Create a workflow that builds through `collaborator`.
    #[must_use]
    pub fn new(
        config: &'a PackagerConfig,
        collaborator: &'a dyn BuildCollaborator,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            config,
            collaborator,
            options,
        }
    }

    /// Run every step in order.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::PathEscape`](crate::error::PackagerError::PathEscape)
    /// before anything runs if the release folder is not strictly inside the
    /// project root. Otherwise returns the first error raised by any step;
    /// later steps do not run.
    pub fn run(&self, stderr: &mut dyn Write) -> Result<ReleaseSummary> {
        let config = self.config;
        let project = PathGuard::new(&config.project_root)?;
        let release = project.nested(config.release_root(), Action::Release)?;
        let stager = ReleaseStager::new(project.clone(), release);

        self.begin(Step::Build, stderr);
        let binary = BinaryBuilder::new(config, project.clone(), self.collaborator).compile()?;
        self.report(stderr, format!("=> binary: {binary}"));

        self.begin(Step::Clean, stderr);
        let removed = stager.remove(&config.release_root())?;
        self.report(stderr, describe_remove(&removed));

        self.begin(Step::Version, stderr);
        self.report(stderr, format!("=> AssemblyInfo: {}", config.assembly_info_path()));
        let version = extract_version(&project, &config.assembly_info_path())?;
        self.report(stderr, format!("=> found version: v{version}"));

        self.begin(Step::Stage, stderr);
        let manifest = ReleaseManifest::for_version(config, version);
        let mut staged = Vec::with_capacity(manifest.len());
        for request in manifest.entries() {
            let outcome = stager.copy(request)?;
            self.report(stderr, describe_copy(&outcome));
            staged.push(outcome);
        }

        self.begin(Step::Package, stderr);
        let name = config.package_name(version);
        self.report(stderr, format!("=> package: {name}"));
        let package = PackageMaker::new(project, config.release_root())
            .make_package(&name, self.options.overwrite)?;
        if package.replaced {
            self.report(stderr, "=> package already existed and was replaced");
        }
        self.report(stderr, package_report(&package));

        self.begin(Step::Notify, stderr);
        let stray_root_entry = list_entries(&package.archive_path)?
            .iter()
            .any(|entry| is_stray_root_entry(entry));
        if stray_root_entry {
            self.report(stderr, "");
            self.report(stderr, STRAY_FOLDER_REMINDER);
        } else {
            self.report(stderr, "=> no stray top-level folder entry in the archive");
        }

        Ok(ReleaseSummary {
            version,
            package,
            staged,
            stray_root_entry,
        })
    }

    /// Print the resolved configuration and what a run would stage, without
    /// building or writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the release folder is not strictly inside the
    /// project root, or if the version file is outside the project root,
    /// unreadable, or declares no version.
    pub fn dry_run(&self, stderr: &mut dyn Write) -> Result<()> {
        let project = PathGuard::new(&self.config.project_root)?;
        project.nested(self.config.release_root(), Action::Release)?;
        let version = extract_version(&project, &self.config.assembly_info_path())?;
        let manifest = ReleaseManifest::for_version(self.config, version);
        print_dry_run(
            self.config,
            &manifest,
            &self.config.package_name(version),
            stderr,
        );
        Ok(())
    }

    fn begin(&self, step: Step, stderr: &mut dyn Write) {
        log::info!("starting step: {step}");
        self.report(stderr, step.header());
    }

    fn report(&self, stderr: &mut dyn Write, message: impl fmt::Display) {
        if !self.options.quiet {
            write_stderr_line(stderr, message);
        }
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
