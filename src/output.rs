//! Human-readable progress output.
//!
//! The workflow reports each step to a writer (stderr in the binary, a
//! buffer in tests). These helpers render the per-operation lines so that
//! the CLI, the dry run, and the tests share one format.

use crate::builder::BuildInvocation;
use crate::config::PackagerConfig;
use crate::manifest::ReleaseManifest;
use crate::package::PackageOutput;
use crate::stager::{CopyOutcome, RemoveOutcome};
use std::io::Write;

/// Reminder printed when the archive carries a stray top-level `.` entry.
pub const STRAY_FOLDER_REMINDER: &str =
    "!!! Manually drop the bogus folder \".\" from the target archive !!!";

/// Write one line, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress output; ignore write failures.
    }
}

/// Describe a copy outcome.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use kspdev_packager::output::describe_copy;
/// use kspdev_packager::stager::CopyOutcome;
///
/// let outcome = CopyOutcome::Skipped {
///     source: Utf8PathBuf::from("/p/extra.txt"),
/// };
/// assert_eq!(describe_copy(&outcome), "=> skipping: /p/extra.txt");
/// ```
#[must_use]
pub fn describe_copy(outcome: &CopyOutcome) -> String {
    match outcome {
        CopyOutcome::File {
            source,
            destination,
            renamed: true,
        } => format!(
            "=> copy file: {source} (rename: {})",
            destination.file_name().unwrap_or(destination.as_str())
        ),
        CopyOutcome::File { source, .. } => format!("=> copy file: {source}"),
        CopyOutcome::Directory { source, .. } => format!("=> copy folder: {source}"),
        CopyOutcome::Skipped { source } => format!("=> skipping: {source}"),
    }
}

/// Describe a remove outcome.
#[must_use]
pub fn describe_remove(outcome: &RemoveOutcome) -> String {
    match outcome {
        RemoveOutcome::File(path) => format!("=> drop file: {path}"),
        RemoveOutcome::Directory(path) => format!("=> drop folder: {path}"),
        RemoveOutcome::Absent(path) => format!("=> nothing to drop: {path}"),
    }
}

/// Final report after a package was written.
#[must_use]
pub fn package_report(output: &PackageOutput) -> String {
    let plural = if output.entries.len() == 1 { "entry" } else { "entries" };
    format!(
        "=> stored in: {}\n=> {} {plural}, sha256 {}",
        output.archive_path,
        output.entries.len(),
        output.sha256
    )
}

/// Print the resolved configuration and the release manifest without
/// touching the file system.
pub fn print_dry_run(
    config: &PackagerConfig,
    manifest: &ReleaseManifest,
    archive_name: &str,
    stderr: &mut dyn Write,
) {
    write_stderr_line(stderr, "Dry run - no files will be modified");
    write_stderr_line(stderr, "");
    write_stderr_line(stderr, format!("Project root: {}", config.project_root));
    write_stderr_line(stderr, format!("Release folder: {}", config.release_root()));
    let build = BuildInvocation::from_config(config);
    write_stderr_line(
        stderr,
        format!("Build: {build} (in {})", build.working_dir),
    );
    write_stderr_line(stderr, format!("Binary: {}", config.binary_path()));
    write_stderr_line(stderr, format!("Version file: {}", config.assembly_info_path()));
    write_stderr_line(stderr, "");
    write_stderr_line(stderr, "Files to stage:");
    for entry in manifest.entries() {
        let target = entry
            .dest_filename
            .as_deref()
            .map_or_else(
                || entry.dest_folder.to_string(),
                |name| entry.dest_folder.join(name).to_string(),
            );
        write_stderr_line(stderr, format!("  - {} -> {target}", entry.source));
    }
    write_stderr_line(stderr, "");
    write_stderr_line(stderr, format!("Package: {archive_name}"));
}

/// Whether `entry` is the stray top-level folder entry some zip tools write
/// for the archive root.
#[must_use]
pub fn is_stray_root_entry(entry: &str) -> bool {
    matches!(entry, "." | "./" | ".\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    #[test]
    fn renamed_copy_mentions_new_name() {
        let outcome = CopyOutcome::File {
            source: Utf8PathBuf::from("/p/Source/Bin/Release/KSPDev_Utils.dll"),
            destination: Utf8PathBuf::from("/p/Release/KSPDev_Utils.2.7.dll"),
            renamed: true,
        };
        assert_eq!(
            describe_copy(&outcome),
            "=> copy file: /p/Source/Bin/Release/KSPDev_Utils.dll (rename: KSPDev_Utils.2.7.dll)"
        );
    }

    #[test]
    fn remove_outcomes_are_described() {
        let path = Utf8PathBuf::from("/p/Release");
        assert_eq!(
            describe_remove(&RemoveOutcome::Directory(path.clone())),
            "=> drop folder: /p/Release"
        );
        assert_eq!(
            describe_remove(&RemoveOutcome::File(path)),
            "=> drop file: /p/Release"
        );
    }

    #[rstest]
    #[case::dot(".", true)]
    #[case::dot_slash("./", true)]
    #[case::real_folder("Docs/", false)]
    #[case::hidden_file(".gitignore", false)]
    fn detects_stray_root_entries(#[case] entry: &str, #[case] expected: bool) {
        assert_eq!(is_stray_root_entry(entry), expected);
    }

    #[test]
    fn write_stderr_line_appends_newline() {
        let mut buffer = Vec::new();
        write_stderr_line(&mut buffer, "hello");
        assert_eq!(buffer, b"hello\n");
    }

    #[test]
    fn dry_run_lists_manifest_and_package() {
        let config = PackagerConfig::default().with_project_root("/p");
        let manifest = ReleaseManifest::for_version(&config, crate::version::Version::new(2, 7));
        let mut buffer = Vec::new();

        print_dry_run(&config, &manifest, "KSPDevUtils_v2.7.zip", &mut buffer);

        let text = String::from_utf8(buffer).expect("utf8 output");
        assert!(text.contains("Dry run"));
        assert!(text.contains("/p/Release/KSPDev_Utils.2.7.dll"));
        assert!(text.contains("Package: KSPDevUtils_v2.7.zip"));
        assert!(text.contains("Build: make_binary.cmd (in /p/Tools)"));
    }
}
