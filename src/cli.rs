//! CLI argument definitions for the release packager.
//!
//! Kept apart from the entrypoint so the binary only orchestrates.

use camino::Utf8PathBuf;
use clap::Parser;
use log::LevelFilter;

/// Build, stage, and zip a versioned release of KSPDev Utils.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "kspdev-packager")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build, stage, and zip a versioned release of KSPDev Utils.\n\n",
    "Runs the build command, wipes the release folder, reads the version from ",
    "AssemblyInfo.cs, copies the binary, its documentation, the license, and the ",
    "readme into the release folder, and zips it as <prefix><version>.zip at the ",
    "project root.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package from the Tools directory of a checkout:\n",
    "    $ kspdev-packager\n\n",
    "  Replace an archive that already exists for this version:\n",
    "    $ kspdev-packager --overwrite\n\n",
    "  Preview the release layout without building:\n",
    "    $ kspdev-packager --dry-run -p ~/src/KSPDev_Utils",
))]
pub struct Cli {
    /// Configuration file [default: packager.toml when present].
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Project root, overriding the configuration file.
    #[arg(short, long, value_name = "DIR")]
    pub project_root: Option<Utf8PathBuf>,

    /// Replace an existing archive for the same version.
    #[arg(long)]
    pub overwrite: bool,

    /// Show configuration and the release layout, then exit without building.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        alias = "verbosity",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Log level selected by the verbosity flags.
    ///
    /// # Examples
    ///
    /// ```
    /// use kspdev_packager::cli::Cli;
    /// use log::LevelFilter;
    ///
    /// let cli = Cli {
    ///     verbosity: 2,
    ///     ..Cli::default()
    /// };
    /// assert_eq!(cli.log_level(), LevelFilter::Debug);
    /// ```
    #[must_use]
    pub const fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 if self.quiet => LevelFilter::Error,
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["kspdev-packager"]);
        assert!(cli.config.is_none());
        assert!(cli.project_root.is_none());
        assert!(!cli.overwrite);
        assert!(!cli.dry_run);
        assert_eq!(cli.verbosity, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn cli_parses_paths() {
        let cli = Cli::parse_from([
            "kspdev-packager",
            "-c",
            "ci/packager.toml",
            "--project-root",
            "/src/KSPDev_Utils",
        ]);
        assert_eq!(cli.config, Some(Utf8PathBuf::from("ci/packager.toml")));
        assert_eq!(
            cli.project_root,
            Some(Utf8PathBuf::from("/src/KSPDev_Utils"))
        );
    }

    #[test]
    fn cli_rejects_quiet_with_verbose() {
        let result = Cli::try_parse_from(["kspdev-packager", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[rstest]
    #[case::default(&["kspdev-packager"], LevelFilter::Warn)]
    #[case::quiet(&["kspdev-packager", "-q"], LevelFilter::Error)]
    #[case::info(&["kspdev-packager", "-v"], LevelFilter::Info)]
    #[case::debug(&["kspdev-packager", "-vv"], LevelFilter::Debug)]
    #[case::trace(&["kspdev-packager", "-vvvv"], LevelFilter::Trace)]
    fn verbosity_maps_to_log_level(#[case] args: &[&str], #[case] expected: LevelFilter) {
        let cli = Cli::parse_from(args);
        assert_eq!(cli.log_level(), expected);
    }

    #[test]
    fn cli_parses_overwrite_and_dry_run() {
        let cli = Cli::parse_from(["kspdev-packager", "--overwrite", "--dry-run"]);
        assert!(cli.overwrite);
        assert!(cli.dry_run);
    }
}
