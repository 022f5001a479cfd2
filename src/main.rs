//! KSPDev Utils release packager CLI entrypoint.
//!
//! This binary compiles the library, stages the release files, and zips them
//! into a versioned archive at the project root. Progress is printed to
//! stderr; diagnostics go through `log` and are enabled with `-v` or
//! `RUST_LOG`.

use clap::Parser;
use kspdev_packager::builder::{BuildCollaborator, SystemBuildCollaborator};
use kspdev_packager::cli::Cli;
use kspdev_packager::config::PackagerConfig;
use kspdev_packager::error::Result;
use kspdev_packager::output::write_stderr_line;
use kspdev_packager::workflow::{ReleaseWorkflow, WorkflowOptions};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &SystemBuildCollaborator, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli, collaborator: &dyn BuildCollaborator, stderr: &mut dyn Write) -> Result<()> {
    let config = resolve_config(cli)?;
    let options = WorkflowOptions {
        overwrite: cli.overwrite,
        quiet: cli.quiet,
    };
    let workflow = ReleaseWorkflow::new(&config, collaborator, options);

    // Dry-run mode: show what would be done without side effects
    if cli.dry_run {
        return workflow.dry_run(stderr);
    }

    let summary = workflow.run(stderr)?;
    log::info!(
        "packaged v{} into {} ({} entries)",
        summary.version,
        summary.package.archive_path,
        summary.package.entries.len()
    );
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<PackagerConfig> {
    let config = PackagerConfig::discover(cli.config.as_deref())?;
    Ok(match &cli.project_root {
        Some(root) => config.with_project_root(root),
        None => config,
    })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            err.exit_code()
        }
    }
}
