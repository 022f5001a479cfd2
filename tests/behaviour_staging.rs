//! Behaviour-driven tests for release staging.
//!
//! These scenarios cover containment of copy sources and destinations,
//! missing sources, renamed copies, and release folder removal. Tests use
//! the rstest-bdd v0.5.0 mutable world pattern.

use camino::Utf8PathBuf;
use kspdev_packager::error::{PackagerError, Result as PackagerResult};
use kspdev_packager::path_guard::PathGuard;
use kspdev_packager::stager::{CopyOutcome, CopyRequest, ReleaseStager};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::fs;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StagingWorld {
    temp_dir: Option<TempDir>,
    root: Utf8PathBuf,
    release: Utf8PathBuf,
    stager: Option<ReleaseStager>,
    copy_result: Option<PackagerResult<CopyOutcome>>,
}

#[fixture]
fn world() -> StagingWorld {
    let temp_dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp_dir.path().join("project")).expect("utf8 temp path");
    fs::create_dir_all(&root).expect("mkdir project");
    StagingWorld {
        temp_dir: Some(temp_dir),
        root,
        ..StagingWorld::default()
    }
}

fn stager(world: &StagingWorld) -> &ReleaseStager {
    world.stager.as_ref().expect("stager set")
}

fn stage(world: &mut StagingWorld, request: &CopyRequest) {
    let result = stager(world).copy(request);
    world.copy_result = Some(result);
}

fn copy_error(world: &StagingWorld) -> &PackagerError {
    match world.copy_result.as_ref().expect("copy attempted") {
        Ok(outcome) => panic!("expected staging to fail, got {outcome:?}"),
        Err(err) => err,
    }
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a project with a release folder \"{name}\"")]
fn given_project(world: &mut StagingWorld, name: String) {
    assert!(world.temp_dir.is_some(), "temp dir kept alive");
    world.release = world.root.join(name);
    let project = PathGuard::new(&world.root).expect("project guard");
    let release = PathGuard::new(&world.release).expect("release guard");
    world.stager = Some(ReleaseStager::new(project, release));
}

#[given("a project file \"{name}\"")]
fn given_project_file(world: &mut StagingWorld, name: String) {
    fs::write(world.root.join(name), "contents").expect("write project file");
}

#[given("a release file \"{name}\"")]
fn given_release_file(world: &mut StagingWorld, name: String) {
    fs::create_dir_all(&world.release).expect("mkdir release");
    fs::write(world.release.join(name), "stale").expect("write release file");
}

#[when("\"{source}\" is staged in \"{folder}\"")]
fn when_staged(world: &mut StagingWorld, source: String, folder: String) {
    let request = CopyRequest::new(world.root.join(source), world.root.join(folder));
    stage(world, &request);
}

#[when("\"{source}\" is optionally staged in \"{folder}\"")]
fn when_optionally_staged(world: &mut StagingWorld, source: String, folder: String) {
    let request = CopyRequest::new(world.root.join(source), world.root.join(folder)).optional();
    stage(world, &request);
}

#[when("\"{source}\" is staged renamed to \"{name}\"")]
fn when_staged_renamed(world: &mut StagingWorld, source: String, name: String) {
    let request = CopyRequest::new(world.root.join(source), world.release.clone()).renamed(name);
    stage(world, &request);
}

#[when("the release folder is removed")]
fn when_release_removed(world: &mut StagingWorld) {
    let release = world.release.clone();
    stager(world).remove(&release).expect("remove succeeds");
}

#[then("staging is refused for action \"{label}\"")]
fn then_refused(world: &mut StagingWorld, label: String) {
    match copy_error(world) {
        PackagerError::PathEscape { action, .. } => assert_eq!(action.label(), label),
        other => panic!("expected a containment error, got {other}"),
    }
}

#[then("nothing exists at \"{relative}\"")]
fn then_nothing_exists(world: &mut StagingWorld, relative: String) {
    assert!(!world.root.join(relative).exists());
}

#[then("staging fails because \"{relative}\" is missing")]
fn then_missing(world: &mut StagingWorld, relative: String) {
    match copy_error(world) {
        PackagerError::MissingSource { path } => assert!(path.ends_with(&relative)),
        other => panic!("expected a missing source error, got {other}"),
    }
}

#[then("the copy is skipped")]
fn then_skipped(world: &mut StagingWorld) {
    let outcome = world
        .copy_result
        .as_ref()
        .expect("copy attempted")
        .as_ref()
        .expect("optional copy succeeds");
    assert!(matches!(outcome, CopyOutcome::Skipped { .. }));
    assert!(!world.release.exists(), "skipping creates no folder");
}

#[then("the release folder contains \"{name}\"")]
fn then_release_contains(world: &mut StagingWorld, name: String) {
    assert!(world.release.join(name).is_file());
}

#[then("the release folder does not contain \"{name}\"")]
fn then_release_lacks(world: &mut StagingWorld, name: String) {
    assert!(!world.release.join(name).exists());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/staging.feature",
    name = "Copy into a folder that climbs out of the release folder is rejected"
)]
fn scenario_copy_to_escape(world: StagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/staging.feature",
    name = "Copy from outside the project is rejected"
)]
fn scenario_copy_from_escape(world: StagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/staging.feature",
    name = "Missing required source halts staging"
)]
fn scenario_missing_required(world: StagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/staging.feature",
    name = "Missing optional source is skipped"
)]
fn scenario_missing_optional(world: StagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/staging.feature",
    name = "Renamed copy lands under its new name"
)]
fn scenario_renamed_copy(world: StagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/staging.feature",
    name = "Removing the release folder drops its contents"
)]
fn scenario_remove_release(world: StagingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/staging.feature",
    name = "Removing an absent release folder is not an error"
)]
fn scenario_remove_absent(world: StagingWorld) {
    let _ = world;
}
