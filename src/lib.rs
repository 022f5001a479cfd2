//! KSPDev Utils release packager library.
//!
//! This crate compiles the KSPDev Utils library through an external build
//! command, stages the binary, its documentation, and the project notes into
//! a release folder, and zips that folder into a versioned archive. It is
//! used by the `kspdev-packager` CLI binary and can be driven
//! programmatically with a stub build for testing.
//!
//! # Modules
//!
//! - [`builder`] - Build command invocation and artifact verification
//! - [`config`] - Project layout and naming configuration
//! - [`error`] - Semantic error types and exit codes
//! - [`manifest`] - The ordered list of files that make up a release
//! - [`output`] - Progress lines and dry-run rendering
//! - [`package`] - Zip archive creation and inspection
//! - [`path_guard`] - Containment checks for every file system access
//! - [`stager`] - Release folder creation, copying, and deletion
//! - [`version`] - Release version extraction
//! - [`workflow`] - Step-by-step release orchestration

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod output;
pub mod package;
pub mod path_guard;
pub mod stager;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod version;
pub mod workflow;
