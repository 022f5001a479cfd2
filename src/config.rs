//! Packager configuration.
//!
//! `PackagerConfig` replaces the fixed project layout with an explicit value
//! that every component receives at construction. The defaults describe the
//! KSPDev Utils repository as checked out, with the packager run from its
//! `Tools` directory; a `packager.toml` file can override any field so tests
//! and other checkouts can point the workflow somewhere else.

use crate::error::{PackagerError, Result};
use crate::version::Version;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// Name of the configuration file picked up from the working directory when
/// no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "packager.toml";

/// Layout and naming settings for one packaging run.
///
/// Relative paths are resolved against [`PackagerConfig::project_root`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PackagerConfig {
    /// Directory confining every read.
    pub project_root: Utf8PathBuf,
    /// Staging folder confining every write and delete.
    pub release_dir: Utf8PathBuf,
    /// Folder the build writes the binary and its documentation file to.
    pub bin_dir: Utf8PathBuf,
    /// Base name shared by the binary, its docs, and the staged extras.
    pub artifact_stem: String,
    /// Extension of the compiled binary, without the dot.
    pub binary_extension: String,
    /// Extension of the companion documentation file, without the dot.
    pub docs_extension: String,
    /// Source file carrying the `AssemblyVersion` declaration.
    pub assembly_info: Utf8PathBuf,
    /// License file shipped with the release.
    pub license_file: Utf8PathBuf,
    /// Readme file shipped with the release.
    pub readme_file: Utf8PathBuf,
    /// Archive name prefix; the version and `.zip` are appended.
    pub package_prefix: String,
    /// Directory the build command runs in.
    pub build_dir: Utf8PathBuf,
    /// Build command producing the binary.
    pub build_command: String,
    /// Arguments passed to the build command.
    pub build_args: Vec<String>,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from(".."),
            release_dir: Utf8PathBuf::from("Release"),
            bin_dir: Utf8PathBuf::from("Source/Bin/Release"),
            artifact_stem: "KSPDev_Utils".to_owned(),
            binary_extension: "dll".to_owned(),
            docs_extension: "xml".to_owned(),
            assembly_info: Utf8PathBuf::from("Source/Properties/AssemblyInfo.cs"),
            license_file: Utf8PathBuf::from("LICENSE.md"),
            readme_file: Utf8PathBuf::from("README.md"),
            package_prefix: "KSPDevUtils_v".to_owned(),
            build_dir: Utf8PathBuf::from("Tools"),
            build_command: "make_binary.cmd".to_owned(),
            build_args: Vec::new(),
        }
    }
}

impl PackagerConfig {
    /// Parse a configuration from TOML text.
    ///
    /// `origin` is only used to label parse errors.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Config`] when the text is not valid TOML or
    /// contains unknown fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use kspdev_packager::config::PackagerConfig;
    ///
    /// let config = PackagerConfig::from_toml_str(
    ///     "package_prefix = \"MyLib_v\"\n",
    ///     Utf8Path::new("packager.toml"),
    /// )?;
    /// assert_eq!(config.package_prefix, "MyLib_v");
    /// assert_eq!(config.artifact_stem, "KSPDev_Utils");
    /// # Ok::<(), kspdev_packager::error::PackagerError>(())
    /// ```
    pub fn from_toml_str(source: &str, origin: &Utf8Path) -> Result<Self> {
        toml::from_str(source).map_err(|e| PackagerError::Config {
            path: origin.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Config`] when the file cannot be read or
    /// parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| PackagerError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&source, path)
    }

    /// Load `path` when given, otherwise [`DEFAULT_CONFIG_FILE`] from the
    /// working directory when it exists, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Config`] when a selected file cannot be read
    /// or parsed.
    pub fn discover(path: Option<&Utf8Path>) -> Result<Self> {
        if let Some(explicit) = path {
            return Self::load(explicit);
        }
        let implicit = Utf8Path::new(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            log::debug!("loading configuration from {implicit}");
            return Self::load(implicit);
        }
        log::debug!("no {DEFAULT_CONFIG_FILE} found; using defaults");
        Ok(Self::default())
    }

    /// Replace the project root.
    #[must_use]
    pub fn with_project_root(mut self, project_root: impl Into<Utf8PathBuf>) -> Self {
        self.project_root = project_root.into();
        self
    }

    /// The staging folder, resolved against the project root.
    #[must_use]
    pub fn release_root(&self) -> Utf8PathBuf {
        self.project_root.join(&self.release_dir)
    }

    /// File name of the compiled binary, e.g. `KSPDev_Utils.dll`.
    #[must_use]
    pub fn binary_file_name(&self) -> String {
        format!("{}.{}", self.artifact_stem, self.binary_extension)
    }

    /// Path of the compiled binary, resolved against the project root.
    #[must_use]
    pub fn binary_path(&self) -> Utf8PathBuf {
        self.project_root
            .join(&self.bin_dir)
            .join(self.binary_file_name())
    }

    /// Path of the companion documentation file next to the binary.
    #[must_use]
    pub fn docs_path(&self) -> Utf8PathBuf {
        self.project_root
            .join(&self.bin_dir)
            .join(format!("{}.{}", self.artifact_stem, self.docs_extension))
    }

    /// Path of the version metadata file.
    #[must_use]
    pub fn assembly_info_path(&self) -> Utf8PathBuf {
        self.project_root.join(&self.assembly_info)
    }

    /// Path of the license file.
    #[must_use]
    pub fn license_path(&self) -> Utf8PathBuf {
        self.project_root.join(&self.license_file)
    }

    /// Path of the readme file.
    #[must_use]
    pub fn readme_path(&self) -> Utf8PathBuf {
        self.project_root.join(&self.readme_file)
    }

    /// Directory the build command runs in.
    #[must_use]
    pub fn build_dir_path(&self) -> Utf8PathBuf {
        self.project_root.join(&self.build_dir)
    }

    /// Archive file name for `version`, e.g. `KSPDevUtils_v2.7.zip`.
    #[must_use]
    pub fn package_name(&self, version: Version) -> String {
        format!("{}{version}.zip", self.package_prefix)
    }
}
