//! The list of files that make up a release.

use crate::config::PackagerConfig;
use crate::stager::CopyRequest;
use crate::version::Version;
use camino::Utf8Path;

/// Ordered copy operations staging one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseManifest {
    entries: Vec<CopyRequest>,
}

impl ReleaseManifest {
    /// The standard release: the binary and its docs renamed to embed the
    /// version, followed by the license and readme prefixed with the
    /// artifact stem.
    ///
    /// # Examples
    ///
    /// ```
    /// use kspdev_packager::config::PackagerConfig;
    /// use kspdev_packager::manifest::ReleaseManifest;
    /// use kspdev_packager::version::Version;
    ///
    /// let manifest = ReleaseManifest::for_version(&PackagerConfig::default(), Version::new(2, 7));
    /// let names: Vec<_> = manifest
    ///     .entries()
    ///     .iter()
    ///     .filter_map(|entry| entry.dest_filename.as_deref())
    ///     .collect();
    /// assert_eq!(
    ///     names,
    ///     [
    ///         "KSPDev_Utils.2.7.dll",
    ///         "KSPDev_Utils.2.7.xml",
    ///         "KSPDev_Utils_LICENSE.md",
    ///         "KSPDev_Utils_README.md",
    ///     ]
    /// );
    /// ```
    #[must_use]
    pub fn for_version(config: &PackagerConfig, version: Version) -> Self {
        let release = config.release_root();
        let stem = &config.artifact_stem;
        let entries = vec![
            CopyRequest::new(config.binary_path(), &release)
                .renamed(format!("{stem}.{version}.{}", config.binary_extension)),
            CopyRequest::new(config.docs_path(), &release)
                .renamed(format!("{stem}.{version}.{}", config.docs_extension)),
            CopyRequest::new(config.license_path(), &release).renamed(format!(
                "{stem}_{}",
                file_name_or(&config.license_file, "LICENSE.md")
            )),
            CopyRequest::new(config.readme_path(), &release).renamed(format!(
                "{stem}_{}",
                file_name_or(&config.readme_file, "README.md")
            )),
        ];
        Self { entries }
    }

    /// The copy operations, in staging order.
    #[must_use]
    pub fn entries(&self) -> &[CopyRequest] {
        &self.entries
    }

    /// Number of copy operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest stages nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn file_name_or<'a>(path: &'a Utf8Path, default: &'a str) -> &'a str {
    path.file_name().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn every_entry_targets_the_release_root() {
        let config = PackagerConfig::default().with_project_root("/p");
        let manifest = ReleaseManifest::for_version(&config, Version::new(1, 4));

        assert_eq!(manifest.len(), 4);
        assert!(
            manifest
                .entries()
                .iter()
                .all(|entry| entry.dest_folder == "/p/Release" && entry.must_exist)
        );
    }

    #[test]
    fn nested_license_path_keeps_only_its_file_name() {
        let config = PackagerConfig {
            license_file: Utf8PathBuf::from("docs/COPYING"),
            ..PackagerConfig::default()
        };
        let manifest = ReleaseManifest::for_version(&config, Version::new(1, 0));

        let license = manifest.entries().get(2).expect("license entry");
        assert_eq!(license.dest_filename.as_deref(), Some("KSPDev_Utils_COPYING"));
        assert_eq!(license.source, config.license_path());
    }
}
