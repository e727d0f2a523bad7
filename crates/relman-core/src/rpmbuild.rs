//! Local source-RPM build helpers.
//!
//! The RPM targets rebuild their SRPM in the operator's `~/rpmbuild` tree
//! before importing it into dist-git.

use std::path::{Path, PathBuf};

use crate::error::{RelmanError, Result};
use crate::process::{CommandRunner, CommandSpec};

/// `~/rpmbuild/SRPMS`.
pub fn srpms_dir() -> Result<PathBuf> {
    let dir = home::home_dir().ok_or(RelmanError::HomeNotFound)?;
    Ok(dir.join("rpmbuild").join("SRPMS"))
}

/// Recreate the rpmbuild tree and delete stale files so an old SRPM is never
/// imported by accident.
pub fn purge_tree(runner: &dyn CommandRunner) -> Result<()> {
    runner.status(&CommandSpec::new(["rpmdev-setuptree"]))?;
    let tree = home::home_dir()
        .ok_or(RelmanError::HomeNotFound)?
        .join("rpmbuild");
    let tree = tree.display().to_string();
    let spec = CommandSpec::new([
        "find",
        tree.as_str(),
        "-type",
        "f",
        "-printf",
        "deleted '%p'\\n",
        "-delete",
    ]);
    runner.status(&spec)?;
    Ok(())
}

/// Download sources and build the SRPM for `specfile`.
pub fn build_source_rpm(runner: &dyn CommandRunner, specfile: &Path) -> Result<()> {
    let specfile = specfile.display().to_string();
    let spectool =
        CommandSpec::new(["spectool", "--sourcedir", "--get-files", specfile.as_str()]).quiet();
    runner.status(&spectool)?;

    let rpmbuild =
        CommandSpec::new(["rpmbuild", "-bs", specfile.as_str(), "--verbose", "--clean"]).quiet();
    runner.status(&rpmbuild)?;
    Ok(())
}

/// Locate `<package>-<version>-*.src.rpm` under `~/rpmbuild/SRPMS`.
pub fn find_srpm(package: &str, version: &str) -> Result<PathBuf> {
    find_srpm_in(&srpms_dir()?, package, version)
}

/// As [`find_srpm`] but in an explicit directory. Picks the lexicographically
/// first match when several releases of the same version exist.
pub fn find_srpm_in(dir: &Path, package: &str, version: &str) -> Result<PathBuf> {
    let prefix = format!("{package}-{version}-");
    let pattern = format!("{}/{prefix}*.src.rpm", dir.display());

    let mut matches: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".src.rpm"))
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    matches.sort();

    matches
        .into_iter()
        .next()
        .ok_or(RelmanError::SrpmNotFound { pattern })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn finds_the_matching_srpm() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("lodestone-cli-1.2.0-1.el9.src.rpm"), b"").unwrap();
        std::fs::write(dir.path().join("lodestone-cli-1.1.0-1.el9.src.rpm"), b"").unwrap();

        let srpm = find_srpm_in(dir.path(), "lodestone-cli", "1.2.0").unwrap();
        assert_eq!(
            srpm.file_name().unwrap().to_str().unwrap(),
            "lodestone-cli-1.2.0-1.el9.src.rpm"
        );
    }

    #[test]
    fn missing_srpm_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = find_srpm_in(dir.path(), "lodestone-cli", "1.2.0").unwrap_err();
        assert!(matches!(err, RelmanError::SrpmNotFound { .. }));
    }

    #[test]
    fn ignores_other_packages_and_extensions() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("lodestone-cli-extras-1.2.0-1.src.rpm"), b"").unwrap();
        std::fs::write(dir.path().join("lodestone-cli-1.2.0-1.el9.x86_64.rpm"), b"").unwrap();

        // "-extras-" does not match "lodestone-cli-1.2.0-".
        let err = find_srpm_in(dir.path(), "lodestone-cli", "1.2.0").unwrap_err();
        assert!(matches!(err, RelmanError::SrpmNotFound { .. }));
    }
}
