//! Package-build system invocations (`rhpkg`).
//!
//! Builds run asynchronously on the build service, so these are
//! fire-and-forget: the exit code is logged but never turned into an error.

use std::path::Path;

use crate::error::Result;
use crate::process::{CommandRunner, CommandSpec};

/// `rhpkg [--release R] build [--target T] [--scratch]` for an RPM.
pub fn build(
    runner: &dyn CommandRunner,
    repo_path: &Path,
    release: Option<&str>,
    target: Option<&str>,
    scratch: bool,
) -> Result<()> {
    let mut args = vec!["rhpkg".to_string()];
    if let Some(release) = release {
        args.push("--release".to_string());
        args.push(release.to_string());
    }
    args.push("build".to_string());
    push_build_options(&mut args, target, scratch);

    let code = runner.status(&CommandSpec::new(args).cwd(repo_path))?;
    tracing::debug!(code, "rhpkg build submitted");
    Ok(())
}

/// `rhpkg container-build [--target T] [--scratch]` for an OCI image.
pub fn container_build(
    runner: &dyn CommandRunner,
    repo_path: &Path,
    target: Option<&str>,
    scratch: bool,
) -> Result<()> {
    let mut args = vec!["rhpkg".to_string(), "container-build".to_string()];
    push_build_options(&mut args, target, scratch);

    let code = runner.status(&CommandSpec::new(args).cwd(repo_path))?;
    tracing::debug!(code, "rhpkg container-build submitted");
    Ok(())
}

/// `rhpkg import` to refresh the `sources` file from a built SRPM.
pub fn srpm_import(runner: &dyn CommandRunner, repo_path: &Path, srpm: &Path) -> Result<()> {
    let srpm = srpm.display().to_string();
    let spec = CommandSpec::new(["rhpkg", "import", srpm.as_str()])
        .cwd(repo_path)
        .quiet();
    runner.status(&spec)?;
    Ok(())
}

fn push_build_options(args: &mut Vec<String>, target: Option<&str>, scratch: bool) {
    if let Some(target) = target {
        args.push("--target".to_string());
        args.push(target.to_string());
    }
    if scratch {
        args.push("--scratch".to_string());
    }
}
