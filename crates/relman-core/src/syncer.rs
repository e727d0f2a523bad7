//! Dependency-sync tool driver.
//!
//! The sync tool is a Python utility living in its own repository, executed
//! through `poetry run`. We treat it as an opaque process: set it up once,
//! then point its subcommands at a target repository. Subcommand failures
//! are best-effort by default — the operator is warned and the workflow
//! continues — unless the caller asks for strict mode.

use std::path::Path;

use crate::config::Config;
use crate::error::{RelmanError, Result};
use crate::git::Git;
use crate::process::{CommandRunner, CommandSpec};
use crate::prompt::warn;

/// Clone (or reuse), update, and `poetry install` the sync tool repository.
pub fn set_up(runner: &dyn CommandRunner, config: &Config) -> Result<()> {
    let git = Git::new(runner);
    git.ensure_present(
        &config.sync.git_url,
        &config.sync.repo_path,
        config.username.as_deref().unwrap_or(""),
    )?;
    git.checkout_ref(&config.sync.repo_path, &config.sync.committish)?;
    git.pull(&config.sync.repo_path)?;

    let sync_repo = config.sync.repo_path.display().to_string();
    let install =
        CommandSpec::new(["python3", "-m", "poetry", "install", "-C", sync_repo.as_str()]).quiet();
    if runner.status(&install)? != 0 {
        return Err(RelmanError::SyncToolInstallFailed {
            path: config.sync.repo_path.clone(),
        });
    }
    Ok(())
}

/// Propagate the version declarations to the remote source manifests.
pub fn update_remote_sources(
    runner: &dyn CommandRunner,
    config: &Config,
    target_repo: &Path,
    strict: bool,
) -> Result<()> {
    run_subcommand(runner, config, "update-remote-sources", target_repo, strict)
}

/// Refresh the language-ecosystem dependency lockfiles. Independent of
/// [`update_remote_sources`]; each fails or succeeds on its own.
pub fn update_python_deps(
    runner: &dyn CommandRunner,
    config: &Config,
    target_repo: &Path,
    strict: bool,
) -> Result<()> {
    run_subcommand(runner, config, "update-python-deps", target_repo, strict)
}

fn run_subcommand(
    runner: &dyn CommandRunner,
    config: &Config,
    subcommand: &str,
    target_repo: &Path,
    strict: bool,
) -> Result<()> {
    let sync_repo = config.sync.repo_path.display().to_string();
    let target = target_repo.display().to_string();
    let spec = CommandSpec::new([
        "python3",
        "-m",
        "poetry",
        "run",
        "-C",
        sync_repo.as_str(),
        config.sync.tool_name.as_str(),
        subcommand,
        target.as_str(),
    ]);
    let code = runner.status(&spec)?;
    if code != 0 {
        if strict {
            return Err(RelmanError::DependencySyncFailed {
                tool: config.sync.tool_name.clone(),
                path: target_repo.to_path_buf(),
            });
        }
        tracing::warn!(tool = %config.sync.tool_name, %subcommand, code, "dependency sync failed");
        warn(&format!(
            "{} {subcommand} failed against {} (exit {code}); continuing",
            config.sync.tool_name,
            target_repo.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "RELMAN_SYNC_REPO_PATH" => Some("/repos/chaski".into()),
            _ => None,
        })
    }

    #[test]
    fn subcommand_has_the_documented_shape() {
        let runner = ScriptedRunner::new(vec![("python3 -m poetry run", 0, "")]);
        update_remote_sources(&runner, &config(), Path::new("/repos/server"), false).unwrap();

        assert_eq!(
            runner.call_lines(),
            vec![
                "python3 -m poetry run -C /repos/chaski chaski update-remote-sources /repos/server"
                    .to_string()
            ]
        );
    }

    #[test]
    fn failure_is_tolerated_by_default() {
        let runner = ScriptedRunner::new(vec![("python3 -m poetry run", 2, "")]);
        update_remote_sources(&runner, &config(), Path::new("/repos/server"), false).unwrap();
    }

    #[test]
    fn strict_mode_escalates_failure() {
        let runner = ScriptedRunner::new(vec![("python3 -m poetry run", 2, "")]);
        let err = update_python_deps(&runner, &config(), Path::new("/repos/server"), true)
            .unwrap_err();
        assert!(matches!(err, RelmanError::DependencySyncFailed { .. }));
    }
}
