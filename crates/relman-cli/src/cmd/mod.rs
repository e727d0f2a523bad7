//! Per-target orchestration commands.
//!
//! Each target walks the same skeleton: credential/identity setup, clone or
//! sync the dist-git repo, an "automate?" gate, release branch selection,
//! private branch creation, version artifact edits, commit/push, and a
//! "scratch build?" gate. Declined gates exit cleanly after printing the
//! equivalent manual commands.

pub mod cli;
pub mod installer;
pub mod server;

use anyhow::Context;
use relman_core::branch::{self, BranchCatalog};
use relman_core::config::{Config, RepoConfig};
use relman_core::git::Git;
use relman_core::process::CommandRunner;
use relman_core::prompt::{warn, Prompter};
use relman_core::{session, RelmanError};

use crate::output::{print_rule, print_table};

/// Identity + kerberos session, then fold the acquired principal back into
/// the configuration (the private branch name may depend on it).
fn prepare_session(
    config: &Config,
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
) -> anyhow::Result<Config> {
    let git = Git::new(runner);
    git.configure_identity(config, prompter)
        .context("failed to configure git identity")?;
    let username = session::ensure_session(runner, prompter, config.username.as_deref())
        .context("failed to acquire a kerberos session")?;

    let mut config = config.clone();
    config.adopt_username(&username);
    Ok(config)
}

/// Clone the target repo, or bring an existing clone up to date.
///
/// A pull failure on an existing clone is deliberately downgraded to a
/// warning: the repo may legitimately sit on a feature branch from a
/// previous run. Pull failures anywhere else in the workflow stay fatal.
fn sync_target_repo(
    git: &Git<'_>,
    repo: &RepoConfig,
    username: &str,
) -> anyhow::Result<()> {
    let fresh = git.ensure_present(&repo.url_template, &repo.local_path, username)?;
    if !fresh {
        git.checkout_ref(&repo.local_path, "master")?;
        match git.pull(&repo.local_path) {
            Err(e @ RelmanError::PullFailed { .. }) => warn(&e.to_string()),
            other => other?,
        }
    }
    Ok(())
}

/// Discover release branches, render the selection table, resolve the
/// operator's choice, and force-create the private branch from it. Returns
/// the chosen base branch.
fn select_release_branch(
    config: &Config,
    repo: &RepoConfig,
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
) -> anyhow::Result<String> {
    let catalog: BranchCatalog = branch::discover(
        runner,
        &repo.local_path,
        &repo.release_branch_prefix,
        &repo.default_release_branch,
    )?;
    print_table(&["#", "branch ref"], catalog.rows());
    let base = catalog.choose(prompter)?;

    let git = Git::new(runner);
    git.create_private_branch(&repo.local_path, &base, &config.private_branch)
        .with_context(|| format!("failed to branch '{}' off {base}", config.private_branch))?;
    Ok(base)
}

/// Next-steps summary for the RPM targets (cli and installer share the
/// manual fallback shape). `target_name` is the chosen release branch's
/// short name when one was selected this run.
fn show_rpm_next_steps(
    config: &Config,
    repo: &RepoConfig,
    with_scratch: bool,
    release: &str,
    target_name: Option<&str>,
) {
    let target_name = target_name
        .unwrap_or_else(|| branch::release_target(&repo.default_release_branch));
    let path = repo.local_path.display();

    print_rule("Suggested Next Steps");
    println!();
    println!("{} should exist at:", repo.package);
    println!();
    println!("    {path}");
    println!();

    if with_scratch {
        println!("Create a scratch build:");
        println!();
        println!("    cd {path}");
        println!("    rhpkg build --release {release} --target={target_name}-candidate --scratch");
        println!();
    }

    println!("Update the release branch and create the release build:");
    println!();
    println!("    cd {path}");
    println!("    git checkout {target_name}");
    println!("    git rebase {}", config.private_branch);
    println!("    git push");
    println!("    rhpkg build --scratch");
    println!("    rhpkg build");
    println!();
    println!(
        "Note that `--release` and `--target` are not required when you invoke \
         `rhpkg build` from the release branches."
    );
    println!("Then repeat these steps for any other build releases (`rhel-9`, `rhel-8`).");
}
