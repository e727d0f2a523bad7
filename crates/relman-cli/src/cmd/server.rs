//! `relman server` — the container-image target.
//!
//! The server repo declares its component versions in
//! `sources-version.yaml`; after the edit the dependency-sync tool
//! propagates them into the remote source manifests, then the result is
//! committed, pushed, and optionally scratch-built as a container.

use anyhow::Context;
use relman_core::config::Config;
use relman_core::git::Git;
use relman_core::process::CommandRunner;
use relman_core::prompt::Prompter;
use relman_core::{branch, buildsys, syncer, versions};

use super::{prepare_session, select_release_branch, sync_target_repo};
use crate::output::print_rule;

pub fn run(
    config: &Config,
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
) -> anyhow::Result<()> {
    let config = prepare_session(config, runner, prompter)?;
    let username = config.username.clone().unwrap_or_default();

    syncer::set_up(runner, &config).context("failed to set up the dependency sync tool")?;

    let git = Git::new(runner);
    sync_target_repo(&git, &config.server, &username)?;

    if !prompter.confirm("Want to automate version updates?", true)? {
        show_next_steps(&config, None, true, true);
        return Ok(());
    }

    let base = select_release_branch(&config, &config.server, runner, prompter)?;
    let target_name = branch::release_target(&base).to_string();

    let versions_path = config.server.local_path.join("sources-version.yaml");
    versions::edit_versions(&versions_path, prompter)
        .with_context(|| format!("failed to edit {}", versions_path.display()))?;

    // Best-effort: a sync failure is worth a warning, not a dead run.
    syncer::update_remote_sources(runner, &config, &config.server.local_path, false)?;

    git.commit(
        &config.server.local_path,
        "chore: update versions",
        true,
        &config.private_branch,
        prompter,
    )?;

    if !prompter.confirm("Want to create a scratch build?", true)? {
        show_next_steps(&config, Some(&target_name), false, true);
        return Ok(());
    }

    buildsys::container_build(
        runner,
        &config.server.local_path,
        Some(&format!("{target_name}-containers-candidate")),
        true,
    )?;

    show_next_steps(&config, Some(&target_name), false, false);
    Ok(())
}

fn show_next_steps(config: &Config, target_name: Option<&str>, with_sync: bool, with_scratch: bool) {
    let target_name = target_name
        .unwrap_or_else(|| branch::release_target(&config.server.default_release_branch));
    let path = config.server.local_path.display();
    let sync_repo = config.sync.repo_path.display();
    let tool = &config.sync.tool_name;

    print_rule("Suggested Next Steps");
    println!();
    println!("{} should exist at:", config.server.package);
    println!();
    println!("    {path}");
    println!();

    if with_sync {
        println!("{tool} can now be executed like:");
        println!();
        println!("    python3 -m poetry run -C {sync_repo} {tool}");
        println!();
        println!("Remember to branch the server repo and update versions with {tool}:");
        println!();
        println!("    cd {path}");
        println!("    git fetch -p --all");
        println!("    git checkout {target_name}");
        println!("    git checkout -B {}", config.private_branch);
        println!("    $EDITOR sources-version.yaml");
        println!();
        println!("    python3 -m poetry run -C {sync_repo} {tool} update-remote-sources {path}");
        println!();
        println!("    git commit -am 'chore: update versions'");
        println!(
            "    git push --force --set-upstream origin {}",
            config.private_branch
        );
        println!();
    }

    if with_scratch {
        println!("Create a scratch build:");
        println!();
        println!("    cd {path}");
        println!("    rhpkg container-build --target={target_name}-containers-candidate --scratch");
        println!();
    }

    println!("Update the release branch and create the release build:");
    println!();
    println!("    cd {path}");
    println!("    git checkout {target_name}");
    println!("    git rebase {}", config.private_branch);
    println!("    git push");
    println!("    rhpkg container-build --target={target_name}-containers-candidate");
}
