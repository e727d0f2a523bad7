//! `relman cli` — the command-line RPM target.
//!
//! Version lives in the `Version:` directive of the package spec file. A
//! changed version triggers a local SRPM rebuild and a dist-git `import`
//! before the private branch is pushed.

use anyhow::Context;
use relman_core::config::Config;
use relman_core::git::Git;
use relman_core::process::CommandRunner;
use relman_core::prompt::Prompter;
use relman_core::{branch, buildsys, rpmbuild, specfile};

use super::{prepare_session, select_release_branch, show_rpm_next_steps, sync_target_repo};

pub fn run(
    config: &Config,
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
) -> anyhow::Result<()> {
    let config = prepare_session(config, runner, prompter)?;
    let username = config.username.clone().unwrap_or_default();

    rpmbuild::purge_tree(runner)?;

    let git = Git::new(runner);
    sync_target_repo(&git, &config.cli, &username)?;

    if !prompter.confirm("Want to automate version updates?", true)? {
        show_rpm_next_steps(&config, &config.cli, true, "rhel-9", None);
        return Ok(());
    }

    let base = select_release_branch(&config, &config.cli, runner, prompter)?;
    let target_name = branch::release_target(&base).to_string();

    let spec_path = Config::spec_path(&config.cli);
    if let Some(new_version) = specfile::update_version_field(&spec_path, prompter)
        .with_context(|| format!("failed to edit {}", spec_path.display()))?
    {
        git.commit(
            &config.cli.local_path,
            &format!("build: update version to {new_version}"),
            false,
            &config.private_branch,
            prompter,
        )?;

        rpmbuild::build_source_rpm(runner, &spec_path)?;
        let srpm = rpmbuild::find_srpm(&config.cli.package, &new_version)?;
        buildsys::srpm_import(runner, &config.cli.local_path, &srpm)?;

        git.commit(
            &config.cli.local_path,
            "build: update sources",
            false,
            &config.private_branch,
            prompter,
        )?;
    }
    git.push(&config.cli.local_path, &config.private_branch)?;

    if !prompter.confirm("Want to create a scratch build?", true)? {
        show_rpm_next_steps(&config, &config.cli, true, "rhel-9", Some(&target_name));
        return Ok(());
    }

    let release = prompter.ask("What rhpkg '--release' value?", Some("rhel-9"))?;
    let target = format!("{target_name}-candidate");
    buildsys::build(
        runner,
        &config.cli.local_path,
        Some(&release),
        Some(&target),
        true,
    )?;

    show_rpm_next_steps(&config, &config.cli, false, &release, Some(&target_name));
    Ok(())
}
