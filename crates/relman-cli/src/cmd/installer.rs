//! `relman installer` — the installer RPM target.
//!
//! The downstream spec file can be refreshed wholesale from the upstream
//! project before its `%global` declarations are edited; a failed refresh is
//! fatal because field-editing a half-refreshed file would be worse than
//! stopping.

use anyhow::Context;
use relman_core::config::Config;
use relman_core::git::Git;
use relman_core::process::CommandRunner;
use relman_core::prompt::Prompter;
use relman_core::{branch, buildsys, rpmbuild, specfile};

use super::{prepare_session, select_release_branch, show_rpm_next_steps, sync_target_repo};

/// `%global` declarations the operator is walked through.
const SPEC_GLOBALS: &[&str] = &[
    "product_name_lower",
    "product_name_title",
    "version_installer",
    "server_image",
    "ui_image",
];

pub fn run(
    config: &Config,
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
) -> anyhow::Result<()> {
    let config = prepare_session(config, runner, prompter)?;
    let username = config.username.clone().unwrap_or_default();

    rpmbuild::purge_tree(runner)?;

    let git = Git::new(runner);
    sync_target_repo(&git, &config.installer, &username)?;

    if !prompter.confirm("Want to automate version updates?", true)? {
        show_rpm_next_steps(&config, &config.installer, true, "rhel-9", None);
        return Ok(());
    }

    let base = select_release_branch(&config, &config.installer, runner, prompter)?;
    let target_name = branch::release_target(&base).to_string();

    let spec_path = Config::spec_path(&config.installer);

    let refreshed = prompter.confirm("Refresh the spec file from upstream?", true)?;
    if refreshed {
        let committish = prompter.ask("Pull from what upstream committish?", Some("main"))?;
        let url = config
            .installer_spec_url_template
            .replace("{committish}", &committish);
        specfile::refresh_from_upstream(&spec_path, &url)
            .with_context(|| format!("failed to refresh {}", spec_path.display()))?;
    }

    let (new_globals, updated) = specfile::update_global_fields(&spec_path, SPEC_GLOBALS, prompter)
        .with_context(|| format!("failed to edit {}", spec_path.display()))?;

    if refreshed || updated {
        let new_version = new_globals
            .get("version_installer")
            .context("spec file declares no '%global version_installer'")?
            .clone();

        git.add(&config.installer.local_path, &spec_path)?;
        git.commit(
            &config.installer.local_path,
            &format!("build: update {} to {new_version}", config.installer.package),
            false,
            &config.private_branch,
            prompter,
        )?;

        rpmbuild::build_source_rpm(runner, &spec_path)?;
        let srpm = rpmbuild::find_srpm(&config.installer.package, &new_version)?;
        buildsys::srpm_import(runner, &config.installer.local_path, &srpm)?;

        git.commit(
            &config.installer.local_path,
            "build: update sources",
            false,
            &config.private_branch,
            prompter,
        )?;
    }
    git.push(&config.installer.local_path, &config.private_branch)?;

    if !prompter.confirm("Want to create a scratch build?", true)? {
        show_rpm_next_steps(&config, &config.installer, true, "rhel-9", Some(&target_name));
        return Ok(());
    }

    let release = prompter.ask("What rhpkg '--release' value?", Some("rhel-9"))?;
    let target = format!("{target_name}-candidate");
    buildsys::build(
        runner,
        &config.installer.local_path,
        Some(&release),
        Some(&target),
        true,
    )?;

    show_rpm_next_steps(&config, &config.installer, false, &release, Some(&target_name));
    Ok(())
}
