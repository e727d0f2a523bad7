//! Git adapter.
//!
//! Wraps the `git` command line with typed failure signaling. Every mutating
//! operation is preceded by a work-tree sanity check so a stale or foreign
//! directory never silently receives writes. Failures name the exact
//! operation and path so the orchestration layer can decide which ones are
//! survivable (a pull failure during initial sync is warned about and
//! tolerated; everything else aborts the run).

use std::path::Path;

use crate::config::Config;
use crate::error::{RelmanError, Result};
use crate::process::{CommandRunner, CommandSpec};
use crate::prompt::{warn, Prompter};

pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Git { runner }
    }

    /// True when `local_path` sits inside a git work tree.
    pub fn is_work_tree(&self, local_path: &Path) -> Result<bool> {
        if !local_path.is_dir() {
            return Ok(false);
        }
        let spec = CommandSpec::new(["git", "rev-parse", "--is-inside-work-tree"])
            .cwd(local_path)
            .quiet();
        Ok(self.runner.status(&spec)? == 0)
    }

    fn require_work_tree(&self, local_path: &Path) -> Result<()> {
        if !self.is_work_tree(local_path)? {
            return Err(RelmanError::NotAGitRepo {
                path: local_path.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Clone `url_template` (with `{username}` substituted) to `local_path`
    /// unless a work tree is already there. Returns true iff freshly cloned.
    ///
    /// An existing directory that is not a work tree is never overwritten.
    pub fn ensure_present(
        &self,
        url_template: &str,
        local_path: &Path,
        username: &str,
    ) -> Result<bool> {
        if local_path.is_dir() {
            warn(&format!(
                "Directory already exists at {}.",
                local_path.display()
            ));
            self.require_work_tree(local_path)?;
            return Ok(false);
        }
        let url = url_template.replace("{username}", username);
        let target = local_path.display().to_string();
        let spec = CommandSpec::new(["git", "clone", url.as_str(), target.as_str()]);
        if self.runner.status(&spec)? != 0 {
            return Err(RelmanError::CloneFailed {
                url,
                path: local_path.to_path_buf(),
            });
        }
        Ok(true)
    }

    /// Fetch all remotes, then check out `git_ref`.
    pub fn checkout_ref(&self, local_path: &Path, git_ref: &str) -> Result<()> {
        self.require_work_tree(local_path)?;
        let fetch = CommandSpec::new(["git", "fetch", "--all"]).cwd(local_path);
        if self.runner.status(&fetch)? != 0 {
            return Err(RelmanError::FetchAllFailed {
                path: local_path.to_path_buf(),
            });
        }
        let checkout = CommandSpec::new(["git", "checkout", git_ref]).cwd(local_path);
        if self.runner.status(&checkout)? != 0 {
            return Err(RelmanError::CheckoutFailed {
                path: local_path.to_path_buf(),
                git_ref: git_ref.to_string(),
            });
        }
        Ok(())
    }

    pub fn pull(&self, local_path: &Path) -> Result<()> {
        self.require_work_tree(local_path)?;
        let spec = CommandSpec::new(["git", "pull"]).cwd(local_path);
        if self.runner.status(&spec)? != 0 {
            return Err(RelmanError::PullFailed {
                path: local_path.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Check out `base_branch`, then force-create `private_branch` at its
    /// position. Re-running with the same name resets the previous attempt.
    pub fn create_private_branch(
        &self,
        local_path: &Path,
        base_branch: &str,
        private_branch: &str,
    ) -> Result<()> {
        self.require_work_tree(local_path)?;
        let checkout = CommandSpec::new(["git", "checkout", base_branch])
            .cwd(local_path)
            .quiet();
        if self.runner.status(&checkout)? != 0 {
            return Err(RelmanError::CheckoutFailed {
                path: local_path.to_path_buf(),
                git_ref: base_branch.to_string(),
            });
        }
        let create = CommandSpec::new(["git", "checkout", "-B", private_branch]).cwd(local_path);
        if self.runner.status(&create)? != 0 {
            return Err(RelmanError::BranchCreateFailed {
                path: local_path.to_path_buf(),
                branch: private_branch.to_string(),
            });
        }
        Ok(())
    }

    pub fn add(&self, local_path: &Path, file: &Path) -> Result<()> {
        self.require_work_tree(local_path)?;
        let file = file.display().to_string();
        let spec = CommandSpec::new(["git", "add", file.as_str()]).cwd(local_path);
        self.runner.status(&spec)?;
        Ok(())
    }

    /// Show the pending diff, prompt for a commit message, and commit.
    ///
    /// A failed commit is not necessarily fatal: the operator is asked
    /// whether to push anyway (default yes; the work may already be
    /// committed from a previous attempt). Declining aborts this step
    /// without error. When `and_push` is set the private branch is
    /// force-pushed afterwards.
    pub fn commit(
        &self,
        local_path: &Path,
        default_message: &str,
        and_push: bool,
        private_branch: &str,
        prompter: &dyn Prompter,
    ) -> Result<()> {
        self.require_work_tree(local_path)?;
        // Operator review of what is about to be committed.
        let diff = CommandSpec::new(["git", "diff"]).cwd(local_path);
        self.runner.status(&diff)?;

        let message = prompter.ask("git commit message", Some(default_message))?;
        let commit = CommandSpec::new(["git", "commit", "-am", message.as_str()]).cwd(local_path);
        if self.runner.status(&commit)? != 0
            && !prompter.confirm("Failed git commit. Push anyway?", true)?
        {
            return Ok(());
        }

        if and_push {
            self.push(local_path, private_branch)?;
        }
        Ok(())
    }

    /// Force-push the current branch to `origin/<private_branch>` with
    /// upstream tracking. Nonzero exit is fatal for the run.
    pub fn push(&self, local_path: &Path, private_branch: &str) -> Result<()> {
        self.require_work_tree(local_path)?;
        let spec = CommandSpec::new([
            "git",
            "push",
            "--force",
            "--set-upstream",
            "origin",
            private_branch,
        ])
        .cwd(local_path);
        if self.runner.status(&spec)? != 0 {
            return Err(RelmanError::PushFailed {
                path: local_path.to_path_buf(),
                branch: private_branch.to_string(),
            });
        }
        Ok(())
    }

    fn config_add(&self, key: &str, value: &str) -> Result<()> {
        let spec = CommandSpec::new(["git", "config", "--global", "--add", key, value]).quiet();
        self.runner.status(&spec)?;
        Ok(())
    }

    /// Prompt for and apply the git identity used for release commits.
    /// Signing is enabled only when a signing key is provided.
    pub fn configure_identity(&self, config: &Config, prompter: &dyn Prompter) -> Result<()> {
        let name = prompter.ask_required("git user name", config.git_name.as_deref())?;
        let email = prompter.ask_required("git user email", config.git_email.as_deref())?;
        let signing_key = prompter.ask("git user signingkey", config.git_signing_key.as_deref())?;

        self.config_add("user.name", &name)?;
        self.config_add("user.email", &email)?;
        if signing_key.is_empty() {
            self.config_add("commit.gpgsign", "false")?;
        } else {
            self.config_add("user.signingkey", &signing_key)?;
            self.config_add("commit.gpgsign", "true")?;
            warn("Don't forget to import your GPG signing key!");
        }
        Ok(())
    }
}
