//! Release branch discovery and selection.
//!
//! A catalog is a one-shot snapshot of the remote release branches matching
//! the configured name prefix, indexed densely from zero in lexicographic
//! order. Indices are only meaningful within the snapshot that produced
//! them.

use std::path::{Path, PathBuf};

use crate::error::{RelmanError, Result};
use crate::process::{CommandRunner, CommandSpec};
use crate::prompt::{warn, Prompter};

#[derive(Debug, Clone)]
pub struct BranchCatalog {
    entries: Vec<String>,
    default_index: Option<usize>,
    repo_path: PathBuf,
    prefix: String,
}

/// Fetch-and-prune remotes, list every branch with color disabled, and keep
/// the ones starting with `prefix`, sorted lexicographically.
///
/// `default_branch` becomes the pre-selected choice when it survives the
/// filter.
pub fn discover(
    runner: &dyn CommandRunner,
    repo_path: &Path,
    prefix: &str,
    default_branch: &str,
) -> Result<BranchCatalog> {
    // Prune so deleted release branches drop out of the listing.
    let fetch = CommandSpec::new(["git", "fetch", "-p", "--all"])
        .cwd(repo_path)
        .quiet();
    runner.status(&fetch)?;

    let list = CommandSpec::new(["git", "branch", "--list", "-a", "--color=never"]).cwd(repo_path);
    let output = runner.output(&list)?;

    let mut entries: Vec<String> = output
        .stdout_text()
        .lines()
        .map(|line| line.trim().trim_start_matches("* ").to_string())
        .filter(|line| line.starts_with(prefix))
        .collect();
    entries.sort();

    let default_index = entries.iter().position(|name| name == default_branch);

    Ok(BranchCatalog {
        entries,
        default_index,
        repo_path: repo_path.to_path_buf(),
        prefix: prefix.to_string(),
    })
}

impl BranchCatalog {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn default_index(&self) -> Option<usize> {
        self.default_index
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(index, name)` rows for table rendering.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, name)| vec![index.to_string(), name.clone()])
            .collect()
    }

    /// Resolve an operator choice to a branch name, re-prompting until the
    /// answer is a valid index. An empty catalog is a hard stop: there is
    /// nothing the operator could pick.
    pub fn choose(&self, prompter: &dyn Prompter) -> Result<String> {
        if self.entries.is_empty() {
            return Err(RelmanError::NoReleaseBranches {
                path: self.repo_path.clone(),
                prefix: self.prefix.clone(),
            });
        }
        let default = self.default_index.map(|index| index.to_string());
        loop {
            let answer = prompter.ask(
                "Which # release branch from the table above?",
                default.as_deref(),
            )?;
            if let Ok(index) = answer.parse::<usize>() {
                if let Some(name) = self.entries.get(index) {
                    return Ok(name.clone());
                }
            }
            warn(&format!(
                "pick a number between 0 and {}",
                self.entries.len() - 1
            ));
        }
    }
}

/// Build-target name derived from a release branch ref; the last path
/// segment is good enough for the packaging targets we drive.
pub fn release_target(branch: &str) -> &str {
    branch.rsplit('/').next().unwrap_or(branch)
}
