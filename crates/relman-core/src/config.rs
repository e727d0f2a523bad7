//! Runtime configuration for a relman run.
//!
//! Built once at startup from `RELMAN_*` environment variables and passed by
//! reference into every adapter. Nothing in this crate reads ambient state
//! after construction, which keeps the adapters testable with synthetic
//! configurations.

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Per-repository settings
// ---------------------------------------------------------------------------

/// One downstream dist-git repository the assistant manages.
#[derive(Debug, Clone)]
pub struct RepoConfig {
    /// Origin URL; may contain a `{username}` placeholder that is substituted
    /// with the operator's session principal before cloning.
    pub url_template: String,
    pub local_path: PathBuf,
    /// Package name; also the basename of the spec file for RPM targets.
    pub package: String,
    /// Remote release branches are discovered by this name prefix.
    pub release_branch_prefix: String,
    /// Pre-selected choice when present in the discovered set.
    pub default_release_branch: String,
}

// ---------------------------------------------------------------------------
// Dependency-sync tool settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SyncToolConfig {
    pub git_url: String,
    pub repo_path: PathBuf,
    pub committish: String,
    /// Entry point name invoked through `poetry run`.
    pub tool_name: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Session principal pushing to dist-git. Prompted for during session
    /// setup when unset.
    pub username: Option<String>,
    pub git_name: Option<String>,
    pub git_email: Option<String>,
    pub git_signing_key: Option<String>,

    /// Operator-scoped working branch, force-created from the chosen release
    /// branch and force-pushed. Re-running with the same name overwrites the
    /// previous attempt.
    pub private_branch: String,
    /// True when `private_branch` was auto-derived rather than set by the
    /// operator; lets [`Config::adopt_username`] re-derive it.
    private_branch_is_default: bool,

    pub server: RepoConfig,
    pub cli: RepoConfig,
    pub installer: RepoConfig,
    pub sync: SyncToolConfig,

    /// Upstream spec file location for the installer; `{committish}` is
    /// substituted at fetch time.
    pub installer_spec_url_template: String,

    /// Echo every external command line before running it.
    pub show_commands: bool,
    /// Let quiet subprocesses write to the terminal anyway.
    pub verbose_subprocesses: bool,
}

impl Config {
    /// Read configuration from `RELMAN_*` environment variables, falling back
    /// to the documented defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but with an injectable variable source.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = get("RELMAN_USERNAME");
        let private_branch_env = get("RELMAN_PRIVATE_BRANCH");
        let private_branch_is_default = private_branch_env.is_none();
        let private_branch = private_branch_env.unwrap_or_else(|| {
            derive_private_branch(username.as_deref().unwrap_or("unknown"))
        });

        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Config {
            username,
            git_name: get("RELMAN_GIT_NAME"),
            git_email: get("RELMAN_GIT_EMAIL"),
            git_signing_key: get("RELMAN_GIT_SIGNING_KEY"),
            private_branch,
            private_branch_is_default,
            server: RepoConfig {
                url_template: or(
                    "RELMAN_SERVER_GIT_URL",
                    "ssh://{username}@pkgs.example.com/containers/lodestone-server.git",
                ),
                local_path: or("RELMAN_SERVER_REPO_PATH", "/repos/lodestone-server").into(),
                package: or("RELMAN_SERVER_PACKAGE", "lodestone-server"),
                release_branch_prefix: or(
                    "RELMAN_SERVER_RELEASE_BRANCH_PREFIX",
                    "remotes/origin/lodestone-",
                ),
                default_release_branch: or(
                    "RELMAN_SERVER_RELEASE_BRANCH_DEFAULT",
                    "remotes/origin/lodestone-1-rhel-9",
                ),
            },
            cli: RepoConfig {
                url_template: or(
                    "RELMAN_CLI_GIT_URL",
                    "ssh://{username}@pkgs.example.com/rpms/lodestone-cli.git",
                ),
                local_path: or("RELMAN_CLI_REPO_PATH", "/repos/lodestone-cli").into(),
                package: or("RELMAN_CLI_PACKAGE", "lodestone-cli"),
                release_branch_prefix: or(
                    "RELMAN_CLI_RELEASE_BRANCH_PREFIX",
                    "remotes/origin/lodestone-",
                ),
                default_release_branch: or(
                    "RELMAN_CLI_RELEASE_BRANCH_DEFAULT",
                    "remotes/origin/lodestone-1-rhel-9",
                ),
            },
            installer: RepoConfig {
                url_template: or(
                    "RELMAN_INSTALLER_GIT_URL",
                    "ssh://{username}@pkgs.example.com/rpms/lodestone-installer.git",
                ),
                local_path: or("RELMAN_INSTALLER_REPO_PATH", "/repos/lodestone-installer").into(),
                package: or("RELMAN_INSTALLER_PACKAGE", "lodestone-installer"),
                release_branch_prefix: or(
                    "RELMAN_INSTALLER_RELEASE_BRANCH_PREFIX",
                    "remotes/origin/lodestone-",
                ),
                default_release_branch: or(
                    "RELMAN_INSTALLER_RELEASE_BRANCH_DEFAULT",
                    "remotes/origin/lodestone-1-rhel-9",
                ),
            },
            sync: SyncToolConfig {
                git_url: or("RELMAN_SYNC_GIT_URL", "https://github.com/quipucords/chaski.git"),
                repo_path: or("RELMAN_SYNC_REPO_PATH", "/repos/chaski").into(),
                committish: or("RELMAN_SYNC_COMMITTISH", "main"),
                tool_name: or("RELMAN_SYNC_TOOL_NAME", "chaski"),
            },
            installer_spec_url_template: or(
                "RELMAN_INSTALLER_SPEC_URL",
                "https://raw.githubusercontent.com/lodestone-project/lodestone-installer/{committish}/lodestone-installer.spec",
            ),
            show_commands: get("RELMAN_SHOW_COMMANDS").as_deref() == Some("1"),
            verbose_subprocesses: get("RELMAN_VERBOSE_SUBPROCESSES").as_deref() == Some("1"),
        }
    }

    /// Record the session principal acquired during credential setup. An
    /// auto-derived private branch name is re-derived so it carries the real
    /// username instead of a placeholder.
    pub fn adopt_username(&mut self, username: &str) {
        if self.username.as_deref() != Some(username) && self.private_branch_is_default {
            self.private_branch = derive_private_branch(username);
        }
        self.username = Some(username.to_string());
    }

    /// Spec file path for an RPM target (`<local_path>/<package>.spec`).
    pub fn spec_path(repo: &RepoConfig) -> PathBuf {
        repo.local_path.join(format!("{}.spec", repo.package))
    }
}

fn derive_private_branch(username: &str) -> String {
    format!("private-{}-{}", username, chrono::Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config = Config::from_lookup(lookup(&[]));
        assert!(config.username.is_none());
        assert_eq!(config.server.package, "lodestone-server");
        assert_eq!(config.sync.tool_name, "chaski");
        assert!(!config.show_commands);
        assert!(config.private_branch.starts_with("private-unknown-"));
    }

    #[test]
    fn env_overrides_win() {
        let config = Config::from_lookup(lookup(&[
            ("RELMAN_USERNAME", "alice"),
            ("RELMAN_PRIVATE_BRANCH", "private-alice-rework"),
            ("RELMAN_SERVER_REPO_PATH", "/tmp/server"),
            ("RELMAN_SHOW_COMMANDS", "1"),
        ]));
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.private_branch, "private-alice-rework");
        assert_eq!(config.server.local_path, PathBuf::from("/tmp/server"));
        assert!(config.show_commands);
    }

    #[test]
    fn private_branch_embeds_username() {
        let config = Config::from_lookup(lookup(&[("RELMAN_USERNAME", "bob")]));
        assert!(config.private_branch.starts_with("private-bob-"));
    }

    #[test]
    fn adopt_username_rederives_default_private_branch() {
        let mut config = Config::from_lookup(lookup(&[]));
        config.adopt_username("carol");
        assert!(config.private_branch.starts_with("private-carol-"));
        assert_eq!(config.username.as_deref(), Some("carol"));
    }

    #[test]
    fn adopt_username_keeps_operator_chosen_branch() {
        let mut config =
            Config::from_lookup(lookup(&[("RELMAN_PRIVATE_BRANCH", "private-me-keep")]));
        config.adopt_username("carol");
        assert_eq!(config.private_branch, "private-me-keep");
    }

    #[test]
    fn spec_path_joins_package_name() {
        let config = Config::from_lookup(lookup(&[("RELMAN_CLI_REPO_PATH", "/repos/x")]));
        assert_eq!(
            Config::spec_path(&config.cli),
            PathBuf::from("/repos/x/lodestone-cli.spec")
        );
    }
}
