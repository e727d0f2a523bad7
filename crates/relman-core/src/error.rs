use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelmanError {
    #[error("{path} is not inside a git work tree")]
    NotAGitRepo { path: PathBuf },

    #[error("failed to clone {url} to {path}")]
    CloneFailed { url: String, path: PathBuf },

    #[error("failed to fetch all remotes for repo at {path}")]
    FetchAllFailed { path: PathBuf },

    #[error("failed to checkout ref '{git_ref}' in repo at {path}")]
    CheckoutFailed { path: PathBuf, git_ref: String },

    #[error("failed to force-create branch '{branch}' in repo at {path}")]
    BranchCreateFailed { path: PathBuf, branch: String },

    #[error("failed to pull repo at {path}")]
    PullFailed { path: PathBuf },

    #[error("failed to push branch '{branch}' from repo at {path}")]
    PushFailed { path: PathBuf, branch: String },

    #[error("no remote release branches matching '{prefix}' in repo at {path}")]
    NoReleaseBranches { path: PathBuf, prefix: String },

    #[error("no 'Version:' line found in spec file {path}")]
    VersionFieldNotFound { path: PathBuf },

    #[error("unexpected status {status} downloading {url}")]
    UpstreamFetchFailed { url: String, status: u16 },

    #[error("dependency sync tool '{tool}' failed against {path}")]
    DependencySyncFailed { tool: String, path: PathBuf },

    #[error("failed to install the dependency sync tool in {path}")]
    SyncToolInstallFailed { path: PathBuf },

    #[error("no source RPM matching {pattern}")]
    SrpmNotFound { pattern: String },

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RelmanError>;
