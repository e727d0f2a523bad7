//! External command invocation.
//!
//! Every shell-out in relman goes through the [`CommandRunner`] trait so the
//! adapters can be exercised in tests with scripted runners. The production
//! implementation is [`SystemRunner`] over `std::process::Command`.
//!
//! Three call modes cover every caller:
//! - [`CommandRunner::status`] — run and collect the exit code, never raises
//!   on nonzero; the caller interprets the code.
//! - [`CommandRunner::output`] — run and capture stdout for parsing (branch
//!   listings and the like).
//! - nonzero-is-fatal calls are expressed at the call site by mapping a
//!   nonzero status to the operation's typed error.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::config::Config;
use crate::error::{RelmanError, Result};

// ---------------------------------------------------------------------------
// CommandSpec
// ---------------------------------------------------------------------------

/// One external invocation: argument vector, working directory, and whether
/// the child's streams should be discarded.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Discard child stdout/stderr unless verbose-subprocess mode is on.
    pub quiet: bool,
}

impl CommandSpec {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec {
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            quiet: false,
        }
    }

    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.cwd = Some(path.into());
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// The command line as the operator would type it.
    pub fn rendered(&self) -> String {
        self.args.join(" ")
    }

    fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}

/// Result of a captured invocation.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub status: i32,
    pub stdout: Vec<u8>,
}

impl CapturedOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

// ---------------------------------------------------------------------------
// CommandRunner
// ---------------------------------------------------------------------------

pub trait CommandRunner {
    /// Run the command and return its exit code. Nonzero is not an error at
    /// this layer.
    fn status(&self, spec: &CommandSpec) -> Result<i32>;

    /// Run the command and capture stdout for parsing.
    fn output(&self, spec: &CommandSpec) -> Result<CapturedOutput>;
}

// ---------------------------------------------------------------------------
// SystemRunner
// ---------------------------------------------------------------------------

/// Real subprocess execution. Blocks until the child exits; there are no
/// timeouts — a hung external command hangs the run, and the operator cancels.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    /// Echo each command line before running it.
    pub show_commands: bool,
    /// Let quiet children write to the terminal anyway.
    pub verbose_subprocesses: bool,
}

impl SystemRunner {
    pub fn from_config(config: &Config) -> Self {
        SystemRunner {
            show_commands: config.show_commands,
            verbose_subprocesses: config.verbose_subprocesses,
        }
    }

    fn echo(&self, spec: &CommandSpec) {
        if !self.show_commands {
            return;
        }
        if let Some(cwd) = &spec.cwd {
            println!("# cwd: {}", cwd.display());
        }
        if spec.quiet && !self.verbose_subprocesses {
            println!("# (output discarded)");
        }
        println!("$ {}", spec.rendered());
    }

    fn command(&self, spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(spec.program());
        cmd.args(&spec.args[1..]);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        if spec.quiet && !self.verbose_subprocesses {
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());
        }
        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn status(&self, spec: &CommandSpec) -> Result<i32> {
        self.echo(spec);
        let status = self
            .command(spec)
            .status()
            .map_err(|e| RelmanError::Spawn {
                program: spec.program().to_string(),
                source: e,
            })?;
        Ok(status.code().unwrap_or(-1))
    }

    fn output(&self, spec: &CommandSpec) -> Result<CapturedOutput> {
        self.echo(spec);
        let output = self
            .command(spec)
            .stdout(Stdio::piped())
            .output()
            .map_err(|e| RelmanError::Spawn {
                program: spec.program().to_string(),
                source: e,
            })?;
        Ok(CapturedOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
        })
    }
}

// ---------------------------------------------------------------------------
// Test runner
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_builder_collects_args_and_cwd() {
        let spec = CommandSpec::new(["git", "fetch", "--all"])
            .cwd("/repos/x")
            .quiet();
        assert_eq!(spec.rendered(), "git fetch --all");
        assert_eq!(spec.cwd.as_deref(), Some(std::path::Path::new("/repos/x")));
        assert!(spec.quiet);
    }

    #[test]
    fn captured_output_decodes_lossily() {
        let captured = CapturedOutput {
            status: 0,
            stdout: b"main\n".to_vec(),
        };
        assert_eq!(captured.stdout_text(), "main\n");
    }

    #[test]
    fn system_runner_reports_spawn_failure() {
        let runner = SystemRunner::default();
        let spec = CommandSpec::new(["relman-definitely-not-a-real-binary"]);
        match runner.status(&spec) {
            Err(RelmanError::Spawn { program, .. }) => {
                assert_eq!(program, "relman-definitely-not-a-real-binary");
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }
}
