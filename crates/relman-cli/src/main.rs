mod cmd;
mod output;

use std::io::IsTerminal;

use anyhow::Context;
use clap::{Parser, Subcommand};
use relman_core::config::Config;
use relman_core::process::SystemRunner;
use relman_core::prompt::ConsolePrompter;

#[derive(Parser)]
#[command(
    name = "relman",
    about = "Interactive release assistant for branching, versioning, and scratch-building downstream packages",
    version,
    propagate_version = true
)]
struct Cli {
    /// Echo every external command line before running it
    #[arg(long, global = true)]
    show_commands: bool,

    /// Let quiet subprocesses write to the terminal
    #[arg(long, global = true)]
    verbose_subprocesses: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare and scratch-build the server container image
    Server,
    /// Prepare and scratch-build the command-line RPM
    Cli,
    /// Prepare and scratch-build the installer RPM
    Installer,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("relman walks an operator through prompts and needs an interactive terminal");
    }
    which::which("git").context("git not found on PATH")?;

    let mut config = Config::from_env();
    config.show_commands |= cli.show_commands;
    config.verbose_subprocesses |= cli.verbose_subprocesses;

    let runner = SystemRunner::from_config(&config);
    let prompter = ConsolePrompter;

    // Closed dispatch: one orchestration per packaging target.
    match cli.command {
        Commands::Server => cmd::server::run(&config, &runner, &prompter),
        Commands::Cli => cmd::cli::run(&config, &runner, &prompter),
        Commands::Installer => cmd::installer::run(&config, &runner, &prompter),
    }
}
