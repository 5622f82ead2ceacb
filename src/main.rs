mod artifact;
mod cli;
mod commands;
mod config;
mod error;
mod lifecycle;
mod paths;
mod progress;
mod session;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Settings;
use session::Session;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub session: Session,
}

fn main() {
    if let Err(e) = run() {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "productionize", &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load()?;
    let workdir = cli.workdir.as_deref().map(|p| paths::expand(&p.to_string_lossy()));
    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        session: Session::new(workdir, settings)?,
    };

    match cli.command {
        Command::Check => commands::workbench::check(&ctx),
        Command::Setup => commands::workbench::setup(&ctx),
        Command::Uninstall(args) => commands::workbench::uninstall(&ctx, args),
        Command::Cluster(cmd) => commands::cluster::run(&ctx, cmd),
        Command::Project(cmd) => commands::project::run(&ctx, cmd),
        Command::Prepare(args) => commands::product::prepare(&ctx, args),
        Command::Deploy(args) => commands::product::deploy(&ctx, args),
        Command::Delete(args) => commands::product::delete(&ctx, args),
        Command::Inspect { json } => commands::inspect::run(&ctx, json),
        Command::Completions { .. } => Ok(()),
    }
}
