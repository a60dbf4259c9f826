// ABOUTME: Entry point for the voyage CLI application.
// ABOUTME: Parses arguments, resolves configuration, sets up tracing, and dispatches commands.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use tracing_subscriber::EnvFilter;
use voyage::config::{self, CONFIG_FILENAME, Config, LogLevel};
use voyage::error::{Error, Result};
use voyage::output::{Output, OutputMode};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let mut output = Output::new(OutputMode::from_flags(cli.quiet, cli.json));

    if let Err(e) = run(cli, &mut output).await {
        output.error(&e.to_string());
        if matches!(e, Error::MissingParameters(_)) {
            eprintln!("Provide them as flags or in a config file; see 'voyage deploy --help'.");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    match cli.command {
        Commands::Init {
            repo,
            branch,
            force,
        } => {
            init_tracing(LogLevel::default(), cli.verbose);
            let cwd = env::current_dir()?;
            config::init_config(&cwd, repo.as_deref(), branch.as_deref(), force)?;
            output.success(&format!("Created {CONFIG_FILENAME}"), &[]);
            Ok(())
        }
        Commands::Deploy(args) => {
            let cwd = env::current_dir()?;
            let config = Config::resolve(args.config.as_deref(), &cwd, args.overrides())?;

            // The log level can come from the config file, so tracing starts after loading it.
            init_tracing(config.log_level, cli.verbose);
            tracing::debug!(
                repo = config.repository.url(),
                branch = config.repository.branch(),
                out_path = %config.repository.local_path().display(),
                manifests = config.manifests.len(),
                force = config.force,
                "running deploy"
            );

            commands::deploy(config, output).await
        }
    }
}

fn init_tracing(level: LogLevel, verbose: bool) {
    let directive = if verbose {
        "debug"
    } else {
        level.filter_directive()
    };
    let filter =
        EnvFilter::try_from_env("VOYAGE_LOG").unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
