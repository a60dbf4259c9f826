// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the init and deploy subcommands and maps deploy flags to config overrides.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use voyage::compose::RuntimeType;
use voyage::config::{LogLevel, Overrides};

#[derive(Parser)]
#[command(name = "voyage")]
#[command(about = "Pull a monorepo and redeploy only the compose manifests it changed")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging regardless of the configured level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the final result
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new voyage.yml configuration file
    Init {
        /// Repository URL to put in the template
        #[arg(short, long)]
        repo: Option<String>,

        /// Branch to put in the template
        #[arg(short, long)]
        branch: Option<String>,

        /// Overwrite an existing voyage.yml
        #[arg(short, long)]
        force: bool,
    },

    /// Sync the repository and redeploy the manifests whose directories changed
    Deploy(DeployArgs),
}

#[derive(Args)]
pub struct DeployArgs {
    /// Path to a YAML or JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Repository URL
    #[arg(short = 'r', long)]
    pub repo: Option<String>,

    /// Branch to track
    #[arg(short = 'b', long)]
    pub branch: Option<String>,

    /// Local checkout path
    #[arg(short = 'o', long = "out-path")]
    pub out_path: Option<PathBuf>,

    /// Compose file path inside the repository (can be specified multiple times)
    #[arg(short = 'c', long = "compose-path")]
    pub compose_paths: Vec<String>,

    /// Deploy every manifest even if no changes were detected
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Log level (debug, info, error, fatal)
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Container runtime (docker or podman); auto-detected when omitted
    #[arg(long)]
    pub runtime: Option<RuntimeType>,

    /// Abort the whole run after this long (e.g. 90s, 10m)
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Run compose in the foreground instead of detached
    #[arg(long)]
    pub foreground: bool,
}

impl DeployArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            out_path: self.out_path.clone(),
            compose_paths: self.compose_paths.clone(),
            force: self.force,
            log_level: self.log_level.as_deref().map(LogLevel::parse),
            runtime: self.runtime,
            timeout: self.timeout,
            foreground: self.foreground,
        }
    }
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())
}
