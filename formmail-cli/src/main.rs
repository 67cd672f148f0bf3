//! formmail CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use formmail::observability::{self, ObservabilityConfig};
use formmail_cli_lib::{Backend, CheckConfigCommand, ProcessCommand};

#[derive(Parser)]
#[command(name = "formmail")]
#[command(version)]
#[command(about = "Check form configurations and process submissions", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a urlencoded submission through the configured checks
    Process {
        /// TOML configuration file
        #[arg(short, long)]
        config: PathBuf,
        /// File holding the urlencoded form body
        #[arg(short, long)]
        input: PathBuf,
        /// Send the email when the submission is accepted
        #[arg(long)]
        send: bool,
        /// Mail backend used with --send
        #[arg(long, value_enum, default_value_t = Backend::Console)]
        backend: Backend,
        /// Current Unix time for the timestamp check
        #[arg(long)]
        now: Option<i64>,
    },
    /// Validate a configuration file
    CheckConfig {
        /// TOML configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    observability::init_with(
        &ObservabilityConfig::new("formmail")
            .with_json(false)
            .with_verbose(cli.verbose),
    )?;

    match cli.command {
        Commands::Process {
            config,
            input,
            send,
            backend,
            now,
        } => {
            let accepted = ProcessCommand::new(config, input)
                .send(send, backend)
                .now(now)
                .execute()
                .await?;
            if !accepted {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::CheckConfig { config } => {
            CheckConfigCommand::new(config).execute()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
