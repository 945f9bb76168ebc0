//! CLI for the upq upload queue.

mod commands;
mod control_socket;
mod printer;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use upq_core::config;
use upq_core::control::ControlCommand;
use upq_core::TaskId;

use commands::{run_completions, run_control, run_status, run_upload, UploadArgs};

/// Top-level CLI for the upq upload queue.
#[derive(Debug, Parser)]
#[command(name = "upq")]
#[command(about = "upq: concurrent, cancelable file uploads", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Upload files to a destination and wait until every upload settles.
    Upload {
        /// Files to upload.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Destination (e.g. remote folder) sent with every file.
        #[arg(long, short)]
        dest: String,
        /// Upload endpoint URL (overrides `endpoint` in config.toml).
        #[arg(long)]
        endpoint: Option<String>,
        /// Bearer token (overrides `auth_token` in config.toml).
        #[arg(long)]
        token: Option<String>,
        /// Maximum concurrent uploads (overrides `concurrency` in config.toml).
        #[arg(long, short = 'j', value_name = "N")]
        concurrency: Option<usize>,
        /// Print events as JSON lines instead of text.
        #[arg(long)]
        json: bool,
        /// Once every upload has settled, keep running while any task is failed
        /// or canceled so `upq retry <ID>` can still reach it (Ctrl-C ends the run).
        /// Without this flag the run exits as soon as the queue is idle.
        #[arg(long)]
        linger: bool,
    },

    /// Cancel an in-flight upload of a running `upq upload`.
    Cancel {
        /// Task identifier.
        id: TaskId,
    },

    /// Retry a failed or canceled upload of a running `upq upload`.
    Retry {
        /// Task identifier.
        id: TaskId,
    },

    /// Remove finished uploads from a running `upq upload`'s task list.
    Clear,

    /// Show tasks of a running `upq upload`.
    Status,

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Upload {
                files,
                dest,
                endpoint,
                token,
                concurrency,
                json,
                linger,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let args = UploadArgs {
                    files,
                    dest,
                    endpoint,
                    token,
                    concurrency,
                    json,
                    linger,
                };
                run_upload(&cfg, args).await?;
            }
            CliCommand::Cancel { id } => run_control(ControlCommand::Cancel(id)).await?,
            CliCommand::Retry { id } => run_control(ControlCommand::Retry(id)).await?,
            CliCommand::Clear => run_control(ControlCommand::ClearCompleted).await?,
            CliCommand::Status => run_status().await?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
