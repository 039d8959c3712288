//! Docgate CLI: check files against the upload policy before they are accepted.
//!
//! The policy is read from UPLOAD_* environment variables (and `.env`).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use docgate_cli::{check_files, init_tracing, render_policy_table, render_reports_table};
use docgate_core::UploadPolicy;
use docgate_validation::Validator;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "docgate", about = "Validate uploaded documents and images")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more files; exits non-zero if any is rejected
    Check {
        /// Files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the effective upload policy
    Policy {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let policy = UploadPolicy::from_env().context("Invalid upload policy configuration")?;

    match cli.command {
        Commands::Check { files, format } => {
            let validator = Validator::new(policy)?;
            let reports = check_files(&validator, &files).await?;

            match format {
                OutputFormat::Json => print_json(&reports)?,
                OutputFormat::Table => print!("{}", render_reports_table(&reports)),
            }

            if reports.iter().all(|r| r.is_accepted()) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Policy { format } => {
            match format {
                OutputFormat::Json => print_json(&policy)?,
                OutputFormat::Table => print!("{}", render_policy_table(&policy)),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
