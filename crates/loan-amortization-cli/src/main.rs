mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::loan::{EmiArgs, ExportArgs, ProgressArgs, ScheduleArgs};
use config::CliConfig;

/// Loan amortization schedules with fixed EMI and rate changes
#[derive(Parser)]
#[command(
    name = "amort",
    version,
    about = "Loan amortization schedules with fixed EMI and rate changes",
    long_about = "Computes the EMI for a loan, its month-by-month amortization schedule \
                  and payment progress. Rate changes re-split later installments into \
                  interest and principal without changing the EMI."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to a TOML config file (defaults to $AMORT_CONFIG, then ./amort.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the EMI for a principal, tenure and annual rate
    Emi(EmiArgs),
    /// Show the amortization schedule with summary totals
    Schedule(ScheduleArgs),
    /// Show interest and principal paid and left as of a date
    Progress(ProgressArgs),
    /// Export the schedule as CSV
    Export(ExportArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    init_tracing(&config);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loan::run_emi(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args, &config),
        Commands::Progress(args) => commands::loan::run_progress(args),
        Commands::Export(args) => commands::loan::run_export(args, &config),
        Commands::Version => {
            println!("amort {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
