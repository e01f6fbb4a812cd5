//! sierra-sync CLI - pair, window and export Sierra Chart depth and trade files.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use sierra_lib::{SyncConfig, TimeOfDay};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use display::DumpKind;

#[derive(Parser)]
#[command(name = "sierra-sync")]
#[command(about = "Sierra Chart depth/trade file matcher and exporter", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only, no progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML settings file. Defaults to the per-user config file when present.
    #[arg(short, long, global = true, env = "SIERRA_SYNC_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Match depth and trade files for a symbol and day; optionally export them
    Sync {
        /// Symbol root (e.g., ES, MES, NQ)
        symbol: String,

        /// UTC day (YYYY-MM-DD)
        date: NaiveDate,

        /// Force contract stem (e.g., ESU25_FUT_CME)
        #[arg(long)]
        stem: Option<String>,

        /// Write -SYNC outputs (full depth day + trade day slice)
        #[arg(long)]
        export: bool,

        /// Override output stem (default: <stem>-SYNC)
        #[arg(long, requires = "export")]
        out_stem: Option<String>,

        /// Disable progress bars
        #[arg(long)]
        no_progress: bool,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump a time window or a book snapshot as a Markdown table
    Dump {
        /// Which file to read
        #[arg(value_enum)]
        kind: DumpKind,

        /// Symbol root (e.g., ES, NQ, CL)
        symbol: String,

        /// UTC day (YYYY-MM-DD)
        date: NaiveDate,

        /// Window start HH:MM:SS[.fff] (UTC)
        #[arg(long, requires = "end", required_unless_present = "snapshot_at")]
        start: Option<TimeOfDay>,

        /// Window end HH:MM:SS[.fff] (UTC), exclusive
        #[arg(long, requires = "start")]
        end: Option<TimeOfDay>,

        /// Depth only: next full book batch at/after HH:MM:SS[.fff] (UTC)
        #[arg(long, conflicts_with_all = ["start", "end"])]
        snapshot_at: Option<TimeOfDay>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Emit JSON rows instead of Markdown
        #[arg(long)]
        json: bool,
    },

    /// Check that each depth file under the depth root starts with a clear-book record
    AuditDepthHead {
        /// Only audit files whose name contains this text
        #[arg(long, default_value = "FUT_CME")]
        filter: String,
    },

    /// Print the effective configuration and check the storage roots
    Doctor,
}

/// Builds the logging handle from `-v`/`-q`, overridable with `RUST_LOG`.
fn logging(verbose: u8, quiet: bool) -> Dispatch {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    Dispatch::new(subscriber)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let dispatch = logging(cli.verbose, cli.quiet);

    tracing::dispatcher::with_default(&dispatch, || match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    })
}

fn run(cli: Cli) -> Result<ExitCode> {
    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = SyncConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match command {
        Commands::Sync {
            symbol,
            date,
            stem,
            export,
            out_stem,
            no_progress,
            json,
        } => Ok(commands::sync::sync(
            &config,
            commands::sync::SyncArgs {
                symbol,
                date,
                stem,
                export,
                out_stem,
                progress: !no_progress && !cli.quiet,
                json,
            },
        )),
        Commands::Dump {
            kind,
            symbol,
            date,
            start,
            end,
            snapshot_at,
            out,
            json,
        } => {
            let view = match (snapshot_at, start, end) {
                (Some(at), _, _) => commands::dump::View::Snapshot(at),
                (None, Some(start), Some(end)) => commands::dump::View::Window(start, end),
                _ => anyhow::bail!("Provide --start and --end, or --snapshot-at"),
            };
            commands::dump::dump(&config, kind, &symbol, date, view, out.as_deref(), json)
        }
        Commands::AuditDepthHead { filter } => commands::audit::audit_depth_head(&config, &filter),
        Commands::Doctor => commands::doctor::doctor(&config, cli.config.as_deref()),
    }
}
