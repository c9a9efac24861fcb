//! `fpl-backtest`: replay an optimizer's season plan against realized stats.
//!
//! ## Commands
//!
//! - `run`: simulate the season and print (or write) the report
//! - `validate`: check every gameweek's squad rules without simulating

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};

use fpl_core::{
    digest, render_report_text, validate_plan, write_artifact_json, BacktestArtifact,
    BacktestConfig, GameweekValidation, SeasonBacktest, SeasonPlan, SeasonReport, StatsTable,
    ValidationStatus, SEASON_GAMEWEEKS,
};

#[derive(Parser)]
#[command(name = "fpl-backtest")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Backtest an FPL season plan against realized player stats", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
struct Inputs {
    /// Optimizer output (JSON keyed by gw1..gw38)
    #[arg(long, env = "FPL_PLAN")]
    plan: PathBuf,

    /// Realized per-player, per-gameweek stats (CSV)
    #[arg(long, env = "FPL_STATS")]
    stats: PathBuf,

    /// First gameweek to process
    #[arg(long = "from", default_value_t = 1)]
    from: u32,

    /// Last gameweek to process
    #[arg(long = "to", default_value_t = SEASON_GAMEWEEKS)]
    to: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate the season and report points, substitutions and transfers
    Run {
        #[command(flatten)]
        inputs: Inputs,

        /// Validate every gameweek in parallel before simulating
        #[arg(long)]
        prevalidate: bool,

        /// Write the JSON artifact (report plus input digests) here
        #[arg(long)]
        json_out: Option<PathBuf>,

        /// Write the text report here instead of stdout
        #[arg(long)]
        text_out: Option<PathBuf>,
    },

    /// Check squad rules for every gameweek without simulating
    Validate {
        #[command(flatten)]
        inputs: Inputs,

        /// Print results as JSON
        #[arg(long)]
        emit_json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    fpl_core::telemetry::init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Run {
            inputs,
            prevalidate,
            json_out,
            text_out,
        } => cmd_run(&inputs, prevalidate, json_out.as_deref(), text_out.as_deref()),
        Commands::Validate { inputs, emit_json } => cmd_validate(&inputs, emit_json),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn load_inputs(inputs: &Inputs) -> Result<(SeasonPlan, StatsTable)> {
    let plan = SeasonPlan::from_path(&inputs.plan)
        .with_context(|| format!("Failed to load season plan: {:?}", inputs.plan))?;
    let stats = StatsTable::from_csv_path(&inputs.stats)
        .with_context(|| format!("Failed to load stats table: {:?}", inputs.stats))?;
    info!(
        gameweeks = plan.len(),
        rows = stats.row_count(),
        "inputs loaded"
    );
    Ok((plan, stats))
}

/// Returns whether the season completed.
fn cmd_run(
    inputs: &Inputs,
    prevalidate: bool,
    json_out: Option<&Path>,
    text_out: Option<&Path>,
) -> Result<bool> {
    let (plan, stats) = load_inputs(inputs)?;
    let config = BacktestConfig::default()
        .with_range(inputs.from, inputs.to)
        .with_prevalidate(prevalidate);

    let backtest = SeasonBacktest::new(&plan, &stats, config);
    let report = backtest.run().context("Season backtest failed")?;

    if let Some(path) = json_out {
        let artifact = BacktestArtifact::new(
            backtest.run_id(),
            digest::file_sha256(&inputs.plan)?,
            digest::file_sha256(&inputs.stats)?,
            report.clone(),
        );
        write_artifact_json(path, &artifact)?;
        println!("Artifact written to {:?}", path);
    }

    let text = render_report_text(&report);
    match text_out {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write text report to {:?}", path))?;
            println!("Report written to {:?}", path);
        }
        None => print!("{}", text),
    }

    print_outcome(&report);
    Ok(report.is_complete())
}

fn print_outcome(report: &SeasonReport) {
    match report.failure() {
        None => println!(
            "Final Points: {}  Total Transfers: {}",
            report.summary.total_score, report.summary.total_transfers
        ),
        Some(reason) => eprintln!(
            "Season aborted at GW{} ({}): {}",
            reason.gameweek, reason.category, reason.detail
        ),
    }
}

#[derive(Serialize)]
struct ValidateOutput<'a> {
    gameweeks_checked: usize,
    failed: usize,
    gameweeks: &'a [GameweekValidation],
}

/// Returns whether every gameweek passed.
fn cmd_validate(inputs: &Inputs, emit_json: bool) -> Result<bool> {
    let (plan, stats) = load_inputs(inputs)?;
    let config = BacktestConfig::default().with_range(inputs.from, inputs.to);
    let results = validate_plan(&plan, &stats, &config).context("Validation failed")?;
    let failed = results.iter().filter(|r| !r.status.passed()).count();

    if emit_json {
        let out = ValidateOutput {
            gameweeks_checked: results.len(),
            failed,
            gameweeks: &results,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for r in &results {
            match &r.status {
                ValidationStatus::Valid => println!("GW{}: ok", r.gameweek),
                ValidationStatus::Failed(f) => {
                    println!("GW{}: FAILED {}: {}", r.gameweek, f.category, f.detail)
                }
            }
        }
        println!("{} checked, {} failed", results.len(), failed);
    }
    Ok(failed == 0)
}
