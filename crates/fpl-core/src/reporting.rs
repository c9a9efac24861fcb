use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backtest::{GameweekRecord, SeasonOutcome, SeasonReport};
use crate::scoring::Armband;
use crate::substitution::BenchDecision;
use crate::transfers::TransferSummary;

pub const ARTIFACT_SCHEMA_VERSION: &str = "1.0";

const RULE: &str = "========================================================================";

/// Persisted result of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub run_id: String,
    pub plan_sha256: String,
    pub stats_sha256: String,
    pub report: SeasonReport,
}

impl BacktestArtifact {
    pub fn new(
        run_id: impl Into<String>,
        plan_sha256: impl Into<String>,
        stats_sha256: impl Into<String>,
        report: SeasonReport,
    ) -> Self {
        Self {
            schema_version: ARTIFACT_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            run_id: run_id.into(),
            plan_sha256: plan_sha256.into(),
            stats_sha256: stats_sha256.into(),
            report,
        }
    }
}

/// Write the artifact as pretty JSON.
pub fn write_artifact_json(path: &Path, artifact: &BacktestArtifact) -> Result<()> {
    let content = serde_json::to_string_pretty(artifact).context("serialize backtest artifact")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

pub fn read_artifact_json(path: &Path) -> Result<BacktestArtifact> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("parse {:?}", path))
}

/// Plain-text season report: one section per gameweek, then a summary.
pub fn render_report_text(report: &SeasonReport) -> String {
    let mut out = String::new();
    for record in &report.gameweeks {
        render_gameweek(&mut out, record);
    }

    if let SeasonOutcome::Aborted { reason } = &report.outcome {
        let _ = writeln!(out, "\nGW{}: SEASON ABORTED", reason.gameweek);
        let _ = writeln!(out, "  {}: {}", reason.category, reason.detail);
    }

    let s = &report.summary;
    let _ = writeln!(out, "\n\n{}", RULE);
    out.push_str("FINAL SUMMARY\n");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Total Points: {}", s.total_score);
    let _ = writeln!(out, "Total Transfers: {}", s.total_transfers);
    let _ = writeln!(out, "Average GW Points: {:.2}", s.average_score);
    let _ = writeln!(out, "Gameweeks Completed: {}", s.gameweeks_completed);
    if !s.skipped_gameweeks.is_empty() {
        let skipped: Vec<String> = s.skipped_gameweeks.iter().map(u32::to_string).collect();
        let _ = writeln!(out, "Skipped Gameweeks: {}", skipped.join(", "));
    }
    let status = if report.is_complete() { "complete" } else { "aborted" };
    let _ = writeln!(out, "Status: {}", status);
    let _ = writeln!(out, "{}", RULE);
    out
}

fn render_gameweek(out: &mut String, r: &GameweekRecord) {
    let _ = writeln!(out, "\n{}", RULE);
    let _ = writeln!(out, "GAMEWEEK {}", r.gameweek);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Points: {}", r.score.total);
    let _ = writeln!(out, "Cumulative Points: {}", r.cumulative_score);

    match &r.transfers {
        TransferSummary::InitialSquad { players } => {
            let _ = writeln!(out, "\nInitial Squad ({}):", players.len());
            for p in players {
                let _ = writeln!(out, "    {}", p);
            }
        }
        TransferSummary::Transfers {
            players_in,
            players_out,
        } if !players_in.is_empty() || !players_out.is_empty() => {
            out.push_str("\nTransfers:\n");
            let _ = writeln!(out, "  IN ({}):", players_in.len());
            for p in players_in {
                let _ = writeln!(out, "    {}", p);
            }
            let _ = writeln!(out, "  OUT ({}):", players_out.len());
            for p in players_out {
                let _ = writeln!(out, "    {}", p);
            }
        }
        TransferSummary::Transfers { .. } => out.push_str("\nTransfers: None\n"),
    }

    let _ = writeln!(
        out,
        "\nCaptain: {} (ID: {})",
        r.captain.name, r.captain.player_id
    );
    let _ = writeln!(
        out,
        "Vice-Captain: {} (ID: {})",
        r.vice_captain.name, r.vice_captain.player_id
    );
    if r.score.captaincy.doubled.is_some() {
        let _ = writeln!(
            out,
            "Captain Bonus: {:+} pts ({})",
            r.score.captaincy.bonus,
            r.score.captaincy.label()
        );
    } else {
        out.push_str("Captain Bonus: none\n");
    }

    if r.substitutions.is_empty() {
        out.push_str("\nSubstitutions Made: None\n");
    } else {
        let _ = writeln!(out, "\nSubstitutions Made ({}):", r.substitutions.len());
        for sub in &r.substitutions {
            let name = r
                .bench
                .iter()
                .find(|b| b.slot == sub.slot)
                .map(|b| b.player.name.as_str())
                .unwrap_or("?");
            let _ = writeln!(
                out,
                "  Bench {}: {} ({}) - {}pts",
                sub.slot, name, sub.position, sub.points
            );
        }
    }

    let _ = writeln!(
        out,
        "\nActive Lineup ({} players, {}):",
        r.lineup.len(),
        r.formation
    );
    for e in &r.lineup {
        let marker = match e.armband {
            Some(Armband::Captain) => " (C)",
            Some(Armband::ViceCaptain) => " (VC)",
            None => "",
        };
        let _ = writeln!(
            out,
            "  {}: {}{} - {}pts ({}min)",
            e.player.position, e.player.name, marker, e.points, e.minutes
        );
    }

    out.push_str("\nBench:\n");
    for b in &r.bench {
        let mark = match b.decision {
            BenchDecision::Substituted => "✓",
            BenchDecision::DidNotPlay => "✗ did not play",
            BenchDecision::FormationBlocked => "✗ formation",
            BenchDecision::NotNeeded => "✗",
        };
        let _ = writeln!(
            out,
            "  {}. {} ({}) - {}pts ({}min) [{}]",
            b.slot, b.player.name, b.player.position, b.points, b.minutes, mark
        );
    }

    if let (Some(bank), Some(ft)) = (r.bank, r.free_transfers) {
        let _ = writeln!(out, "\nBank: {:.1}  Free Transfers: {}", bank as f64 / 10.0, ft);
    }
}
