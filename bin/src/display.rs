//! Display utilities and output formatting for the sierra-sync CLI.

use anyhow::{Context, Result};
use clap::ValueEnum;
use sierra_lib::prelude::*;
use sierra_lib::{ExportReport, SyncPlan};
use std::fs;
use std::path::Path;

/// Which file a dump reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum DumpKind {
    Depth,
    Scid,
    Both,
}

impl DumpKind {
    pub(crate) const fn wants_depth(self) -> bool {
        matches!(self, Self::Depth | Self::Both)
    }

    pub(crate) const fn wants_trades(self) -> bool {
        matches!(self, Self::Scid | Self::Both)
    }
}

/// Renders a Markdown table.
pub(crate) fn markdown_table<R>(headers: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = Vec<String>>,
{
    let mut out = format!("| {} |\n", headers.join(" | "));
    out.push_str(&format!("|{}\n", " --- |".repeat(headers.len())));
    for row in rows {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}

/// Renders depth records as `t(ms) | cmd | side | price | qty | flags`.
pub(crate) fn depth_markdown(records: &[DepthRecord]) -> String {
    if records.is_empty() {
        return "_none_\n".to_string();
    }
    markdown_table(
        &["t(ms)", "cmd", "side", "price", "qty", "flags"],
        records.iter().map(|r| {
            let command = r.command();
            vec![
                format_ms(r.timestamp),
                command.map_or_else(|| r.command.to_string(), |c| c.tag().to_string()),
                command
                    .and_then(|c| c.side())
                    .map_or("", |s| s.as_str())
                    .to_string(),
                format!("{:.5}", r.price),
                r.quantity.to_string(),
                if r.is_end_of_batch() { "EOB" } else { "" }.to_string(),
            ]
        }),
    )
}

/// Renders trade records with raw microsecond timestamps.
pub(crate) fn trade_markdown(records: &[TradeRecord]) -> String {
    if records.is_empty() {
        return "_none_\n".to_string();
    }
    markdown_table(
        &["t(us UTC)", "open", "high", "low", "close", "trd", "vol", "bidv", "askv"],
        records.iter().map(|r| {
            vec![
                r.timestamp.to_string(),
                format!("{:.5}", r.open),
                format!("{:.5}", r.high),
                format!("{:.5}", r.low),
                format!("{:.5}", r.close),
                r.num_trades.to_string(),
                r.total_volume.to_string(),
                r.bid_volume.to_string(),
                r.ask_volume.to_string(),
            ]
        }),
    )
}

/// Renders the candidate list (newest depth file first) and the choice.
pub(crate) fn render_plan(plan: &SyncPlan) -> String {
    let mut candidates: Vec<_> = plan.candidates.iter().collect();
    candidates.sort_by(|a, b| b.depth_mtime.cmp(&a.depth_mtime));

    let mut out = String::from("Candidates:\n");
    for c in candidates {
        let depth_name = c
            .depth_file
            .file_name()
            .map_or_else(|| c.depth_file.display().to_string(), |n| n.to_string_lossy().into_owned());
        let trade = c
            .trade_file
            .as_ref()
            .map_or_else(|| "SCID: MISSING".to_string(), |p| p.display().to_string());
        out.push_str(&format!("  - {} | {depth_name} | {trade}\n", c.stem));
    }

    let chosen = &plan.chosen;
    let trade = chosen
        .trade_file
        .as_ref()
        .map_or_else(|| "Not found".to_string(), |p| p.display().to_string());
    out.push_str("\nChosen:\n");
    out.push_str(&format!("  Contract ID: {}\n", chosen.stem));
    out.push_str(&format!("  SCID file:   {trade}\n"));
    out.push_str(&format!("  Depth file:  {}\n", chosen.depth_file.display()));
    if chosen.day != plan.requested_day {
        out.push_str(&format!(
            "  Day:         {} (requested {})\n",
            chosen.day, plan.requested_day
        ));
    }
    out.push_str(&format!("  Output stem: {}\n", plan.out_stem));
    out
}

/// Renders export statistics.
pub(crate) fn render_report(report: &ExportReport) -> String {
    let mut out = String::new();
    for (label, stats) in [("depth", &report.depth), ("scid", &report.trade)] {
        out.push_str(&format!(
            "{label:<5} {} rows, {} bytes in {:.2?} ({:.0} rows/s, {:.1} MiB/s) -> {}\n",
            stats.records,
            stats.bytes,
            stats.elapsed,
            stats.records_per_sec(),
            stats.mib_per_sec(),
            stats.output.display()
        ));
    }
    out
}

/// Writes `text` to `out`, creating parent directories, or prints it.
pub(crate) fn write_or_print(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
        }
    }
}
