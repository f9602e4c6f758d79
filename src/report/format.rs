//! Formatted terminal output.
//!
//! Kept apart from the pipeline so output changes stay localized and the
//! pipeline only deals in structured records (which also back `--json`).

use chrono::{DateTime, Utc};

use crate::app::pipeline::{OutputRecord, OutputStatus, PlanEntry, RunOutput};
use crate::render::CompositeOutcome;

/// Per-output table plus the combined-document line.
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== briefwx - JMA chart briefing ===\n");
    out.push_str(&format!("Now: {}\n", fmt_instant(run.now)));

    let stored = run
        .outputs
        .iter()
        .filter(|r| r.status == OutputStatus::Stored)
        .count();
    out.push_str(&format!("Charts: {stored}/{} stored\n\n", run.outputs.len()));

    out.push_str(&format_table(&run.outputs));
    out.push('\n');

    match &run.combined {
        Some(combined) => out.push_str(&format!(
            "Combined: {} ({} pages, {} bytes)\n",
            combined.name,
            combined.pages.len(),
            combined.bytes
        )),
        None => out.push_str("Combined: not written (no charts available)\n"),
    }

    out
}

fn format_table(rows: &[OutputRecord]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<34} {:<22} {:<17} {:<8} {:<10}\n",
            "output", "family", "issued (UTC)", "status", "overlay"
        )
        .trim_end(),
    );
    out.push('\n');

    out.push_str(
        format!(
            "{:-<34} {:-<22} {:-<17} {:-<8} {:-<10}\n",
            "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        let issued = r.issued.map(fmt_instant).unwrap_or_else(|| "-".to_string());
        let mut line = format!(
            "{:<34} {:<22} {:<17} {:<8} {:<10}",
            r.name,
            r.family,
            issued,
            fmt_status(r.status),
            fmt_overlay(r.overlay.as_ref()),
        );
        if let Some(detail) = &r.detail {
            line.push_str(&format!(" {detail}"));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Candidate list per family, as tried by a run at the same instant.
pub fn format_plan(now: DateTime<Utc>, entries: &[PlanEntry]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Plan at {}\n", fmt_instant(now)));

    for entry in entries {
        out.push_str(&format!(
            "\n{} ({}, {} candidates)\n",
            entry.family,
            entry.schedule,
            entry.candidates.len()
        ));
        for (i, c) in entry.candidates.iter().enumerate() {
            out.push_str(&format!("{:>4}. {}  {}\n", i + 1, fmt_instant(c.at), c.url));
        }
    }

    out
}

fn fmt_instant(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn fmt_status(status: OutputStatus) -> &'static str {
    match status {
        OutputStatus::Stored => "stored",
        OutputStatus::Missing => "missing",
        OutputStatus::Failed => "failed",
    }
}

fn fmt_overlay(outcome: Option<&CompositeOutcome>) -> &'static str {
    match outcome {
        None => "",
        Some(CompositeOutcome::Skipped) => "skipped",
        Some(CompositeOutcome::Applied { .. }) => "applied",
        Some(CompositeOutcome::Failed { .. }) => "failed",
    }
}
