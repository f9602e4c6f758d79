//! Command-line parsing for the JMA chart briefing job.
//!
//! Argument parsing and command dispatch stay separate from the resolver and
//! raster code; handlers turn these structs into a `RunConfig`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "briefwx",
    version,
    about = "Fetch JMA weather/ashfall charts and assemble a briefing PDF"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve every chart family, write per-chart PNGs, and assemble the combined PDF.
    Run(RunArgs),
    /// Print each family's ordered candidate list for `now` without touching the network.
    Plan(PlanArgs),
    /// Rebuild only the combined PDF from PNGs already in the output directory.
    Assemble(AssembleArgs),
}

/// Options for a full run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Output directory (per-chart PNGs and the combined PDF).
    #[arg(long, default_value = "images")]
    pub out: PathBuf,

    /// Directory holding the overlay assets.
    #[arg(long, default_value = "layer")]
    pub layers: PathBuf,

    /// Rasterization resolution for PDF charts.
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u32).range(36..=600))]
    pub dpi: u32,

    /// File name of the combined document inside the output directory.
    #[arg(long, default_value = crate::domain::catalog::COMBINED_NAME)]
    pub combined: String,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Treat this instant as "now" (RFC 3339, e.g. 2026-05-10T09:00:00Z).
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,

    /// PDF rasterizer executable.
    #[arg(long, default_value = "pdftoppm")]
    pub pdftoppm: PathBuf,

    /// Print the run summary as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Options for a dry-run plan.
#[derive(Debug, Parser, Clone)]
pub struct PlanArgs {
    /// Treat this instant as "now" (RFC 3339).
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,

    /// Only show this family (e.g. asas, fxjp106, ashfall-sakurajima).
    #[arg(long)]
    pub family: Option<String>,

    /// Print the plan as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Options for rebuilding the combined document.
#[derive(Debug, Parser, Clone)]
pub struct AssembleArgs {
    /// Directory holding the per-chart PNGs.
    #[arg(long, default_value = "images")]
    pub out: PathBuf,

    /// File name of the combined document inside the output directory.
    #[arg(long, default_value = crate::domain::catalog::COMBINED_NAME)]
    pub combined: String,
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp ({e})"))
}
