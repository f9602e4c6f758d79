//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - wires the real collaborators (HTTP client, directory stores, `pdftoppm`)
//! - runs the batch pipeline and prints the summary

use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{AssembleArgs, Command, PlanArgs, RunArgs};
use crate::data::JmaClient;
use crate::domain::RunConfig;
use crate::domain::catalog::{self, COMBINED_ORDER};
use crate::error::AppError;
use crate::io::{DirStore, Pdftoppm};
use crate::render::{CanvasPolicy, assemble_into};

pub mod pipeline;

use pipeline::Services;

/// Entry point for the `briefwx` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    // `briefwx` on its own (or with only flags) is the scheduled batch job.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Plan(args) => handle_plan(args),
        Command::Assemble(args) => handle_assemble(args),
    }
}

/// Logs go to stderr so stdout stays the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let now = config.now.unwrap_or_else(Utc::now);

    let store = DirStore::open(config.out_dir.clone())?;
    let layers = DirStore::read_only(config.layers_dir.clone());
    let http = JmaClient::new(Duration::from_secs(config.timeout_secs))?;
    let rasterizer = Pdftoppm::new(config.pdftoppm.clone());
    let services = Services {
        http: &http,
        store: &store,
        layers: &layers,
        rasterizer: &rasterizer,
    };

    let families = catalog::jma_families();
    info!(
        %now,
        families = families.len(),
        out = %config.out_dir.display(),
        "starting run"
    );
    let run = pipeline::run_batch(
        &families,
        &COMBINED_ORDER,
        &config,
        &CanvasPolicy::A4_300DPI,
        now,
        &services,
    );

    if args.json {
        println!("{}", to_json(&run)?);
    } else {
        print!("{}", crate::report::format_run_summary(&run));
    }
    Ok(())
}

fn handle_plan(args: PlanArgs) -> Result<(), AppError> {
    let now = args.at.unwrap_or_else(Utc::now);
    let families = match &args.family {
        Some(key) => vec![
            catalog::find(key)
                .ok_or_else(|| AppError::new(2, format!("Unknown chart family '{key}'.")))?,
        ],
        None => catalog::jma_families(),
    };

    let entries = pipeline::plan(&families, now);
    if args.json {
        println!("{}", to_json(&entries)?);
    } else {
        print!("{}", crate::report::format_plan(now, &entries));
    }
    Ok(())
}

fn handle_assemble(args: AssembleArgs) -> Result<(), AppError> {
    let store = DirStore::open(args.out.clone())?;
    match assemble_into(&store, &COMBINED_ORDER, &CanvasPolicy::A4_300DPI, &args.combined)? {
        Some(combined) => println!(
            "Combined: {} ({} pages, {} bytes)",
            args.combined,
            combined.pages.len(),
            combined.pdf.len()
        ),
        None => println!("Combined: not written (no charts in {})", args.out.display()),
    }
    Ok(())
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        out_dir: args.out.clone(),
        layers_dir: args.layers.clone(),
        combined_name: args.combined.clone(),
        dpi: args.dpi,
        timeout_secs: args.timeout_secs,
        now: args.at,
        pdftoppm: args.pdftoppm.clone(),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(2, format!("Failed to serialize output: {e}")))
}

/// Rewrite argv so `briefwx` defaults to `briefwx run`.
///
/// Rules:
/// - `briefwx`                      -> `briefwx run`
/// - `briefwx --at ... --json`      -> `briefwx run --at ... --json`
/// - `briefwx --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "plan" | "assemble");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    argv
}
