//! Shared domain types.
//!
//! A chart family is static configuration data: when it is issued, where it
//! lives on the remote side, and which logical outputs it feeds. Everything
//! the resolver produces from it (candidates, hits, misses) is transient and
//! discarded at the end of the run.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Offset, TimeDelta, Utc};
use serde::Serialize;

use crate::domain::RemoteName;

/// Publication pattern of a chart family.
///
/// Each variant maps `now` to an ordered candidate list; see `schedule::candidates`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// The remote identifier does not depend on time: one candidate at `now`.
    Static,
    /// Latest hour of the day first, current day before previous day.
    FixedHours { hours: &'static [u32] },
    /// Hours ordered by distance to the current hour (ties: earlier hour first).
    NearestHours { hours: &'static [u32] },
    /// Nearest-first on the current day, latest-first on prior days.
    HourlyList { hours: &'static [u32] },
    /// Rotation from the latest hour <= now, wrapping backward into the previous day.
    WrapAround { hours: &'static [u32] },
}

impl Schedule {
    pub fn hours(&self) -> &'static [u32] {
        match *self {
            Schedule::Static => &[],
            Schedule::FixedHours { hours }
            | Schedule::NearestHours { hours }
            | Schedule::HourlyList { hours }
            | Schedule::WrapAround { hours } => hours,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Schedule::Static => "static",
            Schedule::FixedHours { .. } => "fixed-hours",
            Schedule::NearestHours { .. } => "nearest-hours",
            Schedule::HourlyList { .. } => "hourly-list",
            Schedule::WrapAround { .. } => "wrap-around",
        }
    }
}

/// Format of the payload served by the remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// Needs rasterizing before it can be stored as PNG.
    Pdf,
    /// Stored as-is after a decode check.
    Png,
}

/// Logical output names fed by a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outputs {
    Single { name: &'static str },
    /// Latest issuance plus the structurally previous one.
    Pair {
        latest: &'static str,
        prior: &'static str,
    },
}

impl Outputs {
    pub fn names(&self) -> Vec<&'static str> {
        match self {
            Outputs::Single { name } => vec![*name],
            Outputs::Pair { latest, prior } => vec![*latest, *prior],
        }
    }
}

/// A category of published chart with its own schedule and naming convention.
#[derive(Debug, Clone, Serialize)]
pub struct ChartFamily {
    pub key: &'static str,
    pub schedule: Schedule,
    /// Zone the issuance hours are expressed in, in seconds east of UTC.
    pub zone_offset_secs: i32,
    /// Number of days searched backward, the current day included.
    pub lookback_days: u32,
    /// Payloads shorter than this are placeholders; `0` disables the check.
    pub min_payload_bytes: usize,
    /// Maximum accepted age of the remote `Last-Modified`, if validated.
    pub staleness_hours: Option<i64>,
    pub remote: RemoteName,
    pub payload: PayloadKind,
    /// Overlay asset composited onto every page before rasterized output is stored.
    pub overlay: Option<&'static str>,
    pub outputs: Outputs,
}

impl ChartFamily {
    pub fn zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.zone_offset_secs).unwrap_or_else(|| Utc.fix())
    }

    pub fn staleness_bound(&self) -> Option<TimeDelta> {
        self.staleness_hours.map(TimeDelta::hours)
    }

    pub fn output_names(&self) -> Vec<&'static str> {
        self.outputs.names()
    }
}

/// A concrete `(family, issuance instant)` pair. Never later than `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub family: &'static str,
    pub at: DateTime<Utc>,
}

/// Why a candidate did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Miss {
    /// Non-success HTTP status.
    Status(u16),
    /// The request itself failed (DNS, timeout, TLS, ...).
    Transport(String),
    /// Success status but the body is a "not yet issued" placeholder.
    TooSmall { len: usize, min: usize },
    /// `Last-Modified` is older than the staleness bound.
    Stale { age_minutes: i64 },
    /// No usable `Last-Modified` to check freshness against.
    Unverifiable,
    /// The payload could not be written to the file store.
    Store(String),
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Miss::Status(code) => write!(f, "HTTP status {code}"),
            Miss::Transport(msg) => write!(f, "request failed: {msg}"),
            Miss::TooSmall { len, min } => write!(f, "payload too small ({len} < {min} bytes)"),
            Miss::Stale { age_minutes } => write!(f, "stale (last modified {age_minutes} min ago)"),
            Miss::Unverifiable => write!(f, "no Last-Modified to verify freshness"),
            Miss::Store(msg) => write!(f, "store write failed: {msg}"),
        }
    }
}

/// A fetched payload, already written to the file store under `stored_as`.
#[derive(Debug, Clone)]
pub struct Payload {
    pub candidate: Candidate,
    pub bytes: Vec<u8>,
    pub stored_as: String,
}

#[derive(Debug, Clone)]
pub enum FetchResult {
    Hit(Payload),
    Miss(Miss),
}

impl FetchResult {
    pub fn into_hit(self) -> Option<Payload> {
        match self {
            FetchResult::Hit(payload) => Some(payload),
            FetchResult::Miss(_) => None,
        }
    }
}

/// One resolved logical output of the run.
#[derive(Debug, Clone)]
pub struct ResolvedOutput {
    pub name: &'static str,
    pub family: &'static str,
    pub payload: Payload,
}

/// Run-level settings assembled from the CLI.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory backing the output file store.
    pub out_dir: PathBuf,
    /// Read-only directory holding overlay assets.
    pub layers_dir: PathBuf,
    /// File name of the combined document inside the output store.
    pub combined_name: String,
    /// Rasterization resolution for PDF charts.
    pub dpi: u32,
    pub timeout_secs: u64,
    /// Fixed clock; `None` means the wall clock at start-up.
    pub now: Option<DateTime<Utc>>,
    /// Path or name of the `pdftoppm` executable.
    pub pdftoppm: PathBuf,
}
